//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    if let Err(err) = tripweaver_cli::run() {
        eprintln!("tripweaver: {err}");
        std::process::exit(1);
    }
}
