//! Command-line front end for the TripWeaver personalisation engine.
//!
//! The `handle` subcommand reads one JSON request file, answers it with an
//! [`Engine`] and prints one JSON [`Response`]. The engine and request types
//! are public so other front ends can reuse the dispatcher.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod engine;
mod error;
mod handle;
mod request;
mod response;

pub use engine::Engine;
pub use error::CliError;
pub use request::{
    ApplyTipRequest, DecisionFactors, ExplainRequest, HealthRequest, INVALID_REQUEST,
    OptimizeRequest, RecommendRequest, Request, RequestError, SummaryRequest, TipsRequest,
    TrainRequest,
};
pub use response::{Outcome, REUSED_MESSAGE, Response, TRAINED_MESSAGE};

use handle::{HandleArgs, run_handle};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_MODEL_DIR: &str = "model-dir";
pub(crate) const ARG_MAX_MODEL_AGE_DAYS: &str = "max-model-age-days";
pub(crate) const ARG_AGGREGATES_DB: &str = "aggregates-db";
pub(crate) const ARG_FETCH_TIMEOUT_MS: &str = "fetch-timeout-ms";
pub(crate) const ENV_REQUEST: &str = "TRIPWEAVER_CMDS_HANDLE_REQUEST_PATH";

/// Run the TripWeaver CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// request cannot be read, or the request is answered with an error.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Handle(args) => run_handle(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tripweaver",
    about = "Personalised activity ranking and itinerary tooling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a JSON personalisation request.
    Handle(HandleArgs),
}

#[cfg(test)]
mod tests;
