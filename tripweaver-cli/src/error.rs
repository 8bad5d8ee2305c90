//! Error types emitted by the TripWeaver CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use thiserror::Error;
use tripweaver_scorer::PipelineError;

/// Errors emitted by the TripWeaver CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable consulted.
        env: &'static str,
    },
    /// Reading the request failed.
    #[error("failed to read request from {source_name}: {source}")]
    OpenRequest {
        /// File path, or `stdin`.
        source_name: String,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The request was not valid JSON.
    #[error("failed to parse request JSON from {source_name}: {source}")]
    ParseRequest {
        /// File path, or `stdin`.
        source_name: String,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Loading the saved pipeline at start-up failed.
    #[error("failed to load the saved pipeline: {0}")]
    Pipeline(#[source] Box<PipelineError>),
    /// Opening the aggregate database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open aggregates: {0}")]
    OpenAggregates(#[source] Box<tripweaver_collective::StoreError>),
    /// The request was answered with an error response.
    #[error("request failed: {message}")]
    RequestFailed {
        /// Message carried by the error response.
        message: String,
    },
    /// Serialising the response failed.
    #[error("failed to serialise response: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing the response failed.
    #[error("failed to write response: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
