//! Handle command implementation for the TripWeaver CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tripweaver_collective::CollectiveConfig;
use tripweaver_scorer::{PipelineHandle, ScorerConfig};

use crate::{
    ARG_AGGREGATES_DB, ARG_FETCH_TIMEOUT_MS, ARG_MAX_MODEL_AGE_DAYS, ARG_MODEL_DIR, ARG_REQUEST,
    CliError, ENV_REQUEST, Engine, Response,
};

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;

/// CLI arguments for the `handle` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Answer one personalisation request. The request is a JSON \
                 object naming a single operation (train, recommend, explain, \
                 summary, health_score, auto_optimize, proactive_tips, \
                 apply_tip or info) alongside its fields. The response is \
                 printed to stdout as JSON.",
    about = "Answer a JSON personalisation request"
)]
#[ortho_config(prefix = "TRIPWEAVER")]
pub(crate) struct HandleArgs {
    /// Path to a JSON file containing the request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Directory holding the trained pipeline artefact.
    #[arg(long = ARG_MODEL_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) model_dir: Option<Utf8PathBuf>,
    /// Saved pipelines younger than this many days are reused by `train`.
    #[arg(long = ARG_MAX_MODEL_AGE_DAYS, value_name = "days")]
    #[serde(default)]
    pub(crate) max_model_age_days: Option<i64>,
    /// `SQLite` database of anonymised aggregates; enables collaborative
    /// blending.
    #[arg(long = ARG_AGGREGATES_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) aggregates_db: Option<Utf8PathBuf>,
    /// Upper bound on each aggregate fetch, in milliseconds.
    #[arg(long = ARG_FETCH_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) fetch_timeout_ms: Option<u64>,
}

impl HandleArgs {
    pub(crate) fn into_config(self) -> Result<HandleConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HandleConfig::try_from(merged)
    }
}

/// Resolved `handle` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandleConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Pipeline location and freshness.
    pub(crate) scorer: ScorerConfig,
    /// Aggregate database, when collaborative blending is wanted.
    pub(crate) aggregates_db: Option<Utf8PathBuf>,
    /// Per-fetch timeout for aggregate reads.
    pub(crate) fetch_timeout: Duration,
}

impl HandleConfig {
    fn collective(&self) -> CollectiveConfig {
        CollectiveConfig {
            fetch_timeout: self.fetch_timeout,
            ..CollectiveConfig::default()
        }
    }
}

impl TryFrom<HandleArgs> for HandleConfig {
    type Error = CliError;

    fn try_from(args: HandleArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REQUEST,
        })?;
        let defaults = ScorerConfig::default();
        let scorer = ScorerConfig {
            model_dir: args.model_dir.unwrap_or(defaults.model_dir),
            max_age_days: args.max_model_age_days.unwrap_or(defaults.max_age_days),
        };
        let fetch_timeout =
            Duration::from_millis(args.fetch_timeout_ms.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS));
        Ok(Self {
            request_path,
            scorer,
            aggregates_db: args.aggregates_db,
            fetch_timeout,
        })
    }
}

pub(super) fn run_handle(args: HandleArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_handle_with(args, &mut stdout)
}

/// Resolve configuration, answer the request and write the response.
///
/// An error response is still written before
/// [`CliError::RequestFailed`] is returned.
pub(super) fn run_handle_with(args: HandleArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let response = execute_handle(&config)?;
    write_response(writer, &response)?;
    match response {
        Response::Error { message } => Err(CliError::RequestFailed { message }),
        Response::Success(_) => Ok(()),
    }
}

fn execute_handle(config: &HandleConfig) -> Result<Response, CliError> {
    let request = load_request(&config.request_path)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;
    let pipeline = PipelineHandle::new(config.scorer.clone());
    pipeline
        .load_saved()
        .map_err(|err| CliError::Pipeline(Box::new(err)))?;

    #[cfg(feature = "store-sqlite")]
    if let Some(path) = &config.aggregates_db {
        let store = tripweaver_collective::SqliteAggregateStore::open(path)
            .map_err(|err| CliError::OpenAggregates(Box::new(err)))?;
        let blender = tripweaver_collective::CollectiveBlender::with_config(store, config.collective());
        let engine = Engine::new(pipeline).with_collective(blender);
        return Ok(runtime.block_on(engine.handle_value(request)));
    }
    #[cfg(not(feature = "store-sqlite"))]
    if let Some(path) = &config.aggregates_db {
        log::warn!(
            "ignoring {path} and fetch timeout {:?}: built without SQLite support",
            config.collective().fetch_timeout
        );
    }

    let engine: Engine = Engine::new(pipeline);
    Ok(runtime.block_on(engine.handle_value(request)))
}

/// Loads a JSON request from disk.
pub(super) fn load_request(path: &Utf8Path) -> Result<Value, CliError> {
    let text = tripweaver_fs::read_string(path).map_err(|source| CliError::OpenRequest {
        source_name: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseRequest {
        source_name: path.to_string(),
        source,
    })
}

fn write_response(writer: &mut dyn Write, response: &Response) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(response).map_err(CliError::Serialise)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<HandleConfig, CliError> {
    let merged = HandleArgs::merge_from_layers(layers).map_err(CliError::from)?;
    HandleConfig::try_from(merged)
}
