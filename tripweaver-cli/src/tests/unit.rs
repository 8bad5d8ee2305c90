//! Focused unit tests covering handle configuration and request loading.

use super::*;
use crate::handle::{HandleConfig, config_from_layers_for_test, load_request, run_handle_with};
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use std::{fs, time::Duration};
use tempfile::TempDir;
use tripweaver_scorer::pipeline::MODEL_FILE_NAME;

fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

#[rstest]
fn converting_without_request_path_errors() {
    let err = HandleConfig::try_from(HandleArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_applies_defaults() {
    let args = HandleArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        ..HandleArgs::default()
    };
    let config = HandleConfig::try_from(args).expect("config");
    assert_eq!(config.scorer.model_dir, Utf8PathBuf::from("models"));
    assert_eq!(config.scorer.max_age_days, 7);
    assert_eq!(config.fetch_timeout, Duration::from_secs(2));
    assert!(config.aggregates_db.is_none());
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let (_tmp, root) = workspace();
    let env_request = root.join("from-env.json");
    let cli_models = root.join("cli-models");

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "model_dir": root.join("file-models").as_str(),
            "max_model_age_days": 30,
            "fetch_timeout_ms": 500,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "model_dir": root.join("env-models").as_str(),
    }));
    composer.push_cli(json!({ "model_dir": cli_models.as_str() }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.scorer.model_dir, cli_models);
    assert_eq!(config.scorer.max_age_days, 30);
    assert_eq!(config.fetch_timeout, Duration::from_millis(500));
}

#[rstest]
fn load_request_reports_missing_file() {
    let (_tmp, root) = workspace();
    let path = root.join("absent.json");
    let err = load_request(&path).expect_err("missing request should error");
    match err {
        CliError::OpenRequest { source_name, .. } => assert_eq!(source_name, path.as_str()),
        other => panic!("expected OpenRequest, found {other:?}"),
    }
}

#[rstest]
fn load_request_reports_invalid_json() {
    let (_tmp, root) = workspace();
    let path = root.join("broken.json");
    fs::write(&path, b"{ nope").expect("write request");
    let err = load_request(&path).expect_err("invalid JSON should error");
    assert!(matches!(err, CliError::ParseRequest { .. }));
}

#[rstest]
fn error_responses_are_written_before_failing() {
    let (_tmp, root) = workspace();
    let path = root.join("request.json");
    fs::write(&path, br#"{"unknown": true}"#).expect("write request");
    let args = HandleArgs {
        request_path: Some(path),
        model_dir: Some(root.join("models")),
        ..HandleArgs::default()
    };

    let mut stdout = Vec::new();
    let err = run_handle_with(args, &mut stdout).expect_err("error response should fail");
    match err {
        CliError::RequestFailed { message } => assert_eq!(message, INVALID_REQUEST),
        other => panic!("expected RequestFailed, found {other:?}"),
    }
    let printed: serde_json::Value = serde_json::from_slice(&stdout).expect("JSON output");
    assert_eq!(printed["status"], "error");
}

#[rstest]
fn unreadable_saved_pipeline_fails_start_up() {
    let (_tmp, root) = workspace();
    let models = root.join("models");
    fs::create_dir_all(&models).expect("create model dir");
    fs::write(models.join(MODEL_FILE_NAME), b"not a pipeline").expect("write artefact");
    let path = root.join("request.json");
    fs::write(&path, br#"{"info": true}"#).expect("write request");
    let args = HandleArgs {
        request_path: Some(path),
        model_dir: Some(models),
        ..HandleArgs::default()
    };

    let err = run_handle_with(args, &mut Vec::new()).expect_err("corrupt artefact");
    assert!(matches!(err, CliError::Pipeline(_)));
}
