//! Tests for config file resolution and graceful degradation
//!
//! - Missing config file: warning + defaults, startup continues
//! - Malformed config file: load fails
//! - Resolution priority: CLI argument > MINDMOOD_CONFIG > platform default
//!
//! Tests that touch MINDMOOD_CONFIG are marked #[serial] so they never
//! race each other on the process environment.

use mindmood_common::config::{
    load_config, resolve_config_path, TextClassifierKind, TomlConfig, CONFIG_ENV_VAR,
};
use mindmood_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_cli_argument_takes_priority() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolved = resolve_config_path(None);
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = load_config(Some(Path::new("/nonexistent/mindmood/mindmood.toml"))).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_no_file_uses_defaults() {
    let config = load_config(None).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        [server]
        host = "0.0.0.0"
        port = 8080
        max_upload_bytes = 1048576
        cors_permissive = false

        [recommendation]
        alpha_audio = 0.5
        top_k = 3
        include_diagnostics = false

        [evidence]
        timeout_ms = 2500
        text_classifier = "remote"
        text_url = "http://127.0.0.1:8000/analyze/text"
        audio_url = "http://127.0.0.1:8000/analyze/voice"

        [catalog]
        path = "/srv/mindmood/content_items.json"

        [logging]
        level = "debug"
        "#,
    );

    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert!(!config.server.cors_permissive);
    assert_eq!(config.recommendation.alpha_audio, 0.5);
    assert_eq!(config.recommendation.top_k, 3);
    assert!(!config.recommendation.include_diagnostics);
    assert_eq!(config.evidence.timeout_ms, 2500);
    assert_eq!(config.evidence.text_classifier, TextClassifierKind::Remote);
    assert_eq!(
        config.catalog.path,
        Some(PathBuf::from("/srv/mindmood/content_items.json"))
    );
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_fatal() {
    let file = write_config("[server\nport = \"not a number\"");

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_values_are_fatal() {
    let file = write_config(
        r#"
        [recommendation]
        alpha_audio = -0.5
        "#,
    );

    let result = load_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
