//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use cropsight_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn clear_env() {
    env::remove_var("CROPSIGHT_MODEL_PATH");
    env::remove_var("CROPSIGHT_SCALER_PATH");
    env::remove_var("CROPSIGHT_REFLECTANCE_SCALE");
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
scaler_path = "artifacts/scaler.json"
# Only override the scaler, leave others as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.scaler_path.value, PathBuf::from("artifacts/scaler.json"));
    assert_eq!(config.scaler_path.source, ConfigSource::File);
    assert_eq!(config.model_path.source, ConfigSource::Default);
    assert_eq!(config.reflectance_scale.source, ConfigSource::Default);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/cropsight.toml");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"model_path = "file-model.json""#).unwrap();

    env::set_var("CROPSIGHT_MODEL_PATH", "env-model.json");
    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    clear_env();

    assert_eq!(config.model_path.value, PathBuf::from("env-model.json"));
    assert_eq!(config.model_path.source, ConfigSource::Environment);
}

#[test]
#[serial]
fn test_invalid_environment_scale_is_ignored() {
    clear_env();
    env::set_var("CROPSIGHT_REFLECTANCE_SCALE", "not-a-number");
    let config = LayeredConfig::with_defaults().load_from_env();
    clear_env();

    assert_eq!(config.reflectance_scale.value, 10_000.0);
    assert_eq!(config.reflectance_scale.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    clear_env();
    env::set_var("CROPSIGHT_SCALER_PATH", "env-scaler.json");
    let mut config = LayeredConfig::with_defaults().load_from_env();
    clear_env();

    config.update_from_cli(CliConfigOverrides {
        model_path: None,
        scaler_path: Some(PathBuf::from("cli-scaler.json")),
        reflectance_scale: Some(1.0),
    });

    assert_eq!(config.scaler_path.value, PathBuf::from("cli-scaler.json"));
    assert_eq!(config.scaler_path.source, ConfigSource::Cli);
    assert_eq!(config.reflectance_scale.value, 1.0);
    assert_eq!(config.reflectance_scale.source, ConfigSource::Cli);
}
