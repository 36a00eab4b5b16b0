//! Configuration Module Tests
//!
//! Tests for PoolConfig defaults, validation and layered loading from TOML
//! files and environment variables.

use std::io::Write;

use batch_fanout::{ConfigurationError, PoolConfig};

#[test]
fn config_has_expected_defaults() {
    let config = PoolConfig::default();

    assert_eq!(config.worker_count, 9);
    assert_eq!(config.max_queue_length, 2000);
    assert_eq!(config.page_size, 1000);
    assert_eq!(config.label, "fanout");
    assert!(!config.stop_on_error);
    assert_eq!(config.progress_interval_ms, 500);
}

#[test]
fn config_loads_without_sources() {
    let config = PoolConfig::load_with_prefix(None, "FANOUT_TEST_EMPTY")
        .expect("defaults should load");
    assert_eq!(config, PoolConfig::default());
}

#[test]
fn config_loads_from_toml_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        r#"
worker_count = 3
max_queue_length = 12
page_size = 50
label = "nightly-import"
stop_on_error = true
"#
    )
    .unwrap();

    let config = PoolConfig::load_with_prefix(Some(file.path()), "FANOUT_TEST_FILE")
        .expect("toml should load");

    assert_eq!(config.worker_count, 3);
    assert_eq!(config.max_queue_length, 12);
    assert_eq!(config.page_size, 50);
    assert_eq!(config.label, "nightly-import");
    assert!(config.stop_on_error);
    // Not in the file, so the default applies
    assert_eq!(config.progress_interval_ms, 500);
}

#[test]
fn config_environment_overrides_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(file, "worker_count = 2\nmax_queue_length = 8").unwrap();

    std::env::set_var("FANOUT_TEST_ENV_WORKER_COUNT", "6");
    std::env::set_var("FANOUT_TEST_ENV_LABEL", "from-env");
    let loaded = PoolConfig::load_with_prefix(Some(file.path()), "FANOUT_TEST_ENV");
    std::env::remove_var("FANOUT_TEST_ENV_WORKER_COUNT");
    std::env::remove_var("FANOUT_TEST_ENV_LABEL");

    let config = loaded.expect("env overrides should load");
    assert_eq!(config.worker_count, 6);
    assert_eq!(config.max_queue_length, 8);
    assert_eq!(config.label, "from-env");
}

#[test]
fn config_load_validates_result() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(file, "worker_count = 10\nmax_queue_length = 4").unwrap();

    let err = PoolConfig::load_with_prefix(Some(file.path()), "FANOUT_TEST_INVALID").unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::QueueShorterThanWorkers {
            max_queue_length: 4,
            worker_count: 10
        }
    ));
}

#[test]
fn config_load_reports_missing_file() {
    let err = PoolConfig::load_with_prefix(
        Some(std::path::Path::new("/nonexistent/fanout.toml")),
        "FANOUT_TEST_MISSING",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::Load(_)));
}

#[test]
fn config_round_trips_through_json() {
    let config = PoolConfig::new(2, 4, 10, "json", true).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: PoolConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
