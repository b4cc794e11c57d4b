//! Integration tests for configuration loading and validation
//!
//! Tests touching `RXLEDGER_*` variables hold `ENV_MUTEX` so they do not see
//! each other's overrides.

use rxledger::config::{load_config, RxLedgerConfig};
use rxledger::core::pipeline::PipelineOptions;
use rxledger::domain::{EntityType, FileFormat, RxLedgerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for name in [
        "RXLEDGER_APPLICATION_LOG_LEVEL",
        "RXLEDGER_APPLICATION_DRY_RUN",
        "RXLEDGER_PATHS_BASE_PATH",
        "RXLEDGER_VALIDATION_ENFORCE_PHARMACY_REFERENCE",
        "RXLEDGER_ANALYSIS_EXCLUDE_REVERTED",
        "RXLEDGER_OUTPUT_FORMAT",
        "RXLEDGER_OUTPUT_WRITE_FACTS",
        "RXLEDGER_LOGGING_LOCAL_ENABLED",
        "RXLEDGER_LOGGING_LOCAL_PATH",
        "TEST_RXLEDGER_FEEDS",
    ] {
        std::env::remove_var(name);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file(
        r#"
[application]
log_level = "debug"
dry_run = true

[paths]
base_path = "/srv/feeds"
pharmacies_dir = "pharmacy_master"
claims_dir = "claims"
reverts_dir = "reversals"
invalid_records_dir = "quarantine"
results_dir = "out"

[validation]
enforce_pharmacy_reference = false

[analysis]
exclude_reverted = true
top_quantities_limit = 10
top_chains_limit = 3

[output]
format = "csv"
write_facts = true

[logging]
local_enabled = true
local_path = "/tmp/rxledger"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(
        config.paths.entity_dir(EntityType::Pharmacy),
        PathBuf::from("/srv/feeds/pharmacy_master")
    );
    assert_eq!(
        config.paths.entity_dir(EntityType::Revert),
        PathBuf::from("/srv/feeds/reversals")
    );
    assert_eq!(
        config.paths.invalid_records_path(),
        PathBuf::from("/srv/feeds/quarantine")
    );
    assert_eq!(config.output.file_format().unwrap(), FileFormat::Csv);
    assert!(config.output.write_facts);
    assert_eq!(config.logging.local_rotation, "hourly");

    let options = PipelineOptions::from(&config);
    assert!(!options.enforce_pharmacy_reference);
    assert!(options.analysis.exclude_reverted);
    assert_eq!(options.analysis.top_quantities_limit, 10);
    assert_eq!(options.analysis.top_chains_limit, 3);
}

#[test]
fn test_empty_file_yields_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file("");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config, RxLedgerConfig::default());
    assert_eq!(config.paths.base_path, "data");
    assert!(config.validation.enforce_pharmacy_reference);
    assert!(!config.analysis.exclude_reverted);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_RXLEDGER_FEEDS", "/mnt/feeds");

    let file = config_file(
        r#"
[paths]
# base_path = "${UNSET_IN_COMMENT}"
base_path = "${TEST_RXLEDGER_FEEDS}"
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.paths.base_path, "/mnt/feeds");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file("[paths]\nbase_path = \"${TEST_RXLEDGER_FEEDS}\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, RxLedgerError::Configuration(_)));
    assert!(err.to_string().contains("TEST_RXLEDGER_FEEDS"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("RXLEDGER_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("RXLEDGER_APPLICATION_DRY_RUN", "TRUE");
    std::env::set_var("RXLEDGER_PATHS_BASE_PATH", "/override");
    std::env::set_var("RXLEDGER_VALIDATION_ENFORCE_PHARMACY_REFERENCE", "false");
    std::env::set_var("RXLEDGER_ANALYSIS_EXCLUDE_REVERTED", "true");
    std::env::set_var("RXLEDGER_OUTPUT_FORMAT", "csv");

    let file = config_file(
        r#"
[application]
log_level = "info"

[paths]
base_path = "data"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert!(config.application.dry_run);
    assert_eq!(config.paths.base_path, "/override");
    assert!(!config.validation.enforce_pharmacy_reference);
    assert!(config.analysis.exclude_reverted);
    assert_eq!(config.output.format, "csv");
}

#[test]
fn test_invalid_boolean_override() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("RXLEDGER_OUTPUT_WRITE_FACTS", "sometimes");

    let file = config_file("");
    let result = load_config(file.path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("RXLEDGER_OUTPUT_WRITE_FACTS"));
}

#[test]
fn test_override_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("RXLEDGER_OUTPUT_FORMAT", "parquet");

    let file = config_file("");
    let result = load_config(file.path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("output.format"));
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for contents in [
        "[application]\nlog_level = \"loud\"\n",
        "[analysis]\ntop_chains_limit = 0\n",
        "[paths]\nresults_dir = \"\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ] {
        let file = config_file(contents);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("validation failed"),
            "{contents}: {err}"
        );
    }
}
