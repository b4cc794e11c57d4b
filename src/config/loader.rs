//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::RxLedgerConfig;
use crate::domain::{Result, RxLedgerError};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`RxLedgerConfig`]
/// 4. Applies environment variable overrides (`RXLEDGER_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RxLedgerError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or the result
/// does not validate.
///
/// # Examples
///
/// ```no_run
/// use rxledger::config::load_config;
///
/// let config = load_config("rxledger.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RxLedgerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RxLedgerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RxLedgerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RxLedgerError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parse configuration text after `${VAR}` substitution
///
/// No overrides are applied and nothing is validated.
pub fn parse_config(contents: &str) -> Result<RxLedgerConfig> {
    let contents = substitute_env_vars(contents)?;
    Ok(toml::from_str(&contents)?)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
pub(crate) fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RxLedgerError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RxLedgerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(val) => val.trim().to_lowercase().parse().map(Some).map_err(|_| {
            RxLedgerError::Configuration(format!("{name} must be true or false, got '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the `RXLEDGER_*` prefix
///
/// Variables follow the pattern `RXLEDGER_<SECTION>_<KEY>`, for example
/// `RXLEDGER_PATHS_BASE_PATH` or `RXLEDGER_OUTPUT_FORMAT`.
pub(crate) fn apply_env_overrides(config: &mut RxLedgerConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("RXLEDGER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_bool("RXLEDGER_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Path overrides
    if let Ok(val) = std::env::var("RXLEDGER_PATHS_BASE_PATH") {
        config.paths.base_path = val;
    }

    // Validation overrides
    if let Some(val) = env_bool("RXLEDGER_VALIDATION_ENFORCE_PHARMACY_REFERENCE")? {
        config.validation.enforce_pharmacy_reference = val;
    }

    // Analysis overrides
    if let Some(val) = env_bool("RXLEDGER_ANALYSIS_EXCLUDE_REVERTED")? {
        config.analysis.exclude_reverted = val;
    }

    // Output overrides
    if let Ok(val) = std::env::var("RXLEDGER_OUTPUT_FORMAT") {
        config.output.format = val;
    }
    if let Some(val) = env_bool("RXLEDGER_OUTPUT_WRITE_FACTS")? {
        config.output.write_facts = val;
    }

    // Logging overrides
    if let Some(val) = env_bool("RXLEDGER_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("RXLEDGER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
