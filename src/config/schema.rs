//! Configuration schema types
//!
//! Every section and every key is optional; omitted values take the
//! defaults below.

use crate::domain::{EntityType, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main rxledger configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RxLedgerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Analysis tunables
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Result output
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RxLedgerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.paths.validate()?;
        self.analysis.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (run the pipeline, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Directory layout, relative to `base_path` unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,

    #[serde(default = "default_pharmacies_dir")]
    pub pharmacies_dir: String,

    #[serde(default = "default_claims_dir")]
    pub claims_dir: String,

    #[serde(default = "default_reverts_dir")]
    pub reverts_dir: String,

    /// Quarantine output
    #[serde(default = "default_invalid_records_dir")]
    pub invalid_records_dir: String,

    /// Result table output
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_path.trim().is_empty() {
            return Err("paths.base_path cannot be empty".to_string());
        }

        let dirs = [
            ("pharmacies_dir", &self.pharmacies_dir),
            ("claims_dir", &self.claims_dir),
            ("reverts_dir", &self.reverts_dir),
            ("invalid_records_dir", &self.invalid_records_dir),
            ("results_dir", &self.results_dir),
        ];
        for (key, dir) in dirs {
            if dir.trim().is_empty() {
                return Err(format!("paths.{key} cannot be empty"));
            }
        }
        Ok(())
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        PathBuf::from(&self.base_path).join(dir)
    }

    /// Source directory for `entity_type`
    pub fn entity_dir(&self, entity_type: EntityType) -> PathBuf {
        self.resolve(match entity_type {
            EntityType::Pharmacy => &self.pharmacies_dir,
            EntityType::Claim => &self.claims_dir,
            EntityType::Revert => &self.reverts_dir,
        })
    }

    pub fn invalid_records_path(&self) -> PathBuf {
        self.resolve(&self.invalid_records_dir)
    }

    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.results_dir)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            pharmacies_dir: default_pharmacies_dir(),
            claims_dir: default_claims_dir(),
            reverts_dir: default_reverts_dir(),
            invalid_records_dir: default_invalid_records_dir(),
            results_dir: default_results_dir(),
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Quarantine claims whose pharmacy is not a valid pharmacy of the batch
    #[serde(default = "default_true")]
    pub enforce_pharmacy_reference: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_pharmacy_reference: true,
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Count only facts still in the CLAIMED state as fills
    #[serde(default)]
    pub exclude_reverted: bool,

    #[serde(default = "default_top_quantities_limit")]
    pub top_quantities_limit: usize,

    #[serde(default = "default_top_chains_limit")]
    pub top_chains_limit: usize,
}

impl AnalysisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.top_quantities_limit == 0 {
            return Err("analysis.top_quantities_limit must be > 0".to_string());
        }
        if self.top_chains_limit == 0 {
            return Err("analysis.top_chains_limit must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude_reverted: false,
            top_quantities_limit: default_top_quantities_limit(),
            top_chains_limit: default_top_chains_limit(),
        }
    }
}

/// Result output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Result table format (json, csv)
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Also write the reconciled fact events
    #[serde(default)]
    pub write_facts: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        self.file_format().map(|_| ())
    }

    /// Parsed result table format
    pub fn file_format(&self) -> Result<FileFormat, String> {
        FileFormat::from_str(&self.format).map_err(|_| {
            format!(
                "Invalid output.format '{}'. Must be one of: json, csv",
                self.format
            )
        })
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            write_facts: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_path() -> String {
    "data".to_string()
}

fn default_pharmacies_dir() -> String {
    "pharmacies".to_string()
}

fn default_claims_dir() -> String {
    "claims".to_string()
}

fn default_reverts_dir() -> String {
    "reverts".to_string()
}

fn default_invalid_records_dir() -> String {
    "invalid_records".to_string()
}

fn default_results_dir() -> String {
    "results".to_string()
}

fn default_top_quantities_limit() -> usize {
    4
}

fn default_top_chains_limit() -> usize {
    2
}

fn default_output_format() -> String {
    "json".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
