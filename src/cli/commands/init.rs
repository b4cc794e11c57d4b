//! Init command implementation
//!
//! Writes a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "rxledger.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point paths.base_path at the directory holding the feeds");
                println!("  2. Validate configuration: rxledger validate-config");
                println!("  3. Run: rxledger run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Default configuration with comments
    pub fn generate_config() -> &'static str {
        r#"# rxledger configuration
#
# Every key is optional; the values below are the defaults.
# Values may reference environment variables, e.g. base_path = "${RXLEDGER_DATA_DIR}"
# Any key can be overridden with RXLEDGER_<SECTION>_<KEY>.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Run the whole pipeline but write nothing
dry_run = false

[paths]
# Feeds are read from <base_path>/<entity dir>/*.csv and *.json
base_path = "data"
pharmacies_dir = "pharmacies"
claims_dir = "claims"
reverts_dir = "reverts"

# Output, also relative to base_path
invalid_records_dir = "invalid_records"
results_dir = "results"

[validation]
# Quarantine claims whose pharmacy is not in the pharmacy feed
enforce_pharmacy_reference = true

[analysis]
# Count only claims that were never reverted as fills
exclude_reverted = false
top_quantities_limit = 4
top_chains_limit = 2

[output]
# Result table format (json, csv)
format = "json"

# Also write the reconciled fact events
write_facts = false

[logging]
local_enabled = true
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, RxLedgerConfig};
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_matches_defaults() {
        let config = parse_config(InitArgs::generate_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, RxLedgerConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("rxledger.toml");
        fs::write(&output, "# existing").unwrap();

        let mut args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        args.force = true;
        assert_eq!(args.execute().unwrap(), 0);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("[analysis]"));
    }
}
