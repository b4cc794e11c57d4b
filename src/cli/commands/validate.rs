//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Base Path: {}", config.paths.base_path);
        for entity in crate::domain::EntityType::ALL {
            println!(
                "  {} Source: {}",
                entity,
                config.paths.entity_dir(entity).display()
            );
        }
        println!(
            "  Quarantine Output: {}",
            config.paths.invalid_records_path().display()
        );
        println!("  Results Output: {}", config.paths.results_path().display());
        println!("  Output Format: {}", config.output.format);
        println!(
            "  Enforce Pharmacy Reference: {}",
            config.validation.enforce_pharmacy_reference
        );
        println!("  Exclude Reverted: {}", config.analysis.exclude_reverted);
        println!(
            "  Top Quantities / Chains: {} / {}",
            config.analysis.top_quantities_limit, config.analysis.top_chains_limit
        );
        println!();
        Ok(0)
    }
}
