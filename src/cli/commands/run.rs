//! Run command implementation
//!
//! Loads the configured feeds, runs the pipeline and writes the results.

use crate::config::{load_config, RxLedgerConfig};
use crate::core::pipeline::{PipelineCoordinator, RunSummary};
use crate::domain::EntityType;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the base directory holding the feeds
    #[arg(long)]
    pub base_path: Option<String>,

    /// Override the result table format (json or csv)
    #[arg(long)]
    pub format: Option<String>,

    /// Run everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Count only claims that were not reverted as fills
    #[arg(long)]
    pub exclude_reverted: bool,

    /// Also write the reconciled fact events
    #[arg(long)]
    pub write_facts: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut RxLedgerConfig) {
        if let Some(base_path) = &self.base_path {
            tracing::info!(base_path = %base_path, "Overriding base path from CLI");
            config.paths.base_path = base_path.clone();
        }
        if let Some(format) = &self.format {
            tracing::info!(format = %format, "Overriding output format from CLI");
            config.output.format = format.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if self.exclude_reverted {
            config.analysis.exclude_reverted = true;
        }
        if self.write_facts {
            config.output.write_facts = true;
        }
    }

    /// Execute the run command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(e.exit_code());
            }
        };

        self.apply(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("DRY RUN MODE - no files will be written");
            println!();
        }

        let mut coordinator = match PipelineCoordinator::from_config(&config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to set up pipeline");
                eprintln!("Failed to set up pipeline: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("Processing feeds under {}", config.paths.base_path);
        println!();

        match coordinator.execute() {
            Ok(summary) => {
                print_summary(&summary);
                for path in coordinator.sink().written() {
                    println!("  wrote {}", path.display());
                }
                Ok(0)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Pipeline run failed");
                eprintln!("Run failed: {e}");
                Ok(e.exit_code())
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Run Summary:");
    for entity in EntityType::ALL {
        let counts = summary.counts(entity);
        println!(
            "  {:<9} read {:>6}  valid {:>6}  quarantined {:>6}",
            entity.as_str(),
            counts.read,
            counts.valid,
            counts.quarantined
        );
    }
    println!("  Facts: {} ({} reverted)", summary.facts, summary.reverted_facts);
    println!(
        "  Reverts: {} orphaned, {} redundant",
        summary.orphan_reverts, summary.redundant_reverts
    );
    println!("  Analysis warnings: {}", summary.analysis_warnings);
    println!("  Tables: {}", summary.tables_written);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}
