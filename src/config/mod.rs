//! Configuration management for rxledger.
//!
//! TOML configuration with:
//! - environment variable substitution (`${VAR_NAME}`)
//! - `RXLEDGER_<SECTION>_<KEY>` environment overrides
//! - defaults for every setting
//! - validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rxledger::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rxledger.toml")?;
//!
//! println!("Reading from: {}", config.paths.base_path);
//! println!("Output format: {}", config.output.format);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! base_path = "${RXLEDGER_DATA_DIR}"
//!
//! [analysis]
//! exclude_reverted = false
//! top_quantities_limit = 4
//! top_chains_limit = 2
//!
//! [output]
//! format = "json"
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    AnalysisConfig, ApplicationConfig, LoggingConfig, OutputConfig, PathsConfig, RxLedgerConfig,
    ValidationConfig,
};
