//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output for interactive runs
//! - JSON file logs with daily, hourly or no rotation
//! - level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use rxledger::logging::init_logging;
//! use rxledger::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entity = "claim", valid = 10, "Validated batch");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard, LOG_FILE_PREFIX};

/// Log a source file that was read and parsed
///
/// # Example
///
/// ```no_run
/// use rxledger::log_file_loaded;
/// use rxledger::domain::EntityType;
///
/// log_file_loaded!("data/claims/claims_1.json", EntityType::Claim, 120);
/// ```
#[macro_export]
macro_rules! log_file_loaded {
    ($path:expr, $entity:expr, $count:expr) => {
        tracing::info!(
            path = %$path,
            entity = %$entity,
            records = $count,
            "Loaded source file"
        );
    };
}

/// Log the end of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use rxledger::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("reconcile", 42, Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            stage = $stage,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use rxledger::log_error_with_context;
/// use rxledger::domain::RxLedgerError;
///
/// let error = RxLedgerError::Sink("results/top_chains.json: permission denied".to_string());
/// log_error_with_context!(&error, "Failed to write results");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
