//! Domain error types
//!
//! Only run-level failures are errors here. Record-level problems (schema
//! violations, orphan reverts, analysis input gaps) are reported as values by
//! the stage that finds them and never abort a run.

use thiserror::Error;

/// Main rxledger error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum RxLedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A source file could not be read or parsed
    #[error("Load error: {0}")]
    Load(String),

    /// Results or quarantine sets could not be written
    #[error("Sink error: {0}")]
    Sink(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RxLedgerError {
    /// Process exit code reported by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RxLedgerError::Configuration(_) => 2,
            RxLedgerError::Load(_) => 3,
            RxLedgerError::Sink(_) => 4,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RxLedgerError {
    fn from(err: std::io::Error) -> Self {
        RxLedgerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RxLedgerError {
    fn from(err: serde_json::Error) -> Self {
        RxLedgerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RxLedgerError {
    fn from(err: toml::de::Error) -> Self {
        RxLedgerError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for RxLedgerError {
    fn from(err: csv::Error) -> Self {
        RxLedgerError::Serialization(format!("CSV error: {err}"))
    }
}
