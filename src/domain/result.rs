//! Result type alias for rxledger

use super::errors::RxLedgerError;

/// Result type alias for rxledger operations
///
/// # Examples
///
/// ```
/// use rxledger::domain::result::Result;
/// use rxledger::domain::errors::RxLedgerError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RxLedgerError::Load("claims.json: expected a top-level JSON array".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RxLedgerError>;
