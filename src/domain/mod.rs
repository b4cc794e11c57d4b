//! Domain models and types for rxledger.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PharmacyId`], [`ClaimId`], [`RevertId`], [`DrugProductId`])
//! - **Source records** ([`PharmacyRecord`], [`ClaimRecord`], [`RevertRecord`]) and the
//!   untyped [`RawRecord`] they are validated from
//! - **Fact events** ([`FactEvent`]) produced by reconciliation
//! - **Loaded source data** ([`SourceBatch`], [`SourceFile`]) handed over by the loader
//! - **Error types** ([`RxLedgerError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! Identifiers are newtypes so a pharmacy id can never be joined against a
//! claim id by accident:
//!
//! ```rust
//! use rxledger::domain::{ClaimId, PharmacyId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pharmacy = PharmacyId::new("1234567890")?;
//! let claim = ClaimId::new("c-1")?;
//!
//! // let wrong: PharmacyId = claim;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod fact;
pub mod ids;
pub mod records;
pub mod result;
pub mod source;

pub use errors::RxLedgerError;
pub use fact::{EventType, FactEvent};
pub use ids::{ClaimId, DrugProductId, PharmacyId, RevertId};
pub use records::{ClaimRecord, EntityRecord, EntityType, PharmacyRecord, RawRecord, RevertRecord};
pub use result::Result;
pub use source::{FileFormat, RecordOrigin, SourceBatch, SourceFile};
