//! Schema validation and quarantine routing
//!
//! Raw records are checked against the required-field contract of their
//! entity type and partitioned into typed valid records and quarantined ones.
//!
//! ```rust
//! use rxledger::core::validation::{Partition, SchemaValidator};
//! use rxledger::domain::{ClaimRecord, RecordOrigin};
//! use serde_json::json;
//!
//! let record = json!({"id": "1", "npi": "P1", "ndc": "D1", "quantity": 30,
//!                     "timestamp": "2024-01-01"});
//! let origin = RecordOrigin { source: "claims/c1.json".to_string(), row: 1 };
//!
//! let mut validator = SchemaValidator::new();
//! let partition: Partition<ClaimRecord> =
//!     validator.validate_batch(vec![(origin, record.as_object().unwrap().clone())]);
//!
//! assert!(partition.valid.is_empty());
//! assert_eq!(partition.quarantined[0].violations[0].to_string(), "missing field: price");
//! ```

pub mod schema;
pub mod validator;
pub mod violation;

pub use schema::{required_fields, FieldKind, FieldSpec};
pub use validator::{check_as, Entity, KeyRegistry, Partition, SchemaValidator};
pub use violation::{QuarantinedRecord, ValidationResult, Violation};
