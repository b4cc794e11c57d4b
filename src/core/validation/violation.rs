//! Validation outcomes
//!
//! A [`Violation`] names one broken constraint. A [`ValidationResult`] wraps
//! the raw record it was checked against; invalid ones become
//! [`QuarantinedRecord`]s for the result sink.

use crate::domain::{EntityRecord, EntityType, RawRecord, RecordOrigin};
use serde::{Serialize, Serializer};
use std::fmt;

/// A constraint a raw record failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Required field absent, null or blank
    MissingField(&'static str),
    /// Field present but not coercible to the expected kind
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
    /// Primary key already seen in this batch
    DuplicateKey { field: &'static str, value: String },
    /// Foreign key pointing at nothing in this batch
    UnknownReference { field: &'static str, value: String },
}

impl Violation {
    /// Field the violation concerns
    pub fn field(&self) -> &'static str {
        match self {
            Violation::MissingField(field)
            | Violation::TypeMismatch { field, .. }
            | Violation::DuplicateKey { field, .. }
            | Violation::UnknownReference { field, .. } => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField(field) => write!(f, "missing field: {field}"),
            Violation::TypeMismatch { field, expected } => {
                write!(f, "type mismatch: {field} (expected {expected})")
            }
            Violation::DuplicateKey { field, value } => write!(f, "duplicate_key: {field}={value}"),
            Violation::UnknownReference { field, value } => {
                write!(f, "referential violation: {field}={value}")
            }
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of validating one raw record
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub entity_type: EntityType,
    pub raw: RawRecord,
    /// Typed record, present iff valid
    pub record: Option<EntityRecord>,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// An invalid record routed to quarantine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarantinedRecord {
    pub entity_type: EntityType,
    pub origin: RecordOrigin,
    pub record: RawRecord,
    pub violations: Vec<Violation>,
}
