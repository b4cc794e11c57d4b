//! Source record models
//!
//! Raw records arrive from the loader as flat field mappings. The validator
//! turns well-formed ones into the typed records defined here; nothing
//! downstream of validation sees a [`RawRecord`].

use super::ids::{ClaimId, DrugProductId, PharmacyId, RevertId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed but unvalidated row: field name to raw JSON-like value
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// The kind of entity a source file declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Pharmacy master data
    Pharmacy,
    /// Drug claims
    Claim,
    /// Claim rollbacks
    Revert,
}

impl EntityType {
    /// All entity types in the order the pipeline validates them
    pub const ALL: [EntityType; 3] = [EntityType::Pharmacy, EntityType::Claim, EntityType::Revert];

    /// Lowercase name used in file names and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Pharmacy => "pharmacy",
            EntityType::Claim => "claim",
            EntityType::Revert => "revert",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pharmacy" | "pharmacies" => Ok(EntityType::Pharmacy),
            "claim" | "claims" => Ok(EntityType::Claim),
            "revert" | "reverts" | "rollback" | "rollbacks" => Ok(EntityType::Revert),
            other => Err(format!("Unknown entity type: {other}")),
        }
    }
}

/// A pharmacy and the chain it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyRecord {
    pub pharmacy_id: PharmacyId,
    pub chain: String,
}

/// A drug claim (one fill)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: ClaimId,
    pub pharmacy_id: PharmacyId,
    pub drug_product_id: DrugProductId,
    pub quantity: u64,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// A rollback of a previously submitted claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertRecord {
    pub revert_id: RevertId,
    pub claim_id: ClaimId,
    pub timestamp: DateTime<Utc>,
}

/// A validated record tagged with its entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRecord {
    Pharmacy(PharmacyRecord),
    Claim(ClaimRecord),
    Revert(RevertRecord),
}

impl EntityRecord {
    /// Entity type of the wrapped record
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityRecord::Pharmacy(_) => EntityType::Pharmacy,
            EntityRecord::Claim(_) => EntityType::Claim,
            EntityRecord::Revert(_) => EntityType::Revert,
        }
    }

    /// Primary key of the wrapped record
    pub fn primary_key(&self) -> &str {
        match self {
            EntityRecord::Pharmacy(p) => p.pharmacy_id.as_str(),
            EntityRecord::Claim(c) => c.claim_id.as_str(),
            EntityRecord::Revert(r) => r.revert_id.as_str(),
        }
    }
}

impl From<PharmacyRecord> for EntityRecord {
    fn from(record: PharmacyRecord) -> Self {
        EntityRecord::Pharmacy(record)
    }
}

impl From<ClaimRecord> for EntityRecord {
    fn from(record: ClaimRecord) -> Self {
        EntityRecord::Claim(record)
    }
}

impl From<RevertRecord> for EntityRecord {
    fn from(record: RevertRecord) -> Self {
        EntityRecord::Revert(record)
    }
}
