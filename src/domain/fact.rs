//! Fact events
//!
//! A fact event is the reconciled view of one claim: the claim itself plus
//! whether a rollback nullified it. Fact events are only built by the
//! reconciler and are never mutated afterwards.

use super::ids::{ClaimId, DrugProductId, PharmacyId, RevertId};
use super::records::{ClaimRecord, RevertRecord};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a claim after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Claimed,
    Reverted,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Claimed => f.write_str("CLAIMED"),
            EventType::Reverted => f.write_str("REVERTED"),
        }
    }
}

/// One reconciled claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEvent {
    pub claim_id: ClaimId,
    pub pharmacy_id: PharmacyId,
    pub drug_product_id: DrugProductId,
    pub price: Decimal,
    pub quantity: u64,
    pub is_reverted: bool,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert_id: Option<RevertId>,
    pub claimed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverted_at: Option<DateTime<Utc>>,
}

impl FactEvent {
    /// Build the fact for `claim`, reverted by `revert` when present
    pub(crate) fn from_claim(claim: &ClaimRecord, revert: Option<&RevertRecord>) -> Self {
        let is_reverted = revert.is_some();
        Self {
            claim_id: claim.claim_id.clone(),
            pharmacy_id: claim.pharmacy_id.clone(),
            drug_product_id: claim.drug_product_id.clone(),
            price: claim.price,
            quantity: claim.quantity,
            is_reverted,
            event_type: if is_reverted {
                EventType::Reverted
            } else {
                EventType::Claimed
            },
            revert_id: revert.map(|r| r.revert_id.clone()),
            claimed_at: claim.timestamp,
            reverted_at: revert.map(|r| r.timestamp),
        }
    }

    /// `price * quantity` for this fill, `None` when it exceeds the decimal range
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}
