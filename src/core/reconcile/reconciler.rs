//! Claim / revert reconciliation
//!
//! Joins validated claims with validated reverts on `claim_id`. Every claim
//! yields exactly one [`FactEvent`]. Reverts are indexed first-seen-wins; a
//! later revert for an already-indexed claim is redundant and ignored. A
//! revert whose claim is not in the batch is an orphan: it is dropped and
//! reported, never fatal.

use crate::domain::{ClaimId, ClaimRecord, FactEvent, RevertId, RevertRecord};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Non-fatal reconciliation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationWarning {
    /// Revert referencing a claim absent from the batch
    OrphanRevert {
        revert_id: RevertId,
        claim_id: ClaimId,
    },
}

impl fmt::Display for ReconciliationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationWarning::OrphanRevert {
                revert_id,
                claim_id,
            } => write!(
                f,
                "orphan revert {revert_id}: claim {claim_id} not in current batch"
            ),
        }
    }
}

/// Output of [`reconcile`]
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// One fact per claim, in claim input order
    pub events: Vec<FactEvent>,
    pub warnings: Vec<ReconciliationWarning>,
    /// Reverts ignored because their claim was already reverted
    pub redundant_reverts: usize,
}

impl Reconciliation {
    pub fn reverted_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_reverted).count()
    }

    pub fn orphan_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ReconciliationWarning::OrphanRevert { .. }))
            .count()
    }
}

/// Index of reverts by the claim they roll back
///
/// Insertion keeps the first revert per claim; later ones are counted as
/// redundant.
#[derive(Debug, Default)]
pub struct RevertIndex<'a> {
    by_claim: HashMap<&'a str, &'a RevertRecord>,
    redundant: usize,
}

impl<'a> RevertIndex<'a> {
    pub fn build(reverts: &'a [RevertRecord]) -> Self {
        let mut index = Self::default();
        for revert in reverts {
            index.insert(revert);
        }
        index
    }

    /// Returns `false` (and counts a redundant revert) if the claim is already indexed
    pub fn insert(&mut self, revert: &'a RevertRecord) -> bool {
        match self.by_claim.entry(revert.claim_id.as_str()) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    claim_id = %revert.claim_id,
                    kept = %existing.get().revert_id,
                    ignored = %revert.revert_id,
                    "Ignoring redundant revert"
                );
                self.redundant += 1;
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(revert);
                true
            }
        }
    }

    pub fn get(&self, claim_id: &str) -> Option<&'a RevertRecord> {
        self.by_claim.get(claim_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_claim.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_claim.is_empty()
    }

    pub fn redundant(&self) -> usize {
        self.redundant
    }
}

/// Reconcile claims with their reverts into fact events
pub fn reconcile(claims: &[ClaimRecord], reverts: &[RevertRecord]) -> Reconciliation {
    let index = RevertIndex::build(reverts);

    let events: Vec<FactEvent> = claims
        .iter()
        .map(|claim| FactEvent::from_claim(claim, index.get(claim.claim_id.as_str())))
        .collect();

    let claimed: HashSet<&str> = claims.iter().map(|c| c.claim_id.as_str()).collect();
    let mut warnings = Vec::new();
    for revert in reverts {
        if !claimed.contains(revert.claim_id.as_str()) {
            tracing::warn!(
                revert_id = %revert.revert_id,
                claim_id = %revert.claim_id,
                "Orphan revert dropped"
            );
            warnings.push(ReconciliationWarning::OrphanRevert {
                revert_id: revert.revert_id.clone(),
                claim_id: revert.claim_id.clone(),
            });
        }
    }

    let reconciliation = Reconciliation {
        events,
        warnings,
        redundant_reverts: index.redundant(),
    };

    tracing::info!(
        claims = claims.len(),
        reverts = reverts.len(),
        reverted = reconciliation.reverted_count(),
        orphans = reconciliation.orphan_count(),
        redundant = reconciliation.redundant_reverts,
        "Reconciled claims with reverts"
    );

    reconciliation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DrugProductId, EventType, PharmacyId};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn claim(id: &str) -> ClaimRecord {
        ClaimRecord {
            claim_id: ClaimId::new(id).unwrap(),
            pharmacy_id: PharmacyId::new("P1").unwrap(),
            drug_product_id: DrugProductId::new("D1").unwrap(),
            quantity: 10,
            price: Decimal::new(5, 0),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn revert(id: &str, claim_id: &str, day: u32) -> RevertRecord {
        RevertRecord {
            revert_id: RevertId::new(id).unwrap(),
            claim_id: ClaimId::new(claim_id).unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_one_event_per_claim_in_input_order() {
        let claims = vec![claim("3"), claim("1"), claim("2")];
        let result = reconcile(&claims, &[revert("r1", "1", 2)]);

        let ids: Vec<&str> = result.events.iter().map(|e| e.claim_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert!(!result.events[0].is_reverted);
        assert!(result.events[1].is_reverted);
        assert_eq!(result.events[1].event_type, EventType::Reverted);
        assert_eq!(result.reverted_count(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_orphan_revert_reported_not_emitted() {
        let claims = vec![claim("1")];
        let result = reconcile(&claims, &[revert("r99", "99", 2)]);

        assert_eq!(result.events.len(), 1);
        assert!(!result.events[0].is_reverted);
        assert_eq!(result.orphan_count(), 1);
        assert_eq!(
            result.warnings[0],
            ReconciliationWarning::OrphanRevert {
                revert_id: RevertId::new("r99").unwrap(),
                claim_id: ClaimId::new("99").unwrap(),
            }
        );
        assert_eq!(
            result.warnings[0].to_string(),
            "orphan revert r99: claim 99 not in current batch"
        );
    }

    #[test]
    fn test_first_revert_wins() {
        let claims = vec![claim("1")];
        let reverts = vec![revert("r1", "1", 2), revert("r2", "1", 5)];
        let result = reconcile(&claims, &reverts);

        let fact = &result.events[0];
        assert_eq!(fact.revert_id.as_ref().map(|r| r.as_str()), Some("r1"));
        assert_eq!(fact.reverted_at, Some(reverts[0].timestamp));
        assert_eq!(result.redundant_reverts, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconcile(&[], &[]);
        assert!(result.events.is_empty());
        assert!(result.warnings.is_empty());

        let result = reconcile(&[], &[revert("r1", "1", 2)]);
        assert!(result.events.is_empty());
        assert_eq!(result.orphan_count(), 1);
    }

    #[test]
    fn test_revert_index_policy() {
        let reverts = vec![revert("r1", "1", 2), revert("r2", "1", 3), revert("r3", "2", 3)];
        let index = RevertIndex::build(&reverts);
        assert_eq!(index.len(), 2);
        assert_eq!(index.redundant(), 1);
        assert_eq!(index.get("1").map(|r| r.revert_id.as_str()), Some("r1"));
        assert!(index.get("9").is_none());
    }
}
