//! Run summary and reporting
//!
//! Counters collected over one pipeline run, logged at the end of the run
//! and printed by the CLI.

use super::process::PipelineOutput;
use crate::domain::{EntityType, SourceBatch};
use std::time::Duration;

/// Record counts for one entity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub read: usize,
    pub valid: usize,
    pub quarantined: usize,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub pharmacies: EntityCounts,
    pub claims: EntityCounts,
    pub reverts: EntityCounts,

    /// Fact events produced (one per valid claim)
    pub facts: usize,

    /// Facts whose claim was reverted
    pub reverted_facts: usize,

    pub orphan_reverts: usize,
    pub redundant_reverts: usize,

    /// Facts excluded from an analysis
    pub analysis_warnings: usize,

    /// Result tables handed to the sink
    pub tables_written: usize,

    /// Nothing was written
    pub dry_run: bool,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect counts from a finished in-memory run
    pub fn from_output(batch_counts: &BatchCounts, output: &PipelineOutput) -> Self {
        let mut summary = Self::new();
        for entity in EntityType::ALL {
            *summary.counts_mut(entity) = EntityCounts {
                read: batch_counts.get(entity),
                valid: output.valid_count(entity),
                quarantined: output.quarantine.records(entity).len(),
            };
        }
        summary.facts = output.facts.len();
        summary.reverted_facts = output.facts.iter().filter(|f| f.is_reverted).count();
        summary.orphan_reverts = output.reconciliation_warnings.len();
        summary.redundant_reverts = output.redundant_reverts;
        summary.analysis_warnings = output.analysis_warnings().len();
        summary
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn counts(&self, entity_type: EntityType) -> EntityCounts {
        match entity_type {
            EntityType::Pharmacy => self.pharmacies,
            EntityType::Claim => self.claims,
            EntityType::Revert => self.reverts,
        }
    }

    fn counts_mut(&mut self, entity_type: EntityType) -> &mut EntityCounts {
        match entity_type {
            EntityType::Pharmacy => &mut self.pharmacies,
            EntityType::Claim => &mut self.claims,
            EntityType::Revert => &mut self.reverts,
        }
    }

    pub fn total_read(&self) -> usize {
        EntityType::ALL.iter().map(|e| self.counts(*e).read).sum()
    }

    pub fn total_quarantined(&self) -> usize {
        EntityType::ALL.iter().map(|e| self.counts(*e).quarantined).sum()
    }

    /// No record quarantined and no warning raised
    pub fn is_clean(&self) -> bool {
        self.total_quarantined() == 0 && self.orphan_reverts == 0 && self.analysis_warnings == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            pharmacies_read = self.pharmacies.read,
            pharmacies_valid = self.pharmacies.valid,
            claims_read = self.claims.read,
            claims_valid = self.claims.valid,
            reverts_read = self.reverts.read,
            reverts_valid = self.reverts.valid,
            quarantined = self.total_quarantined(),
            facts = self.facts,
            reverted_facts = self.reverted_facts,
            tables_written = self.tables_written,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Run completed"
        );

        if !self.is_clean() {
            tracing::warn!(
                quarantined = self.total_quarantined(),
                orphan_reverts = self.orphan_reverts,
                analysis_warnings = self.analysis_warnings,
                "Run completed with findings"
            );
        }
    }
}

/// Raw record counts per entity type, taken before validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub pharmacies: usize,
    pub claims: usize,
    pub reverts: usize,
}

impl BatchCounts {
    pub fn of(batch: &SourceBatch) -> Self {
        Self {
            pharmacies: batch.record_count(EntityType::Pharmacy),
            claims: batch.record_count(EntityType::Claim),
            reverts: batch.record_count(EntityType::Revert),
        }
    }

    pub fn get(&self, entity_type: EntityType) -> usize {
        match entity_type {
            EntityType::Pharmacy => self.pharmacies,
            EntityType::Claim => self.claims,
            EntityType::Revert => self.reverts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::process::{process, PipelineOptions};
    use crate::domain::{FileFormat, SourceFile};
    use serde_json::json;

    fn batch() -> SourceBatch {
        let records = |v: serde_json::Value| {
            v.as_array()
                .unwrap()
                .iter()
                .map(|r| r.as_object().unwrap().clone())
                .collect()
        };
        let mut batch = SourceBatch::new();
        batch.push(SourceFile::new(
            "pharmacies/p.json",
            EntityType::Pharmacy,
            FileFormat::Json,
            records(json!([{"npi": "P1", "chain": "CVS"}])),
        ));
        batch.push(SourceFile::new(
            "claims/c.json",
            EntityType::Claim,
            FileFormat::Json,
            records(json!([
                {"id": "1", "npi": "P1", "ndc": "D1", "quantity": 1, "price": 1,
                 "timestamp": "2024-01-01"},
                {"id": "2", "npi": "P1", "ndc": "D1", "price": 1, "timestamp": "2024-01-01"}
            ])),
        ));
        batch.push(SourceFile::new(
            "reverts/r.json",
            EntityType::Revert,
            FileFormat::Json,
            records(json!([
                {"id": "r1", "claim_id": "1", "timestamp": "2024-01-02"},
                {"id": "r2", "claim_id": "7", "timestamp": "2024-01-02"}
            ])),
        ));
        batch
    }

    #[test]
    fn test_summary_creation() {
        let summary = RunSummary::new();
        assert_eq!(summary.total_read(), 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.is_clean());
    }

    #[test]
    fn test_summary_from_output() {
        let batch = batch();
        let counts = BatchCounts::of(&batch);
        let output = process(batch, &PipelineOptions::default());
        let summary =
            RunSummary::from_output(&counts, &output).with_duration(Duration::from_millis(5));

        assert_eq!(
            summary.claims,
            EntityCounts {
                read: 2,
                valid: 1,
                quarantined: 1
            }
        );
        assert_eq!(summary.counts(EntityType::Revert).valid, 2);
        assert_eq!(summary.total_read(), 5);
        assert_eq!(summary.facts, 1);
        assert_eq!(summary.reverted_facts, 1);
        assert_eq!(summary.orphan_reverts, 1);
        assert_eq!(summary.duration, Duration::from_millis(5));
        assert!(!summary.is_clean());
    }
}
