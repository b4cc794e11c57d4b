//! The in-memory pipeline: validate, reconcile, analyse
//!
//! [`process`] performs no I/O. Loading and writing belong to the
//! [`PipelineCoordinator`](super::PipelineCoordinator).

use crate::config::RxLedgerConfig;
use crate::core::analysis::{AnalysisOptions, AnalysisReport, AnalysisWarning, ResultTable};
use crate::core::reconcile::{reconcile, ReconciliationWarning};
use crate::core::validation::{Partition, QuarantinedRecord, SchemaValidator};
use crate::domain::{
    ClaimRecord, EntityType, FactEvent, PharmacyRecord, RawRecord, RecordOrigin, Result,
    RevertRecord, SourceBatch, SourceFile,
};

/// Behaviour switches for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Quarantine claims whose pharmacy is not a valid pharmacy of the batch
    pub enforce_pharmacy_reference: bool,
    pub analysis: AnalysisOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            enforce_pharmacy_reference: true,
            analysis: AnalysisOptions::default(),
        }
    }
}

impl From<&RxLedgerConfig> for PipelineOptions {
    fn from(config: &RxLedgerConfig) -> Self {
        Self {
            enforce_pharmacy_reference: config.validation.enforce_pharmacy_reference,
            analysis: AnalysisOptions {
                exclude_reverted: config.analysis.exclude_reverted,
                top_quantities_limit: config.analysis.top_quantities_limit,
                top_chains_limit: config.analysis.top_chains_limit,
            },
        }
    }
}

/// Quarantined records per entity type
#[derive(Debug, Clone, Default)]
pub struct Quarantine {
    pub pharmacies: Vec<QuarantinedRecord>,
    pub claims: Vec<QuarantinedRecord>,
    pub reverts: Vec<QuarantinedRecord>,
}

impl Quarantine {
    pub fn records(&self, entity_type: EntityType) -> &[QuarantinedRecord] {
        match entity_type {
            EntityType::Pharmacy => &self.pharmacies,
            EntityType::Claim => &self.claims,
            EntityType::Revert => &self.reverts,
        }
    }

    pub fn len(&self) -> usize {
        self.pharmacies.len() + self.claims.len() + self.reverts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub pharmacies: Vec<PharmacyRecord>,
    pub reverts: Vec<RevertRecord>,
    /// One fact per valid claim, in claim input order
    pub facts: Vec<FactEvent>,
    pub quarantine: Quarantine,
    pub reconciliation_warnings: Vec<ReconciliationWarning>,
    pub redundant_reverts: usize,
    pub analysis: AnalysisReport,
}

impl PipelineOutput {
    /// Valid records of `entity_type`
    pub fn valid_count(&self, entity_type: EntityType) -> usize {
        match entity_type {
            EntityType::Pharmacy => self.pharmacies.len(),
            EntityType::Claim => self.facts.len(),
            EntityType::Revert => self.reverts.len(),
        }
    }

    pub fn analysis_warnings(&self) -> &[AnalysisWarning] {
        &self.analysis.warnings
    }

    /// Result tables in output order
    pub fn tables(&self) -> Result<Vec<ResultTable>> {
        self.analysis.tables()
    }
}

fn sourced(files: Vec<SourceFile>) -> impl Iterator<Item = (RecordOrigin, RawRecord)> {
    files.into_iter().flat_map(SourceFile::into_sourced)
}

/// Run validation, reconciliation and analysis over one batch
///
/// Pharmacies are validated first so claims can be checked against them,
/// then claims, then reverts. Every raw record ends up either valid or
/// quarantined.
pub fn process(batch: SourceBatch, options: &PipelineOptions) -> PipelineOutput {
    let SourceBatch {
        pharmacies,
        claims,
        reverts,
    } = batch;

    let mut validator = SchemaValidator::new();

    let pharmacies: Partition<PharmacyRecord> = validator.validate_batch(sourced(pharmacies));
    if options.enforce_pharmacy_reference {
        validator.require_pharmacies(pharmacies.valid.iter().map(|p| p.pharmacy_id.clone()));
    }
    let claims: Partition<ClaimRecord> = validator.validate_batch(sourced(claims));
    let reverts: Partition<RevertRecord> = validator.validate_batch(sourced(reverts));

    let reconciliation = reconcile(&claims.valid, &reverts.valid);
    let analysis = AnalysisReport::run(
        &reconciliation.events,
        &pharmacies.valid,
        &options.analysis,
    );

    PipelineOutput {
        pharmacies: pharmacies.valid,
        reverts: reverts.valid,
        facts: reconciliation.events,
        quarantine: Quarantine {
            pharmacies: pharmacies.quarantined,
            claims: claims.quarantined,
            reverts: reverts.quarantined,
        },
        reconciliation_warnings: reconciliation.warnings,
        redundant_reverts: reconciliation.redundant_reverts,
        analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventType, FileFormat};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    fn file(entity_type: EntityType, records: Value) -> SourceFile {
        let records = records
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect();
        SourceFile::new(
            format!("{entity_type}/test.json"),
            entity_type,
            FileFormat::Json,
            records,
        )
    }

    fn batch(pharmacies: Value, claims: Value, reverts: Value) -> SourceBatch {
        let mut batch = SourceBatch::new();
        batch.push(file(EntityType::Pharmacy, pharmacies));
        batch.push(file(EntityType::Claim, claims));
        batch.push(file(EntityType::Revert, reverts));
        batch
    }

    #[test]
    fn test_end_to_end_scenario() {
        let output = process(
            batch(
                json!([{"pharmacy_id": "P1", "chain": "CVS"}]),
                json!([
                    {"claim_id": "1", "pharmacy_id": "P1", "drug_product_id": "D1",
                     "quantity": 10, "price": 5.0, "timestamp": "2024-01-01T10:00:00"},
                    {"claim_id": "2", "pharmacy_id": "P1", "drug_product_id": "D1",
                     "quantity": 10, "price": 5.0, "timestamp": "2024-01-01T11:00:00"}
                ]),
                json!([{"revert_id": "r1", "claim_id": "1", "timestamp": "2024-01-02"}]),
            ),
            &PipelineOptions::default(),
        );

        assert!(output.quarantine.is_empty());
        assert_eq!(output.facts.len(), 2);
        assert_eq!(output.facts[0].event_type, EventType::Reverted);
        assert_eq!(output.facts[1].event_type, EventType::Claimed);

        let row = &output.analysis.general[0];
        assert_eq!(row.total_fills, 2);
        assert_eq!(row.total_reverted, 1);
        assert_eq!(row.avg_price, Decimal::new(5, 0));
        assert_eq!(row.total_price, Decimal::new(100, 0));
    }

    #[test]
    fn test_every_record_is_valid_or_quarantined() {
        let claims = json!([
            {"claim_id": "1", "pharmacy_id": "P1", "drug_product_id": "D1",
             "quantity": 1, "price": 1, "timestamp": "2024-01-01"},
            {"claim_id": "1", "pharmacy_id": "P1", "drug_product_id": "D1",
             "quantity": 1, "price": 1, "timestamp": "2024-01-01"},
            {"claim_id": "2", "pharmacy_id": "P1", "drug_product_id": "D1",
             "quantity": "many", "price": 1, "timestamp": "2024-01-01"},
            {"claim_id": "3", "pharmacy_id": "P7", "drug_product_id": "D1",
             "quantity": 1, "price": 1, "timestamp": "2024-01-01"}
        ]);
        let output = process(
            batch(json!([{"npi": "P1", "chain": "CVS"}, {"chain": "X"}]), claims, json!([])),
            &PipelineOptions::default(),
        );

        for entity in EntityType::ALL {
            let read = match entity {
                EntityType::Pharmacy => 2,
                EntityType::Claim => 4,
                EntityType::Revert => 0,
            };
            assert_eq!(
                output.valid_count(entity) + output.quarantine.records(entity).len(),
                read
            );
        }

        let reasons: Vec<String> = output
            .quarantine
            .claims
            .iter()
            .map(|q| q.violations[0].to_string())
            .collect();
        assert_eq!(
            reasons,
            vec![
                "duplicate_key: claim_id=1",
                "type mismatch: quantity (expected non-negative integer)",
                "referential violation: pharmacy_id=P7",
            ]
        );
    }

    #[test]
    fn test_reference_check_can_be_disabled() {
        let options = PipelineOptions {
            enforce_pharmacy_reference: false,
            ..PipelineOptions::default()
        };
        let output = process(
            batch(
                json!([]),
                json!([{"id": "1", "npi": 123, "ndc": "D1", "quantity": 1,
                        "price": "2.5", "timestamp": "2024-01-01"}]),
                json!([]),
            ),
            &options,
        );

        assert_eq!(output.facts.len(), 1);
        assert_eq!(output.facts[0].pharmacy_id.as_str(), "123");
        assert_eq!(output.analysis.general[0].chain, None);
    }

    #[test]
    fn test_orphan_and_redundant_reverts_are_reported() {
        let output = process(
            batch(
                json!([{"pharmacy_id": "P1", "chain": "CVS"}]),
                json!([{"claim_id": "1", "pharmacy_id": "P1", "drug_product_id": "D1",
                        "quantity": 1, "price": 1, "timestamp": "2024-01-01"}]),
                json!([
                    {"revert_id": "r1", "claim_id": "1", "timestamp": "2024-01-02"},
                    {"revert_id": "r2", "claim_id": "1", "timestamp": "2024-01-03"},
                    {"revert_id": "r3", "claim_id": "99", "timestamp": "2024-01-03"}
                ]),
            ),
            &PipelineOptions::default(),
        );

        assert_eq!(output.facts[0].revert_id.as_ref().unwrap().as_str(), "r1");
        assert_eq!(output.redundant_reverts, 1);
        assert_eq!(output.reconciliation_warnings.len(), 1);
        assert_eq!(output.valid_count(EntityType::Revert), 3);
    }

    #[test]
    fn test_empty_batch() {
        let output = process(SourceBatch::new(), &PipelineOptions::default());
        assert!(output.facts.is_empty());
        assert!(output.quarantine.is_empty());
        let tables = output.tables().unwrap();
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(ResultTable::is_empty));
    }
}
