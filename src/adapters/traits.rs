//! Seams between the pipeline and the outside world
//!
//! The core never touches the filesystem. It pulls raw records through a
//! [`RecordSource`] and pushes everything it produces through a
//! [`ResultSink`].

use crate::core::analysis::ResultTable;
use crate::core::validation::QuarantinedRecord;
use crate::domain::{EntityType, FactEvent, Result, SourceBatch, SourceFile};

/// Supplies raw records per entity type
pub trait RecordSource {
    /// Load every source file declared for `entity_type`, in read order
    ///
    /// # Errors
    ///
    /// Returns [`RxLedgerError::Load`](crate::domain::RxLedgerError::Load) if
    /// a file exists but cannot be read or parsed.
    fn load(&self, entity_type: EntityType) -> Result<Vec<SourceFile>>;

    /// Load all entity types into one batch
    fn load_batch(&self) -> Result<SourceBatch> {
        let mut batch = SourceBatch::new();
        for entity_type in EntityType::ALL {
            for file in self.load(entity_type)? {
                batch.push(file);
            }
        }
        Ok(batch)
    }
}

/// Receives quarantined records, result tables and fact events
pub trait ResultSink {
    /// Persist the quarantined records of one entity type
    fn write_quarantine(
        &mut self,
        entity_type: EntityType,
        records: &[QuarantinedRecord],
    ) -> Result<()>;

    /// Persist one result table
    fn write_table(&mut self, table: &ResultTable) -> Result<()>;

    /// Persist the reconciled fact events
    fn write_facts(&mut self, facts: &[FactEvent]) -> Result<()>;
}
