//! In-memory source and sink for tests and embedding

use crate::adapters::traits::{RecordSource, ResultSink};
use crate::core::analysis::ResultTable;
use crate::core::validation::QuarantinedRecord;
use crate::domain::{EntityType, FactEvent, FileFormat, RawRecord, Result, SourceFile};
use std::collections::BTreeMap;

/// Source serving pre-built files
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: Vec<SourceFile>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    /// Add one JSON-shaped file of `records` under `name`
    pub fn with_records(
        self,
        entity_type: EntityType,
        name: impl Into<String>,
        records: Vec<RawRecord>,
    ) -> Self {
        self.with_file(SourceFile::new(name, entity_type, FileFormat::Json, records))
    }
}

impl RecordSource for InMemorySource {
    fn load(&self, entity_type: EntityType) -> Result<Vec<SourceFile>> {
        Ok(self
            .files
            .iter()
            .filter(|f| f.entity_type == entity_type)
            .cloned()
            .collect())
    }
}

/// Sink keeping everything it receives
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub quarantine: BTreeMap<EntityType, Vec<QuarantinedRecord>>,
    pub tables: Vec<ResultTable>,
    pub facts: Vec<FactEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&ResultTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn quarantined(&self, entity_type: EntityType) -> &[QuarantinedRecord] {
        self.quarantine
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ResultSink for MemorySink {
    fn write_quarantine(
        &mut self,
        entity_type: EntityType,
        records: &[QuarantinedRecord],
    ) -> Result<()> {
        self.quarantine
            .entry(entity_type)
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }

    fn write_table(&mut self, table: &ResultTable) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }

    fn write_facts(&mut self, facts: &[FactEvent]) -> Result<()> {
        self.facts.extend_from_slice(facts);
        Ok(())
    }
}
