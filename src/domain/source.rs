//! Loaded source data handed from the record loader to the core
//!
//! The loader parses bytes into [`RawRecord`]s; everything here is already in
//! memory and ordered the way the files were read.

use super::records::{EntityType, RawRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// On-disk format of a source file or result table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Json,
    Csv,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "csv" => Ok(FileFormat::Csv),
            other => Err(format!("Unsupported format '{other}'. Must be one of: json, csv")),
        }
    }
}

/// Where a raw record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOrigin {
    /// Source file (or other label) the record was read from
    pub source: String,
    /// 1-based position of the record within its source
    pub row: usize,
}

/// One parsed source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source: String,
    pub entity_type: EntityType,
    pub format: FileFormat,
    pub records: Vec<RawRecord>,
}

impl SourceFile {
    pub fn new(
        source: impl Into<String>,
        entity_type: EntityType,
        format: FileFormat,
        records: Vec<RawRecord>,
    ) -> Self {
        Self {
            source: source.into(),
            entity_type,
            format,
            records,
        }
    }

    /// Records paired with their origin, in file order
    pub fn into_sourced(self) -> impl Iterator<Item = (RecordOrigin, RawRecord)> {
        let source = self.source;
        self.records
            .into_iter()
            .enumerate()
            .map(move |(i, record)| {
                (
                    RecordOrigin {
                        source: source.clone(),
                        row: i + 1,
                    },
                    record,
                )
            })
    }
}

/// Everything loaded for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub pharmacies: Vec<SourceFile>,
    pub claims: Vec<SourceFile>,
    pub reverts: Vec<SourceFile>,
}

impl SourceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under the entity type it declares
    pub fn push(&mut self, file: SourceFile) {
        match file.entity_type {
            EntityType::Pharmacy => self.pharmacies.push(file),
            EntityType::Claim => self.claims.push(file),
            EntityType::Revert => self.reverts.push(file),
        }
    }

    /// Files loaded for `entity_type`
    pub fn files(&self, entity_type: EntityType) -> &[SourceFile] {
        match entity_type {
            EntityType::Pharmacy => &self.pharmacies,
            EntityType::Claim => &self.claims,
            EntityType::Revert => &self.reverts,
        }
    }

    /// Number of raw records loaded for `entity_type`
    pub fn record_count(&self, entity_type: EntityType) -> usize {
        self.files(entity_type).iter().map(|f| f.records.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("claims/a.JSON")),
            Some(FileFormat::Json)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("pharmacies/p.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(FileFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(FileFormat::from_str("CSV").unwrap(), FileFormat::Csv);
        assert!(FileFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_into_sourced_numbers_rows_from_one() {
        let file = SourceFile::new(
            "claims/c1.json",
            EntityType::Claim,
            FileFormat::Json,
            vec![record(json!({"id": "1"})), record(json!({"id": "2"}))],
        );

        let origins: Vec<RecordOrigin> = file.into_sourced().map(|(o, _)| o).collect();
        assert_eq!(origins[0].row, 1);
        assert_eq!(origins[1].row, 2);
        assert_eq!(origins[1].source, "claims/c1.json");
    }

    #[test]
    fn test_batch_push_routes_by_entity() {
        let mut batch = SourceBatch::new();
        batch.push(SourceFile::new(
            "p.csv",
            EntityType::Pharmacy,
            FileFormat::Csv,
            vec![record(json!({"npi": "1"}))],
        ));
        batch.push(SourceFile::new("r.json", EntityType::Revert, FileFormat::Json, vec![]));

        assert_eq!(batch.pharmacies.len(), 1);
        assert_eq!(batch.reverts.len(), 1);
        assert_eq!(batch.record_count(EntityType::Pharmacy), 1);
        assert_eq!(batch.record_count(EntityType::Claim), 0);
    }
}
