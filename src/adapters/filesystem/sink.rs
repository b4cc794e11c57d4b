//! Result sink writing quarantine sets and result tables to disk

use crate::adapters::traits::ResultSink;
use crate::config::RxLedgerConfig;
use crate::core::analysis::ResultTable;
use crate::core::validation::QuarantinedRecord;
use crate::domain::{EntityType, FactEvent, FileFormat, Result, RxLedgerError};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Timestamp layout appended to result file names
pub const FILE_STAMP_FORMAT: &str = "%d%m%Y_%H%M%S";

/// Writes under an invalid-records directory and a results directory
///
/// - quarantine: `invalid_<entity>.json`
/// - tables: `<table>_<DDMMYYYY_HHMMSS>.<json|csv>`
/// - facts: `fact_events_<DDMMYYYY_HHMMSS>.json`
///
/// In dry-run mode every write is logged and skipped.
#[derive(Debug, Clone)]
pub struct FileSink {
    invalid_records_dir: PathBuf,
    results_dir: PathBuf,
    format: FileFormat,
    stamp: String,
    dry_run: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(
        invalid_records_dir: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        format: FileFormat,
    ) -> Self {
        Self {
            invalid_records_dir: invalid_records_dir.into(),
            results_dir: results_dir.into(),
            format,
            stamp: chrono::Local::now().format(FILE_STAMP_FORMAT).to_string(),
            dry_run: false,
            written: Vec::new(),
        }
    }

    pub fn from_config(config: &RxLedgerConfig) -> Result<Self> {
        let format = config
            .output
            .file_format()
            .map_err(RxLedgerError::Configuration)?;
        Ok(Self::new(
            config.paths.invalid_records_path(),
            config.paths.results_path(),
            format,
        )
        .with_dry_run(config.application.dry_run))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Override the file-name timestamp
    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = stamp.into();
        self
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn quarantine_path(&self, entity_type: EntityType) -> PathBuf {
        self.invalid_records_dir
            .join(format!("invalid_{}.json", entity_type.as_str()))
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.results_dir.join(format!(
            "{}_{}.{}",
            table_name,
            self.stamp,
            self.format.extension()
        ))
    }

    pub fn facts_path(&self) -> PathBuf {
        self.results_dir
            .join(format!("fact_events_{}.json", self.stamp))
    }

    /// Returns false when the write must be skipped
    fn prepare(&self, path: &Path) -> Result<bool> {
        if self.dry_run {
            tracing::info!(path = %path.display(), "Dry run: skipping write");
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| sink_error(parent, e))?;
        }
        Ok(true)
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, path: PathBuf, value: &T) -> Result<()> {
        if !self.prepare(&path)? {
            return Ok(());
        }
        let file = File::create(&path).map_err(|e| sink_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| sink_error(&path, e))?;
        writer.flush().map_err(|e| sink_error(&path, e))?;
        self.finish(path);
        Ok(())
    }

    fn write_csv(&mut self, path: PathBuf, table: &ResultTable) -> Result<()> {
        if !self.prepare(&path)? {
            return Ok(());
        }
        let mut writer = csv::Writer::from_path(&path).map_err(|e| sink_error(&path, e))?;
        writer
            .write_record(&table.columns)
            .map_err(|e| sink_error(&path, e))?;
        for row in &table.rows {
            let cells: Vec<String> = table
                .columns
                .iter()
                .map(|column| csv_cell(row.get(*column)))
                .collect();
            writer
                .write_record(&cells)
                .map_err(|e| sink_error(&path, e))?;
        }
        writer.flush().map_err(|e| sink_error(&path, e))?;
        self.finish(path);
        Ok(())
    }

    fn finish(&mut self, path: PathBuf) {
        tracing::info!(path = %path.display(), "Wrote output file");
        self.written.push(path);
    }
}

fn sink_error(path: &Path, e: impl std::fmt::Display) -> RxLedgerError {
    RxLedgerError::Sink(format!("{}: {}", path.display(), e))
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// On-disk shape of one quarantined record
#[derive(Serialize)]
struct QuarantineEntry<'a> {
    source: &'a str,
    row: usize,
    record: &'a serde_json::Map<String, Value>,
    violations: Vec<String>,
}

impl ResultSink for FileSink {
    fn write_quarantine(
        &mut self,
        entity_type: EntityType,
        records: &[QuarantinedRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let entries: Vec<QuarantineEntry<'_>> = records
            .iter()
            .map(|q| QuarantineEntry {
                source: &q.origin.source,
                row: q.origin.row,
                record: &q.record,
                violations: q.violations.iter().map(ToString::to_string).collect(),
            })
            .collect();
        self.write_json(self.quarantine_path(entity_type), &entries)
    }

    fn write_table(&mut self, table: &ResultTable) -> Result<()> {
        let path = self.table_path(&table.name);
        match self.format {
            FileFormat::Json => self.write_json(path, &table.rows),
            FileFormat::Csv => self.write_csv(path, table),
        }
    }

    fn write_facts(&mut self, facts: &[FactEvent]) -> Result<()> {
        self.write_json(self.facts_path(), facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::FlatRow;
    use crate::core::validation::Violation;
    use crate::domain::RecordOrigin;
    use serde_json::json;
    use tempfile::TempDir;

    fn sink(temp: &TempDir, format: FileFormat) -> FileSink {
        FileSink::new(
            temp.path().join("invalid_records"),
            temp.path().join("results"),
            format,
        )
        .with_stamp("01022024_101500")
    }

    fn table() -> ResultTable {
        let row = |drug: &str, chain: Value, price: f64| -> FlatRow {
            let mut row = FlatRow::new();
            row.insert("drug_product_id".to_string(), json!(drug));
            row.insert("chain".to_string(), chain);
            row.insert("max_price".to_string(), json!(price));
            row
        };
        ResultTable {
            name: "top_chains".to_string(),
            columns: vec!["drug_product_id", "chain", "max_price"],
            rows: vec![row("D1", json!("CVS"), 19.99), row("D2", Value::Null, 3.5)],
        }
    }

    fn quarantined() -> QuarantinedRecord {
        QuarantinedRecord {
            entity_type: EntityType::Claim,
            origin: RecordOrigin {
                source: "claims/c1.json".to_string(),
                row: 4,
            },
            record: json!({"id": "9"}).as_object().unwrap().clone(),
            violations: vec![
                Violation::MissingField("pharmacy_id"),
                Violation::MissingField("price"),
            ],
        }
    }

    #[test]
    fn test_table_file_names() {
        let temp = TempDir::new().unwrap();
        let sink = sink(&temp, FileFormat::Csv);
        assert_eq!(
            sink.table_path("general_analysis"),
            temp.path().join("results/general_analysis_01022024_101500.csv")
        );
        assert_eq!(
            sink.quarantine_path(EntityType::Revert),
            temp.path().join("invalid_records/invalid_revert.json")
        );
    }

    #[test]
    fn test_write_json_table() {
        let temp = TempDir::new().unwrap();
        let mut sink = sink(&temp, FileFormat::Json);
        sink.write_table(&table()).unwrap();

        let path = sink.table_path("top_chains");
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["chain"], json!("CVS"));
        assert_eq!(written[1]["max_price"], json!(3.5));
        assert_eq!(sink.written(), &[path]);
    }

    #[test]
    fn test_write_csv_table() {
        let temp = TempDir::new().unwrap();
        let mut sink = sink(&temp, FileFormat::Csv);
        sink.write_table(&table()).unwrap();

        let contents = fs::read_to_string(sink.table_path("top_chains")).unwrap();
        assert_eq!(
            contents,
            "drug_product_id,chain,max_price\nD1,CVS,19.99\nD2,,3.5\n"
        );
    }

    #[test]
    fn test_write_quarantine() {
        let temp = TempDir::new().unwrap();
        let mut sink = sink(&temp, FileFormat::Json);
        sink.write_quarantine(EntityType::Claim, &[quarantined()]).unwrap();

        let path = sink.quarantine_path(EntityType::Claim);
        let written: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!([{
                "source": "claims/c1.json",
                "row": 4,
                "record": {"id": "9"},
                "violations": ["missing field: pharmacy_id", "missing field: price"]
            }])
        );
    }

    #[test]
    fn test_empty_quarantine_not_written() {
        let temp = TempDir::new().unwrap();
        let mut sink = sink(&temp, FileFormat::Json);
        sink.write_quarantine(EntityType::Pharmacy, &[]).unwrap();
        assert!(!sink.quarantine_path(EntityType::Pharmacy).exists());
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut sink = sink(&temp, FileFormat::Json).with_dry_run(true);
        sink.write_table(&table()).unwrap();
        sink.write_quarantine(EntityType::Claim, &[quarantined()]).unwrap();
        sink.write_facts(&[]).unwrap();

        assert!(sink.written().is_empty());
        assert!(!temp.path().join("results").exists());
        assert!(!temp.path().join("invalid_records").exists());
    }
}
