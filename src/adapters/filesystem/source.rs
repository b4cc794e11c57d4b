//! Record loader reading CSV and JSON files from per-entity directories

use crate::adapters::traits::RecordSource;
use crate::config::PathsConfig;
use crate::domain::{EntityType, FileFormat, RawRecord, Result, RxLedgerError, SourceFile};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `<base>/<entity dir>/*` for each entity type
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pharmacies_dir: PathBuf,
    claims_dir: PathBuf,
    reverts_dir: PathBuf,
}

impl DirectorySource {
    /// Use the default directory names under `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self::from_config(&PathsConfig {
            base_path: base_path.as_ref().to_string_lossy().into_owned(),
            ..PathsConfig::default()
        })
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self {
            pharmacies_dir: paths.entity_dir(EntityType::Pharmacy),
            claims_dir: paths.entity_dir(EntityType::Claim),
            reverts_dir: paths.entity_dir(EntityType::Revert),
        }
    }

    /// Directory read for `entity_type`
    pub fn dir(&self, entity_type: EntityType) -> &Path {
        match entity_type {
            EntityType::Pharmacy => &self.pharmacies_dir,
            EntityType::Claim => &self.claims_dir,
            EntityType::Revert => &self.reverts_dir,
        }
    }

    /// Supported files of `dir` in file-name order
    fn list_files(dir: &Path) -> Result<Vec<(PathBuf, FileFormat)>> {
        let entries = fs::read_dir(dir).map_err(|e| {
            RxLedgerError::Load(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    RxLedgerError::Load(format!(
                        "Failed to read directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?
                .path();
            if !path.is_file() {
                continue;
            }
            match FileFormat::from_path(&path) {
                Some(format) => files.push((path, format)),
                None => tracing::warn!(
                    path = %path.display(),
                    "Skipping file with unsupported extension"
                ),
            }
        }

        files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
        Ok(files)
    }
}

impl RecordSource for DirectorySource {
    fn load(&self, entity_type: EntityType) -> Result<Vec<SourceFile>> {
        let dir = self.dir(entity_type);
        if !dir.is_dir() {
            tracing::warn!(
                path = %dir.display(),
                entity = %entity_type,
                "Source directory not found; no records loaded"
            );
            return Ok(Vec::new());
        }

        let mut loaded = Vec::new();
        for (path, format) in Self::list_files(dir)? {
            let records = match format {
                FileFormat::Json => read_json_file(&path)?,
                FileFormat::Csv => read_csv_file(&path)?,
            };
            crate::log_file_loaded!(path.display(), entity_type, records.len());
            loaded.push(SourceFile::new(
                path.display().to_string(),
                entity_type,
                format,
                records,
            ));
        }
        Ok(loaded)
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> RxLedgerError {
    RxLedgerError::Load(format!("{}: {}", path.display(), e))
}

/// Read a JSON file holding a top-level array of objects
pub fn read_json_file(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| load_error(path, e))?;

    let Value::Array(items) = value else {
        return Err(load_error(path, "expected a top-level JSON array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(load_error(path, format!("element {} is not an object", i + 1))),
        })
        .collect()
}

/// Read a CSV file with a header row
///
/// Every cell becomes a JSON string; empty cells become null so they count
/// as missing during validation.
pub fn read_csv_file(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| load_error(path, e))?;

    let headers = reader.headers().map_err(|e| load_error(path, e))?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| load_error(path, e))?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (header.to_string(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_read_csv_file() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "pharmacies.csv",
            "chain,npi\nCVS,1234567890\nWalgreens,\n",
        );

        let records = read_csv_file(&temp.path().join("pharmacies.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["npi"], json!("1234567890"));
        assert_eq!(records[0]["chain"], json!("CVS"));
        assert_eq!(records[1]["npi"], Value::Null);
    }

    #[test]
    fn test_read_json_file() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "claims.json",
            r#"[{"id": "1", "quantity": 30.0}, {"id": "2", "price": null}]"#,
        );

        let records = read_json_file(&temp.path().join("claims.json")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["quantity"], json!(30.0));
        assert_eq!(records[1]["price"], Value::Null);
    }

    #[test]
    fn test_json_must_be_array_of_objects() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "object.json", r#"{"id": "1"}"#);
        write(temp.path(), "scalars.json", "[1, 2]");
        write(temp.path(), "broken.json", "[{\"id\": ");

        for name in ["object.json", "scalars.json", "broken.json"] {
            let err = read_json_file(&temp.path().join(name)).unwrap_err();
            assert!(matches!(err, RxLedgerError::Load(_)), "{name}: {err}");
            assert_eq!(err.exit_code(), 3);
        }
    }

    #[test]
    fn test_load_reads_files_in_name_order() {
        let temp = TempDir::new().unwrap();
        let claims = temp.path().join("claims");
        write(&claims, "b.json", r#"[{"id": "b1"}]"#);
        write(&claims, "a.csv", "id\na1\na2\n");
        write(&claims, "notes.txt", "ignored");

        let source = DirectorySource::new(temp.path());
        let files = source.load(EntityType::Claim).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].source.ends_with("a.csv"));
        assert_eq!(files[0].format, FileFormat::Csv);
        assert_eq!(files[0].records.len(), 2);
        assert!(files[1].source.ends_with("b.json"));
        assert!(files.iter().all(|f| f.entity_type == EntityType::Claim));
    }

    #[test]
    fn test_missing_directory_yields_no_files() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path());
        assert!(source.load(EntityType::Revert).unwrap().is_empty());

        let batch = source.load_batch().unwrap();
        for entity in EntityType::ALL {
            assert_eq!(batch.record_count(entity), 0);
        }
    }

    #[test]
    fn test_configured_directory_names() {
        let paths = PathsConfig {
            base_path: "/feeds".to_string(),
            reverts_dir: "rollbacks".to_string(),
            ..PathsConfig::default()
        };
        let source = DirectorySource::from_config(&paths);
        assert_eq!(
            source.dir(EntityType::Revert),
            Path::new("/feeds/rollbacks")
        );
        assert_eq!(
            source.dir(EntityType::Pharmacy),
            Path::new("/feeds/pharmacies")
        );
    }
}
