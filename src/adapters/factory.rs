//! Source and sink construction from configuration

use crate::adapters::filesystem::{DirectorySource, FileSink};
use crate::config::RxLedgerConfig;
use crate::domain::Result;

/// Build the directory source and file sink described by `config`
pub fn create_source_and_sink(config: &RxLedgerConfig) -> Result<(DirectorySource, FileSink)> {
    let source = DirectorySource::from_config(&config.paths);
    let sink = FileSink::from_config(config)?;

    tracing::debug!(
        base_path = %config.paths.base_path,
        format = %config.output.format,
        dry_run = config.application.dry_run,
        "Created directory source and file sink"
    );

    Ok((source, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityType;
    use std::path::Path;

    #[test]
    fn test_create_from_default_config() {
        let (source, sink) = create_source_and_sink(&RxLedgerConfig::default()).unwrap();
        assert_eq!(source.dir(EntityType::Claim), Path::new("data/claims"));
        assert!(sink
            .table_path("top_chains")
            .starts_with(Path::new("data/results")));
    }

    #[test]
    fn test_invalid_format_is_configuration_error() {
        let mut config = RxLedgerConfig::default();
        config.output.format = "xml".to_string();
        let err = create_source_and_sink(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
