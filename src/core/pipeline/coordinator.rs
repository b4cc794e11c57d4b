//! Pipeline coordinator - loads, processes and writes one batch
//!
//! Wires a [`RecordSource`] and a [`ResultSink`] around the in-memory
//! [`process`] stage and collects a [`RunSummary`].

use super::process::{process, PipelineOptions};
use super::summary::{BatchCounts, RunSummary};
use crate::adapters::{create_source_and_sink, DirectorySource, FileSink, RecordSource, ResultSink};
use crate::config::RxLedgerConfig;
use crate::domain::{EntityType, Result};
use std::time::Instant;

/// Pipeline coordinator
pub struct PipelineCoordinator<S, K> {
    source: S,
    sink: K,
    options: PipelineOptions,
    write_facts: bool,
    dry_run: bool,
}

impl PipelineCoordinator<DirectorySource, FileSink> {
    /// Coordinator reading and writing the directories named in `config`
    pub fn from_config(config: &RxLedgerConfig) -> Result<Self> {
        let (source, sink) = create_source_and_sink(config)?;
        Ok(Self::new(source, sink, PipelineOptions::from(config))
            .with_facts(config.output.write_facts)
            .with_dry_run(config.application.dry_run))
    }
}

impl<S: RecordSource, K: ResultSink> PipelineCoordinator<S, K> {
    pub fn new(source: S, sink: K, options: PipelineOptions) -> Self {
        Self {
            source,
            sink,
            options,
            write_facts: false,
            dry_run: false,
        }
    }

    /// Also hand the fact events to the sink
    pub fn with_facts(mut self, write_facts: bool) -> Self {
        self.write_facts = write_facts;
        self
    }

    /// Mark the run as a dry run in the summary
    ///
    /// The sink decides what a dry run means for it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Load failures and sink failures abort the run. Invalid records,
    /// orphan reverts and analysis gaps never do; they are counted in the
    /// returned summary.
    pub fn execute(&mut self) -> Result<RunSummary> {
        let start_time = Instant::now();
        tracing::info!(
            enforce_pharmacy_reference = self.options.enforce_pharmacy_reference,
            exclude_reverted = self.options.analysis.exclude_reverted,
            dry_run = self.dry_run,
            "Starting pipeline run"
        );

        let stage = Instant::now();
        let batch = self.source.load_batch()?;
        let counts = BatchCounts::of(&batch);
        crate::log_stage_complete!(
            "load",
            counts.pharmacies + counts.claims + counts.reverts,
            stage.elapsed()
        );

        let stage = Instant::now();
        let output = process(batch, &self.options);
        crate::log_stage_complete!("process", output.facts.len(), stage.elapsed());

        let mut summary = RunSummary::from_output(&counts, &output);
        summary.dry_run = self.dry_run;

        let stage = Instant::now();
        for entity_type in EntityType::ALL {
            let records = output.quarantine.records(entity_type);
            if !records.is_empty() {
                self.sink.write_quarantine(entity_type, records)?;
            }
        }
        for table in output.tables()? {
            self.sink.write_table(&table)?;
            summary.tables_written += 1;
        }
        if self.write_facts {
            self.sink.write_facts(&output.facts)?;
        }
        crate::log_stage_complete!("write", summary.tables_written, stage.elapsed());

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}
