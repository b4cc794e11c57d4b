// rxledger - Pharmacy claim reconciliation and analytics
// Copyright (c) 2025 rxledger Contributors
// Licensed under the MIT License

//! # rxledger - pharmacy claim reconciliation and analytics
//!
//! rxledger takes three batch feeds (pharmacy master data, drug claims and
//! claim rollbacks), validates every record against its schema, reconciles
//! claims with their rollbacks into fact events, and runs three analyses
//! over the facts.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Validation, reconciliation, analysis and orchestration
//! - [`adapters`] - Record sources and result sinks (filesystem, memory)
//! - [`domain`] - Identifiers, records, fact events and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rxledger::config::load_config;
//! use rxledger::core::pipeline::PipelineCoordinator;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("rxledger.toml")?;
//!     let mut coordinator = PipelineCoordinator::from_config(&config)?;
//!     let summary = coordinator.execute()?;
//!
//!     println!("{} facts, {} reverted", summary.facts, summary.reverted_facts);
//!     Ok(())
//! }
//! ```
//!
//! ## In-memory use
//!
//! The pipeline itself performs no I/O:
//!
//! ```rust
//! use rxledger::core::pipeline::{process, PipelineOptions};
//! use rxledger::domain::SourceBatch;
//!
//! let output = process(SourceBatch::new(), &PipelineOptions::default());
//! assert!(output.facts.is_empty());
//! ```
//!
//! ## Error Handling
//!
//! Run-level failures use [`domain::RxLedgerError`]. Invalid records,
//! orphan reverts and analysis gaps are values reported next to the
//! results and never abort a run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
