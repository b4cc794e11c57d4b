//! Pipeline orchestration
//!
//! - [`process`] - pure validate / reconcile / analyse over a loaded batch
//! - [`PipelineCoordinator`] - load, process, write, summarise
//! - [`RunSummary`] - counters for one run

pub mod coordinator;
pub mod process;
pub mod summary;

pub use coordinator::PipelineCoordinator;
pub use process::{process, PipelineOptions, PipelineOutput, Quarantine};
pub use summary::{BatchCounts, EntityCounts, RunSummary};
