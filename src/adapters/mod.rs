//! Adapters between the pipeline and storage.
//!
//! - [`traits`] - the [`RecordSource`] and [`ResultSink`] seams
//! - [`filesystem`] - CSV/JSON directory source and file sink
//! - [`memory`] - in-memory source and sink
//! - [`factory`] - construction from configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use rxledger::adapters::{DirectorySource, RecordSource};
//! use rxledger::domain::EntityType;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = DirectorySource::new("data");
//! for file in source.load(EntityType::Claim)? {
//!     println!("{}: {} records", file.source, file.records.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod filesystem;
pub mod memory;
pub mod traits;

pub use factory::create_source_and_sink;
pub use filesystem::{DirectorySource, FileSink};
pub use memory::{InMemorySource, MemorySink};
pub use traits::{RecordSource, ResultSink};
