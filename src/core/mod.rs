//! Core business logic for rxledger.
//!
//! # Modules
//!
//! - [`validation`] - schema validation and quarantine routing
//! - [`reconcile`] - claim / revert reconciliation into fact events
//! - [`analysis`] - general analysis, top quantities, top chains
//! - [`pipeline`] - orchestration of one run
//!
//! # Workflow
//!
//! 1. **Load**: read pharmacy, claim and revert files
//! 2. **Validate**: pharmacies, then claims (against valid pharmacies), then reverts
//! 3. **Reconcile**: one fact event per valid claim, reverted or not
//! 4. **Analyse**: three independent passes over the facts
//! 5. **Write**: quarantine sets, result tables and optionally the facts
//!
//! # Example
//!
//! ```rust,no_run
//! use rxledger::config::load_config;
//! use rxledger::core::pipeline::PipelineCoordinator;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rxledger.toml")?;
//! let mut coordinator = PipelineCoordinator::from_config(&config)?;
//! let summary = coordinator.execute()?;
//!
//! println!("Facts: {}", summary.facts);
//! println!("Quarantined: {}", summary.total_quarantined());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod pipeline;
pub mod reconcile;
pub mod validation;
