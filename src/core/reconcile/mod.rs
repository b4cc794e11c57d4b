//! Fact reconciliation
//!
//! Turns validated claim and revert sets into [`FactEvent`](crate::domain::FactEvent)s.

pub mod reconciler;

pub use reconciler::{reconcile, Reconciliation, ReconciliationWarning, RevertIndex};
