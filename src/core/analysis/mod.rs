//! Analysis engine
//!
//! Three independent, read-only passes over the fact events:
//!
//! - [`general_analysis`] - fills, reverts and prices per pharmacy and drug
//! - [`top_prescribed_quantities`] - most frequent quantities per drug
//! - [`top_chains`] - highest-paying chains per drug
//!
//! None of them fail: an empty fact sequence yields empty results, and facts
//! that cannot be joined are left out of the affected analysis with an
//! [`AnalysisWarning`].

pub mod general;
pub mod table;
pub mod top_chains;
pub mod top_quantities;

pub use general::{general_analysis, GeneralAnalysis, GeneralAnalysisRow};
pub use table::{FlatRow, ResultTable};
pub use top_chains::{top_chains, ChainPrice, TopChainRow, TopChains};
pub use top_quantities::{top_prescribed_quantities, QuantityCount, TopQuantityRow};

use crate::domain::{ClaimId, EventType, FactEvent, PharmacyId, PharmacyRecord, Result};
use std::fmt;

pub const GENERAL_ANALYSIS: &str = "general_analysis";
pub const TOP_PRESCRIBED_QUANTITIES: &str = "top_prescribed_quantities";
pub const TOP_CHAINS: &str = "top_chains";

/// Tunables shared by all analyses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Count only facts still in the CLAIMED state as fills
    pub exclude_reverted: bool,
    pub top_quantities_limit: usize,
    pub top_chains_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            exclude_reverted: false,
            top_quantities_limit: 4,
            top_chains_limit: 2,
        }
    }
}

impl AnalysisOptions {
    /// Whether `event` contributes to fills, prices, quantities and chains
    pub fn counts_as_fill(&self, event: &FactEvent) -> bool {
        !self.exclude_reverted || event.event_type == EventType::Claimed
    }
}

/// A fact excluded from one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisWarning {
    UnknownPharmacy {
        analysis: &'static str,
        claim_id: ClaimId,
        pharmacy_id: PharmacyId,
    },
    PriceOverflow {
        analysis: &'static str,
        claim_id: ClaimId,
    },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::UnknownPharmacy {
                analysis,
                claim_id,
                pharmacy_id,
            } => write!(
                f,
                "{analysis}: claim {claim_id} references unknown pharmacy {pharmacy_id}"
            ),
            AnalysisWarning::PriceOverflow { analysis, claim_id } => write!(
                f,
                "{analysis}: claim {claim_id} price totals exceed the decimal range"
            ),
        }
    }
}

/// Results of all three analyses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub general: Vec<GeneralAnalysisRow>,
    pub top_quantities: Vec<TopQuantityRow>,
    pub top_chains: Vec<TopChainRow>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    /// Run every analysis over the same inputs
    pub fn run(
        events: &[FactEvent],
        pharmacies: &[PharmacyRecord],
        options: &AnalysisOptions,
    ) -> Self {
        let general = general_analysis(events, pharmacies, options);
        let top_quantities = top_prescribed_quantities(events, options);
        let chains = top_chains(events, pharmacies, options);

        let mut warnings = general.warnings;
        warnings.extend(chains.warnings);

        tracing::info!(
            general_rows = general.rows.len(),
            drugs = top_quantities.len(),
            warnings = warnings.len(),
            "Analyses complete"
        );

        Self {
            general: general.rows,
            top_quantities,
            top_chains: chains.rows,
            warnings,
        }
    }

    /// Flat tables in output order
    pub fn tables(&self) -> Result<Vec<ResultTable>> {
        Ok(vec![
            table::general_table(&self.general)?,
            table::top_quantities_table(&self.top_quantities)?,
            table::top_chains_table(&self.top_chains)?,
        ])
    }
}
