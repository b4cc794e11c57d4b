//! General analysis: fills, reverts and prices per pharmacy and drug

use super::{AnalysisOptions, AnalysisWarning, GENERAL_ANALYSIS};
use crate::domain::{DrugProductId, FactEvent, PharmacyId, PharmacyRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Aggregates for one `(pharmacy_id, drug_product_id)` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralAnalysisRow {
    pub pharmacy_id: PharmacyId,
    /// Chain of the pharmacy, if the pharmacy is known
    pub chain: Option<String>,
    pub drug_product_id: DrugProductId,
    pub total_fills: u64,
    pub total_reverted: u64,
    pub avg_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Default)]
struct GroupTotals {
    fills: u64,
    reverted: u64,
    price_sum: Decimal,
    line_total: Decimal,
}

impl GroupTotals {
    /// Count `event` as a fill; false, with nothing changed, when a sum
    /// would leave the decimal range
    fn add_fill(&mut self, event: &FactEvent) -> bool {
        let sums = event.line_total().and_then(|line| {
            Some((
                self.price_sum.checked_add(event.price)?,
                self.line_total.checked_add(line)?,
            ))
        });
        match sums {
            Some((price_sum, line_total)) => {
                self.fills += 1;
                self.price_sum = price_sum;
                self.line_total = line_total;
                true
            }
            None => false,
        }
    }
}

/// Output of [`general_analysis`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralAnalysis {
    pub rows: Vec<GeneralAnalysisRow>,
    /// Facts left out because their prices no longer fit the group totals
    pub warnings: Vec<AnalysisWarning>,
}

/// Group facts by pharmacy and drug
///
/// Rows are ordered by `total_fills` descending, then by
/// `(pharmacy_id, drug_product_id)` ascending. Groups without a single
/// counted fill are left out. A fact that would push a group's price sums
/// past the decimal range is excluded from its group with a warning.
pub fn general_analysis(
    events: &[FactEvent],
    pharmacies: &[PharmacyRecord],
    options: &AnalysisOptions,
) -> GeneralAnalysis {
    let mut chains: HashMap<&str, &str> = HashMap::new();
    for pharmacy in pharmacies {
        chains
            .entry(pharmacy.pharmacy_id.as_str())
            .or_insert(pharmacy.chain.as_str());
    }

    let mut warnings = Vec::new();
    let mut groups: BTreeMap<(&PharmacyId, &DrugProductId), GroupTotals> = BTreeMap::new();
    for event in events {
        let totals = groups
            .entry((&event.pharmacy_id, &event.drug_product_id))
            .or_default();

        if options.counts_as_fill(event) && !totals.add_fill(event) {
            tracing::warn!(
                claim_id = %event.claim_id,
                pharmacy_id = %event.pharmacy_id,
                drug_product_id = %event.drug_product_id,
                "Price totals out of range; fact excluded from general analysis"
            );
            warnings.push(AnalysisWarning::PriceOverflow {
                analysis: GENERAL_ANALYSIS,
                claim_id: event.claim_id.clone(),
            });
            continue;
        }
        if event.is_reverted {
            totals.reverted += 1;
        }
    }

    let mut rows: Vec<GeneralAnalysisRow> = groups
        .into_iter()
        .filter(|(_, totals)| totals.fills > 0)
        .map(|((pharmacy_id, drug_product_id), totals)| GeneralAnalysisRow {
            pharmacy_id: pharmacy_id.clone(),
            chain: chains.get(pharmacy_id.as_str()).map(|c| c.to_string()),
            drug_product_id: drug_product_id.clone(),
            total_fills: totals.fills,
            total_reverted: totals.reverted,
            // fills > 0, so the mean never exceeds price_sum
            avg_price: (totals.price_sum / Decimal::from(totals.fills)).normalize(),
            total_price: totals.line_total.normalize(),
        })
        .collect();

    // stable: groups are already in ascending key order
    rows.sort_by(|a, b| b.total_fills.cmp(&a.total_fills));
    GeneralAnalysis { rows, warnings }
}
