//! Most frequently prescribed quantities per drug

use super::AnalysisOptions;
use crate::domain::{DrugProductId, FactEvent};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// A quantity and how many fills used it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityCount {
    pub quantity: u64,
    pub count: u64,
}

/// Ranked quantities for one drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopQuantityRow {
    pub drug_product_id: DrugProductId,
    /// Most frequent first; equal frequencies put the larger quantity first
    pub quantities: Vec<QuantityCount>,
}

/// Rank the distinct quantities of each drug by how often they were filled
///
/// Keeps at most `options.top_quantities_limit` entries per drug. Rows are
/// ordered by drug id.
pub fn top_prescribed_quantities(
    events: &[FactEvent],
    options: &AnalysisOptions,
) -> Vec<TopQuantityRow> {
    let mut frequencies: BTreeMap<&DrugProductId, HashMap<u64, u64>> = BTreeMap::new();
    for event in events.iter().filter(|e| options.counts_as_fill(e)) {
        *frequencies
            .entry(&event.drug_product_id)
            .or_default()
            .entry(event.quantity)
            .or_insert(0) += 1;
    }

    frequencies
        .into_iter()
        .map(|(drug_product_id, counts)| {
            let mut quantities: Vec<QuantityCount> = counts
                .into_iter()
                .map(|(quantity, count)| QuantityCount { quantity, count })
                .collect();
            quantities.sort_by_key(|q| (Reverse(q.count), Reverse(q.quantity)));
            quantities.truncate(options.top_quantities_limit);

            TopQuantityRow {
                drug_product_id: drug_product_id.clone(),
                quantities,
            }
        })
        .collect()
}
