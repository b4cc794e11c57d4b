//! Highest-paying pharmacy chains per drug

use super::{AnalysisOptions, AnalysisWarning, TOP_CHAINS};
use crate::domain::{DrugProductId, FactEvent, PharmacyRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// A chain and the highest price it was paid for a drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPrice {
    pub chain: String,
    pub max_price: Decimal,
}

/// Ranked chains for one drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopChainRow {
    pub drug_product_id: DrugProductId,
    /// Highest max price first; equal prices in chain-name order
    pub chains: Vec<ChainPrice>,
}

/// Output of [`top_chains`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopChains {
    pub rows: Vec<TopChainRow>,
    /// Facts left out because their pharmacy is unknown
    pub warnings: Vec<AnalysisWarning>,
}

/// Rank chains per drug by the maximum price observed
///
/// Facts are joined to chains through `pharmacy_id`. A fact whose pharmacy
/// is not among `pharmacies` is excluded from this analysis with a warning.
pub fn top_chains(
    events: &[FactEvent],
    pharmacies: &[PharmacyRecord],
    options: &AnalysisOptions,
) -> TopChains {
    let mut chain_of: HashMap<&str, &str> = HashMap::new();
    for pharmacy in pharmacies {
        chain_of
            .entry(pharmacy.pharmacy_id.as_str())
            .or_insert(pharmacy.chain.as_str());
    }

    let mut warnings = Vec::new();
    let mut max_prices: BTreeMap<&DrugProductId, HashMap<&str, Decimal>> = BTreeMap::new();

    for event in events.iter().filter(|e| options.counts_as_fill(e)) {
        let Some(&chain) = chain_of.get(event.pharmacy_id.as_str()) else {
            tracing::warn!(
                claim_id = %event.claim_id,
                pharmacy_id = %event.pharmacy_id,
                "Fact references unknown pharmacy; excluded from top chains"
            );
            warnings.push(AnalysisWarning::UnknownPharmacy {
                analysis: TOP_CHAINS,
                claim_id: event.claim_id.clone(),
                pharmacy_id: event.pharmacy_id.clone(),
            });
            continue;
        };

        max_prices
            .entry(&event.drug_product_id)
            .or_default()
            .entry(chain)
            .and_modify(|max| *max = (*max).max(event.price))
            .or_insert(event.price);
    }

    let rows = max_prices
        .into_iter()
        .map(|(drug_product_id, prices)| {
            let mut chains: Vec<ChainPrice> = prices
                .into_iter()
                .map(|(chain, max_price)| ChainPrice {
                    chain: chain.to_string(),
                    max_price,
                })
                .collect();
            chains.sort_by(|a, b| {
                Reverse(a.max_price)
                    .cmp(&Reverse(b.max_price))
                    .then_with(|| a.chain.cmp(&b.chain))
            });
            chains.truncate(options.top_chains_limit);

            TopChainRow {
                drug_product_id: drug_product_id.clone(),
                chains,
            }
        })
        .collect();

    TopChains { rows, warnings }
}
