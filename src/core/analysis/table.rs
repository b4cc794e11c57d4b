//! Flat result tables handed to the result sink
//!
//! Ranked analyses expand to one row per ranked entry so every table can be
//! written as CSV as well as JSON.

use super::general::GeneralAnalysisRow;
use super::top_chains::TopChainRow;
use super::top_quantities::TopQuantityRow;
use super::{GENERAL_ANALYSIS, TOP_CHAINS, TOP_PRESCRIBED_QUANTITIES};
use crate::domain::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// One output row: column name to value, in column order
pub type FlatRow = Map<String, Value>;

/// A named, ordered sequence of flat rows
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub name: String,
    /// Column names in output order
    pub columns: Vec<&'static str>,
    pub rows: Vec<FlatRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct RowBuilder(FlatRow);

impl RowBuilder {
    fn new() -> Self {
        Self(Map::new())
    }

    fn col(mut self, name: &str, value: impl Serialize) -> Result<Self> {
        self.0.insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    fn build(self) -> FlatRow {
        self.0
    }
}

const GENERAL_COLUMNS: [&str; 7] = [
    "pharmacy_id",
    "chain",
    "drug_product_id",
    "total_fills",
    "total_reverted",
    "avg_price",
    "total_price",
];

pub fn general_table(rows: &[GeneralAnalysisRow]) -> Result<ResultTable> {
    let rows = rows
        .iter()
        .map(|row| {
            Ok(RowBuilder::new()
                .col("pharmacy_id", &row.pharmacy_id)?
                .col("chain", &row.chain)?
                .col("drug_product_id", &row.drug_product_id)?
                .col("total_fills", row.total_fills)?
                .col("total_reverted", row.total_reverted)?
                .col("avg_price", row.avg_price)?
                .col("total_price", row.total_price)?
                .build())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResultTable {
        name: GENERAL_ANALYSIS.to_string(),
        columns: GENERAL_COLUMNS.to_vec(),
        rows,
    })
}

const QUANTITY_COLUMNS: [&str; 4] = ["drug_product_id", "rank", "quantity", "count"];

pub fn top_quantities_table(rows: &[TopQuantityRow]) -> Result<ResultTable> {
    let mut flat = Vec::new();
    for row in rows {
        for (i, entry) in row.quantities.iter().enumerate() {
            flat.push(
                RowBuilder::new()
                    .col("drug_product_id", &row.drug_product_id)?
                    .col("rank", i + 1)?
                    .col("quantity", entry.quantity)?
                    .col("count", entry.count)?
                    .build(),
            );
        }
    }

    Ok(ResultTable {
        name: TOP_PRESCRIBED_QUANTITIES.to_string(),
        columns: QUANTITY_COLUMNS.to_vec(),
        rows: flat,
    })
}

const CHAIN_COLUMNS: [&str; 4] = ["drug_product_id", "rank", "chain", "max_price"];

pub fn top_chains_table(rows: &[TopChainRow]) -> Result<ResultTable> {
    let mut flat = Vec::new();
    for row in rows {
        for (i, entry) in row.chains.iter().enumerate() {
            flat.push(
                RowBuilder::new()
                    .col("drug_product_id", &row.drug_product_id)?
                    .col("rank", i + 1)?
                    .col("chain", &entry.chain)?
                    .col("max_price", entry.max_price)?
                    .build(),
            );
        }
    }

    Ok(ResultTable {
        name: TOP_CHAINS.to_string(),
        columns: CHAIN_COLUMNS.to_vec(),
        rows: flat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::top_chains::ChainPrice;
    use crate::core::analysis::top_quantities::QuantityCount;
    use crate::domain::{DrugProductId, PharmacyId};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_general_table_columns_in_order() {
        let table = general_table(&[GeneralAnalysisRow {
            pharmacy_id: PharmacyId::new("P1").unwrap(),
            chain: None,
            drug_product_id: DrugProductId::new("D1").unwrap(),
            total_fills: 2,
            total_reverted: 1,
            avg_price: Decimal::new(5, 0),
            total_price: Decimal::new(100, 0),
        }])
        .unwrap();

        let row = &table.rows[0];
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, table.columns);
        assert_eq!(row["chain"], Value::Null);
        assert_eq!(row["total_fills"], json!(2));
        assert_eq!(row["total_price"], json!(100.0));
    }

    #[test]
    fn test_ranked_tables_expand_entries() {
        let quantities = top_quantities_table(&[TopQuantityRow {
            drug_product_id: DrugProductId::new("D1").unwrap(),
            quantities: vec![
                QuantityCount {
                    quantity: 30,
                    count: 3,
                },
                QuantityCount {
                    quantity: 60,
                    count: 1,
                },
            ],
        }])
        .unwrap();
        assert_eq!(quantities.len(), 2);
        assert_eq!(quantities.rows[1]["rank"], json!(2));
        assert_eq!(quantities.rows[1]["quantity"], json!(60));

        let chains = top_chains_table(&[TopChainRow {
            drug_product_id: DrugProductId::new("D1").unwrap(),
            chains: vec![ChainPrice {
                chain: "CVS".to_string(),
                max_price: Decimal::new(1999, 2),
            }],
        }])
        .unwrap();
        assert_eq!(chains.name, "top_chains");
        assert_eq!(chains.rows[0]["chain"], json!("CVS"));
        assert_eq!(chains.rows[0]["max_price"], json!(19.99));
    }

    #[test]
    fn test_empty_tables() {
        assert!(general_table(&[]).unwrap().is_empty());
        assert!(top_quantities_table(&[]).unwrap().is_empty());
        assert!(top_chains_table(&[]).unwrap().is_empty());
    }
}
