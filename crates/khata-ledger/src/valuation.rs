//! # Valuation Service
//!
//! Values the in-stock catalog under a chosen costing method.
//!
//! One query per in-stock product loads its lot history ascending by
//! purchase date; all the FIFO/LIFO/weighted-average math lives in
//! khata-core.

use serde::{Deserialize, Serialize};
use tracing::debug;

use khata_core::valuation::value_product;
use khata_core::{CoreError, Money, ValuationMethod, ValuationRow};
use khata_db::Database;

use crate::error::LedgerResult;

/// Catalog-level valuation totals alongside the per-product rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub method: ValuationMethod,
    pub rows: Vec<ValuationRow>,
    pub total_inventory_value: Money,
    pub total_potential_profit: Money,
}

/// Values remaining inventory under FIFO, LIFO or weighted average.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    db: Database,
}

impl ValuationEngine {
    /// Creates an engine over the given database handle.
    pub fn new(db: Database) -> Self {
        ValuationEngine { db }
    }

    /// Values every active product with positive stock on hand.
    ///
    /// ## Errors
    /// - `CoreError::EmptyDataset` when nothing is in stock - a recoverable
    ///   "no data" condition, not a failure
    pub async fn value_inventory(&self, method: ValuationMethod) -> LedgerResult<ValuationReport> {
        let products = self.db.products().list_in_stock().await?;

        if products.is_empty() {
            return Err(CoreError::EmptyDataset("no products in stock".to_string()).into());
        }

        debug!(method = %method, products = products.len(), "Valuing inventory");

        let mut rows = Vec::with_capacity(products.len());
        for product in &products {
            let lots = self.db.purchases().lots_for_product(&product.id).await?;
            rows.push(value_product(product, &lots, method));
        }

        let total_inventory_value = rows.iter().map(|r| r.inventory_value).sum();
        let total_potential_profit = rows.iter().map(|r| r.potential_profit).sum();

        Ok(ValuationReport {
            method,
            rows,
            total_inventory_value,
            total_potential_profit,
        })
    }
}
