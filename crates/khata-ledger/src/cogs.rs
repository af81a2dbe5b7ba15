//! # Cost of Goods Sold Service
//!
//! Builds the period COGS report: one grouped scan over the period's sale
//! lines, one grouped scan over lifetime purchase totals, then pure margin
//! math from khata-core.
//!
//! Sale lines with no resolved product have no cost basis and are excluded
//! (lines committed through the recorder always resolve; only imported
//! legacy rows can be unresolved).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use khata_core::cogs::{build_row, summarize};
use khata_core::validation::validate_date_range;
use khata_core::{CogsSummary, Money};
use khata_db::Database;

use crate::error::LedgerResult;

/// Computes cost of goods sold, revenue and margins over a date range.
#[derive(Debug, Clone)]
pub struct CogsCalculator {
    db: Database,
}

impl CogsCalculator {
    /// Creates a calculator over the given database handle.
    pub fn new(db: Database) -> Self {
        CogsCalculator { db }
    }

    /// Builds the COGS report for sales whose document date falls in
    /// `[start, end]` (both inclusive).
    ///
    /// Products never purchased are costed at their current MRP per unit,
    /// the same no-history fallback the valuation engine uses. Absent
    /// history never blocks a report.
    ///
    /// A window with no sales yields an empty summary, not an error:
    /// `EmptyDataset` is reserved for the catalog-population reports
    /// (valuation, aging), where an empty in-stock set means there is
    /// nothing to report on at all.
    ///
    /// ## Errors
    /// - `LedgerError::Validation` when end precedes start
    pub async fn report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<CogsSummary> {
        validate_date_range(Some(start), Some(end))?;

        let sold = self.db.sales().sold_by_product(start, end).await?;

        debug!(products = sold.len(), "Building COGS report");

        // Lifetime purchase totals, one grouped scan for the whole catalog.
        let averages: HashMap<String, f64> = self
            .db
            .purchases()
            .lifetime_totals_all()
            .await?
            .into_iter()
            .filter(|t| t.total_quantity > 0)
            .map(|t| {
                (
                    t.product_id,
                    t.total_cost_paisa as f64 / t.total_quantity as f64,
                )
            })
            .collect();

        let rows = sold
            .into_iter()
            .map(|s| {
                // No purchase history: fall back to the list price, as
                // valuation does for never-purchased stock.
                let average_cost = averages
                    .get(&s.product_id)
                    .copied()
                    .unwrap_or(s.mrp_paisa as f64);
                build_row(
                    s.product_id,
                    s.name,
                    s.category,
                    s.quantity_sold,
                    average_cost,
                    Money::from_paisa(s.revenue_paisa),
                )
            })
            .collect();

        Ok(summarize(start, end, rows))
    }
}
