//! # Cost of Goods Sold
//!
//! Per-product COGS, revenue and margin math over a reporting period,
//! costed at each product's lifetime weighted-average purchase rate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  quantity_sold = Σ sale-line quantities in the period               │
//! │  COGS          = quantity_sold x lifetime average purchase rate     │
//! │  revenue       = Σ sale-line totals in the period                   │
//! │  gross profit  = revenue - COGS                                     │
//! │  margin %      = gross profit / revenue x 100   (0 when revenue=0)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;

// =============================================================================
// Rows
// =============================================================================

/// Per-product COGS result for the period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity_sold: i64,
    /// Lifetime weighted-average purchase rate, paisa per unit.
    pub average_cost_paisa: f64,
    pub cogs: Money,
    pub revenue: Money,
    pub gross_profit: Money,
    /// 0-100; 0 when revenue is zero.
    pub margin_pct: f64,
}

/// Per-category rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCogs {
    pub category: String,
    pub quantity_sold: i64,
    pub cogs: Money,
    pub revenue: Money,
    pub gross_profit: Money,
    pub margin_pct: f64,
}

/// Full period report: rows, category subtotals, overall totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub rows: Vec<CogsRow>,
    pub by_category: Vec<CategoryCogs>,
    pub total_quantity_sold: i64,
    pub total_cogs: Money,
    pub total_revenue: Money,
    pub total_gross_profit: Money,
    pub overall_margin_pct: f64,
}

// =============================================================================
// Math
// =============================================================================

/// Gross margin percentage; zero when there is no revenue (free issues,
/// samples) rather than a division error.
pub fn margin_pct(gross_profit: Money, revenue: Money) -> f64 {
    if revenue.is_zero() {
        return 0.0;
    }
    gross_profit.paisa() as f64 / revenue.paisa() as f64 * 100.0
}

/// Builds one product's row from its period sales and lifetime average cost.
pub fn build_row(
    product_id: String,
    name: String,
    category: String,
    quantity_sold: i64,
    average_cost_paisa: f64,
    revenue: Money,
) -> CogsRow {
    let cogs = Money::from_paisa_rounded(average_cost_paisa * quantity_sold as f64);
    let gross_profit = revenue - cogs;

    CogsRow {
        product_id,
        name,
        category,
        quantity_sold,
        average_cost_paisa,
        cogs,
        revenue,
        gross_profit,
        margin_pct: margin_pct(gross_profit, revenue),
    }
}

/// Rolls per-product rows up into category subtotals and overall totals.
pub fn summarize(start: DateTime<Utc>, end: DateTime<Utc>, rows: Vec<CogsRow>) -> CogsSummary {
    // BTreeMap: categories come out alphabetically, stable report shape.
    let mut categories: BTreeMap<String, CategoryCogs> = BTreeMap::new();

    for row in &rows {
        let entry = categories
            .entry(row.category.clone())
            .or_insert_with(|| CategoryCogs {
                category: row.category.clone(),
                quantity_sold: 0,
                cogs: Money::zero(),
                revenue: Money::zero(),
                gross_profit: Money::zero(),
                margin_pct: 0.0,
            });
        entry.quantity_sold += row.quantity_sold;
        entry.cogs += row.cogs;
        entry.revenue += row.revenue;
        entry.gross_profit += row.gross_profit;
    }

    let mut by_category: Vec<CategoryCogs> = categories.into_values().collect();
    for cat in &mut by_category {
        cat.margin_pct = margin_pct(cat.gross_profit, cat.revenue);
    }

    let total_quantity_sold = rows.iter().map(|r| r.quantity_sold).sum();
    let total_cogs: Money = rows.iter().map(|r| r.cogs).sum();
    let total_revenue: Money = rows.iter().map(|r| r.revenue).sum();
    let total_gross_profit = total_revenue - total_cogs;

    CogsSummary {
        start,
        end,
        overall_margin_pct: margin_pct(total_gross_profit, total_revenue),
        rows,
        by_category,
        total_quantity_sold,
        total_cogs,
        total_revenue,
        total_gross_profit,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_math() {
        // 3 sold at average cost Rs 4.00, revenue Rs 18.00
        let row = build_row(
            "p1".to_string(),
            "Tea 250g".to_string(),
            "Beverages".to_string(),
            3,
            400.0,
            Money::from_paisa(1800),
        );
        assert_eq!(row.cogs.paisa(), 1200);
        assert_eq!(row.gross_profit.paisa(), 600);
        assert!((row.margin_pct - 33.333333333333336).abs() < 1e-6);
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let row = build_row(
            "p1".to_string(),
            "Sample".to_string(),
            "Promo".to_string(),
            2,
            150.0,
            Money::zero(),
        );
        assert_eq!(row.margin_pct, 0.0);
        assert_eq!(row.gross_profit.paisa(), -300);
    }

    #[test]
    fn test_summarize_rolls_up_categories() {
        let start = Utc::now();
        let end = start;
        let rows = vec![
            build_row(
                "p1".to_string(),
                "Tea".to_string(),
                "Beverages".to_string(),
                3,
                400.0,
                Money::from_paisa(1800),
            ),
            build_row(
                "p2".to_string(),
                "Coffee".to_string(),
                "Beverages".to_string(),
                1,
                900.0,
                Money::from_paisa(1200),
            ),
            build_row(
                "p3".to_string(),
                "Soap".to_string(),
                "Toiletries".to_string(),
                5,
                200.0,
                Money::from_paisa(1500),
            ),
        ];

        let summary = summarize(start, end, rows);

        assert_eq!(summary.total_quantity_sold, 9);
        assert_eq!(summary.total_cogs.paisa(), 1200 + 900 + 1000);
        assert_eq!(summary.total_revenue.paisa(), 4500);
        assert_eq!(summary.total_gross_profit.paisa(), 4500 - 3100);

        assert_eq!(summary.by_category.len(), 2);
        // Alphabetical: Beverages, Toiletries.
        let bev = &summary.by_category[0];
        assert_eq!(bev.category, "Beverages");
        assert_eq!(bev.quantity_sold, 4);
        assert_eq!(bev.cogs.paisa(), 2100);
        assert_eq!(bev.revenue.paisa(), 3000);

        let toi = &summary.by_category[1];
        assert_eq!(toi.category, "Toiletries");
        assert_eq!(toi.gross_profit.paisa(), 500);
    }
}
