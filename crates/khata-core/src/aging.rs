//! # Stock Aging
//!
//! Buckets remaining stock by age since the oldest purchase on record.
//!
//! ## Bands
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────┐
//! │  0-30 days   │ fresh stock                                          │
//! │  31-60 days  │                                                      │
//! │  61-90 days  │                                                      │
//! │  91-180 days │ slow-moving                                          │
//! │ 181-365 days │                                                      │
//! │   365+ days  │ dead stock candidates                                │
//! └──────────────┴──────────────────────────────────────────────────────┘
//! ```
//! Lower bounds are inclusive: a product whose oldest purchase is exactly
//! 30 days old is "0-30 days"; at 31 days it moves to "31-60 days".
//!
//! ## Known Approximation
//! Age is measured from the oldest purchase line on record, without modeling
//! which lots sales actually consumed. A product that has turned over its
//! oldest lot can still read as old. Report consumers should caveat the
//! signal accordingly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::types::Product;
use crate::valuation::{weighted_average_rate, PurchaseLot};

// =============================================================================
// Buckets
// =============================================================================

/// Fixed day-range classification of how long unsold stock has been held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    Days0To30,
    Days31To60,
    Days61To90,
    Days91To180,
    Days181To365,
    Over365,
}

impl AgingBucket {
    /// All bands in ascending age order, for stable report shape.
    pub const ALL: [AgingBucket; 6] = [
        AgingBucket::Days0To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Days91To180,
        AgingBucket::Days181To365,
        AgingBucket::Over365,
    ];

    /// First matching band, lower bound inclusive.
    pub fn for_age_days(age_days: i64) -> Self {
        match age_days {
            i64::MIN..=30 => AgingBucket::Days0To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            91..=180 => AgingBucket::Days91To180,
            181..=365 => AgingBucket::Days181To365,
            _ => AgingBucket::Over365,
        }
    }

    /// Human-readable band label.
    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::Days0To30 => "0-30 days",
            AgingBucket::Days31To60 => "31-60 days",
            AgingBucket::Days61To90 => "61-90 days",
            AgingBucket::Days91To180 => "91-180 days",
            AgingBucket::Days181To365 => "181-365 days",
            AgingBucket::Over365 => "365+ days",
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Per-product aging result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity_on_hand: i64,
    /// Days since the oldest purchase on record; 0 when no history.
    pub age_days: i64,
    pub bucket: AgingBucket,
    /// Lifetime weighted-average cost per unit, paisa (MRP when no history).
    pub unit_cost_paisa: f64,
    /// quantity_on_hand x unit cost, rounded to whole paisa.
    pub stock_value: Money,
}

/// Catalog-level aggregation for one band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingBucketSummary {
    pub bucket: AgingBucket,
    pub product_count: usize,
    pub total_quantity: i64,
    pub total_value: Money,
    /// Share of total inventory value held in this band, 0-100.
    pub pct_of_inventory_value: f64,
}

// =============================================================================
// Classification
// =============================================================================

/// Days between `now` and the oldest purchase date; 0 when no history.
///
/// A purchase dated in the future (clock skew on the entry device) clamps
/// to 0 rather than going negative.
pub fn age_days(now: DateTime<Utc>, oldest_purchase: Option<DateTime<Utc>>) -> i64 {
    match oldest_purchase {
        Some(oldest) => (now - oldest).num_days().max(0),
        None => 0,
    }
}

/// Classifies one product: age, band, weighted-average cost and stock value.
pub fn classify_product(
    product: &Product,
    oldest_purchase: Option<DateTime<Utc>>,
    lots: &[PurchaseLot],
    now: DateTime<Utc>,
) -> AgingRow {
    let age = age_days(now, oldest_purchase);
    let unit_cost = weighted_average_rate(lots).unwrap_or(product.mrp_paisa as f64);
    let stock_value = Money::from_paisa_rounded(unit_cost * product.quantity_on_hand as f64);

    AgingRow {
        product_id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        quantity_on_hand: product.quantity_on_hand,
        age_days: age,
        bucket: AgingBucket::for_age_days(age),
        unit_cost_paisa: unit_cost,
        stock_value,
    }
}

/// Aggregates per-product rows into the six bands (every band present, empty
/// bands zeroed, ascending age order).
pub fn summarize(rows: &[AgingRow]) -> Vec<AgingBucketSummary> {
    let total_value: i64 = rows.iter().map(|r| r.stock_value.paisa()).sum();

    AgingBucket::ALL
        .iter()
        .map(|&bucket| {
            let in_band: Vec<&AgingRow> = rows.iter().filter(|r| r.bucket == bucket).collect();
            let band_value: i64 = in_band.iter().map(|r| r.stock_value.paisa()).sum();
            let pct = if total_value > 0 {
                band_value as f64 / total_value as f64 * 100.0
            } else {
                0.0
            };
            AgingBucketSummary {
                bucket,
                product_count: in_band.len(),
                total_quantity: in_band.iter().map(|r| r.quantity_on_hand).sum(),
                total_value: Money::from_paisa(band_value),
                pct_of_inventory_value: pct,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(id: &str, qoh: i64) -> Product {
        Product {
            id: id.to_string(),
            barcode: None,
            name: format!("Product {id}"),
            category: "Grocery".to_string(),
            mrp_paisa: 1000,
            sale_price_paisa: 950,
            quantity_on_hand: qoh,
            reorder_point: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_band_boundaries_lower_inclusive() {
        assert_eq!(AgingBucket::for_age_days(0), AgingBucket::Days0To30);
        assert_eq!(AgingBucket::for_age_days(30), AgingBucket::Days0To30);
        assert_eq!(AgingBucket::for_age_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_age_days(60), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_age_days(61), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_age_days(91), AgingBucket::Days91To180);
        assert_eq!(AgingBucket::for_age_days(181), AgingBucket::Days181To365);
        assert_eq!(AgingBucket::for_age_days(365), AgingBucket::Days181To365);
        assert_eq!(AgingBucket::for_age_days(366), AgingBucket::Over365);
        assert_eq!(AgingBucket::for_age_days(4000), AgingBucket::Over365);
    }

    #[test]
    fn test_age_days() {
        let now = Utc::now();
        assert_eq!(age_days(now, None), 0);
        assert_eq!(age_days(now, Some(now - Duration::days(30))), 30);
        assert_eq!(age_days(now, Some(now - Duration::days(31))), 31);
        // Future-dated purchase clamps to zero.
        assert_eq!(age_days(now, Some(now + Duration::days(2))), 0);
    }

    #[test]
    fn test_classify_product_without_history_uses_mrp() {
        let now = Utc::now();
        let row = classify_product(&product("p1", 4), None, &[], now);
        assert_eq!(row.age_days, 0);
        assert_eq!(row.bucket, AgingBucket::Days0To30);
        assert!((row.unit_cost_paisa - 1000.0).abs() < 1e-9);
        assert_eq!(row.stock_value.paisa(), 4000);
    }

    #[test]
    fn test_summarize_buckets_and_percentages() {
        let now = Utc::now();
        let lots_a = vec![PurchaseLot {
            doc_date: now - Duration::days(10),
            quantity: 10,
            rate_paisa: 300,
        }];
        let lots_b = vec![PurchaseLot {
            doc_date: now - Duration::days(100),
            quantity: 5,
            rate_paisa: 200,
        }];

        let rows = vec![
            classify_product(&product("a", 10), Some(now - Duration::days(10)), &lots_a, now),
            classify_product(&product("b", 5), Some(now - Duration::days(100)), &lots_b, now),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.len(), 6);
        let fresh = &summary[0];
        assert_eq!(fresh.bucket, AgingBucket::Days0To30);
        assert_eq!(fresh.product_count, 1);
        assert_eq!(fresh.total_quantity, 10);
        assert_eq!(fresh.total_value.paisa(), 3000);
        // 3000 of 4000 total
        assert!((fresh.pct_of_inventory_value - 75.0).abs() < 1e-9);

        let slow = &summary[3];
        assert_eq!(slow.bucket, AgingBucket::Days91To180);
        assert_eq!(slow.product_count, 1);
        assert_eq!(slow.total_value.paisa(), 1000);

        // Empty bands are present and zeroed.
        assert_eq!(summary[5].product_count, 0);
        assert_eq!(summary[5].total_value.paisa(), 0);
        assert_eq!(summary[5].pct_of_inventory_value, 0.0);
    }
}
