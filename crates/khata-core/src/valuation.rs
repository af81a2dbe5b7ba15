//! # Valuation Math
//!
//! Pure FIFO / LIFO / weighted-average costing over a product's purchase
//! history.
//!
//! ## How Coverage Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Product: Tea 250g, quantity_on_hand = 12                           │
//! │  Purchase history (ascending by date):                              │
//! │      lot A: 10 units @ Rs 5.00                                      │
//! │      lot B:  5 units @ Rs 8.00                                      │
//! │                                                                     │
//! │  FIFO  ── consume oldest-first until 12 covered:                    │
//! │      10 x 500 + 2 x 800 = 6600   rate = 6600 / 12 = 550.0           │
//! │                                                                     │
//! │  LIFO  ── consume newest-first until 12 covered:                    │
//! │       5 x 800 + 7 x 500 = 7500   rate = 7500 / 12 = 625.0           │
//! │                                                                     │
//! │  WEIGHTED_AVERAGE ── lifetime totals, every lot, full quantity:     │
//! │      (10 x 500 + 5 x 800) / 15 = 600.0                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Limitation
//! If quantity on hand exceeds total historically purchased quantity (manual
//! stock increases happen outside this core), FIFO/LIFO coverage is partial
//! and the computed rate understates true value. That is reported as-is, not
//! silently corrected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Product, ValuationMethod};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// One purchase line viewed as a costing lot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLot {
    pub doc_date: DateTime<Utc>,
    pub quantity: i64,
    pub rate_paisa: i64,
}

/// Per-product valuation result, consumed by report/export collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity_on_hand: i64,
    pub method: ValuationMethod,
    /// Per-unit cost in paisa. Fractional: an average over covering lots.
    pub valuation_rate_paisa: f64,
    /// quantity_on_hand x valuation rate, rounded to whole paisa.
    pub inventory_value: Money,
    /// (MRP - valuation rate) x quantity_on_hand.
    pub potential_profit: Money,
}

// =============================================================================
// Lot Math
// =============================================================================

/// Cost, in paisa, of covering `quantity_on_hand` units from the given lots
/// oldest-first. Lots must be ascending by date.
///
/// If the lots run out before coverage completes, the cost of everything
/// purchased is returned (partial coverage).
pub fn fifo_covered_cost(quantity_on_hand: i64, lots: &[PurchaseLot]) -> i64 {
    covered_cost(quantity_on_hand, lots.iter())
}

/// Cost, in paisa, of covering `quantity_on_hand` units newest-first.
/// Lots must be ascending by date.
pub fn lifo_covered_cost(quantity_on_hand: i64, lots: &[PurchaseLot]) -> i64 {
    covered_cost(quantity_on_hand, lots.iter().rev())
}

fn covered_cost<'a>(
    quantity_on_hand: i64,
    lots: impl Iterator<Item = &'a PurchaseLot>,
) -> i64 {
    let mut remaining = quantity_on_hand.max(0);
    let mut cost = 0i64;

    for lot in lots {
        if remaining == 0 {
            break;
        }
        let consumed = lot.quantity.min(remaining);
        cost += consumed * lot.rate_paisa;
        remaining -= consumed;
    }

    cost
}

/// Lifetime weighted-average rate in paisa per unit: total purchased value
/// over total purchased quantity, across **all** history. `None` when there
/// is no purchase history (or only zero-quantity lots).
pub fn weighted_average_rate(lots: &[PurchaseLot]) -> Option<f64> {
    let total_qty: i64 = lots.iter().map(|l| l.quantity).sum();
    if total_qty <= 0 {
        return None;
    }
    let total_cost: i64 = lots.iter().map(|l| l.quantity * l.rate_paisa).sum();
    Some(total_cost as f64 / total_qty as f64)
}

/// Per-unit valuation rate for a product under the given method, with the
/// documented MRP fallback when no purchase history exists.
pub fn unit_rate(
    method: ValuationMethod,
    quantity_on_hand: i64,
    lots: &[PurchaseLot],
    mrp: Money,
) -> f64 {
    if lots.is_empty() {
        // No history to cost against: value at list price.
        return mrp.paisa() as f64;
    }

    match method {
        ValuationMethod::Fifo => {
            if quantity_on_hand <= 0 {
                return 0.0;
            }
            fifo_covered_cost(quantity_on_hand, lots) as f64 / quantity_on_hand as f64
        }
        ValuationMethod::Lifo => {
            if quantity_on_hand <= 0 {
                return 0.0;
            }
            lifo_covered_cost(quantity_on_hand, lots) as f64 / quantity_on_hand as f64
        }
        ValuationMethod::WeightedAverage => {
            weighted_average_rate(lots).unwrap_or(mrp.paisa() as f64)
        }
    }
}

/// Values one product: rate, inventory value, and potential profit.
///
/// `lots` must be the product's full purchase-line history ascending by
/// purchase date.
pub fn value_product(product: &Product, lots: &[PurchaseLot], method: ValuationMethod) -> ValuationRow {
    let qoh = product.quantity_on_hand;
    let rate = unit_rate(method, qoh, lots, product.mrp());

    let inventory_value = Money::from_paisa_rounded(rate * qoh as f64);
    let potential_profit = product.mrp() * qoh - inventory_value;

    ValuationRow {
        product_id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        quantity_on_hand: qoh,
        method,
        valuation_rate_paisa: rate,
        inventory_value,
        potential_profit,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lot(days_ago: i64, quantity: i64, rate_paisa: i64) -> PurchaseLot {
        PurchaseLot {
            doc_date: Utc::now() - Duration::days(days_ago),
            quantity,
            rate_paisa,
        }
    }

    fn product(qoh: i64, mrp_paisa: i64) -> Product {
        Product {
            id: "p1".to_string(),
            barcode: Some("8901234567890".to_string()),
            name: "Tea 250g".to_string(),
            category: "Beverages".to_string(),
            mrp_paisa,
            sale_price_paisa: mrp_paisa,
            quantity_on_hand: qoh,
            reorder_point: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // Lots (10 @ 5.00) then (5 @ 8.00) at quantity_on_hand = 12.
    fn two_lots() -> Vec<PurchaseLot> {
        vec![lot(10, 10, 500), lot(2, 5, 800)]
    }

    #[test]
    fn test_fifo_consumes_oldest_first() {
        // 10 x 500 + 2 x 800 = 6600
        assert_eq!(fifo_covered_cost(12, &two_lots()), 6600);
        let rate = unit_rate(ValuationMethod::Fifo, 12, &two_lots(), Money::from_paisa(1000));
        assert!((rate - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_lifo_consumes_newest_first() {
        // 5 x 800 + 7 x 500 = 7500
        assert_eq!(lifo_covered_cost(12, &two_lots()), 7500);
        let rate = unit_rate(ValuationMethod::Lifo, 12, &two_lots(), Money::from_paisa(1000));
        assert!((rate - 625.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_average_uses_full_history() {
        // (10 x 500 + 5 x 800) / 15 = 600, regardless of quantity on hand
        let rate = weighted_average_rate(&two_lots()).unwrap();
        assert!((rate - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_mrp_fallback_without_history() {
        for method in [
            ValuationMethod::Fifo,
            ValuationMethod::Lifo,
            ValuationMethod::WeightedAverage,
        ] {
            let rate = unit_rate(method, 4, &[], Money::from_paisa(1250));
            assert!((rate - 1250.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_partial_coverage_understates() {
        // Held 20 but only ever purchased 15: coverage stops at purchased cost.
        let cost = fifo_covered_cost(20, &two_lots());
        assert_eq!(cost, 10 * 500 + 5 * 800);
        let rate = unit_rate(ValuationMethod::Fifo, 20, &two_lots(), Money::from_paisa(1000));
        assert!((rate - 9000.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_product_row() {
        let row = value_product(&product(12, 1000), &two_lots(), ValuationMethod::Fifo);
        assert_eq!(row.inventory_value.paisa(), 6600);
        // 12 x 1000 - 6600
        assert_eq!(row.potential_profit.paisa(), 5400);
        assert_eq!(row.quantity_on_hand, 12);
    }

    #[test]
    fn test_value_product_weighted_average_rounds() {
        // avg = (3 x 333) / 3 = 333.0; value = 7 x 333 = 2331
        let lots = vec![lot(5, 3, 333)];
        let row = value_product(&product(7, 500), &lots, ValuationMethod::WeightedAverage);
        assert_eq!(row.inventory_value.paisa(), 2331);
    }
}
