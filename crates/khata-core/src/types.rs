//! # Domain Types
//!
//! Core domain types for the Khata inventory ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │    Purchase    │   │      Sale      │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  id (UUID)     │      │
//! │  │  barcode + MRP │   │  supplier      │   │  customer      │      │
//! │  │  (SKU key)     │   │  doc_date      │   │  doc_date      │      │
//! │  │  qty_on_hand   │   │  totals        │   │  totals        │      │
//! │  └────────────────┘   └───────┬────────┘   └───────┬────────┘      │
//! │                               │                    │               │
//! │                       ┌───────▼────────┐   ┌───────▼────────┐      │
//! │                       │  PurchaseLine  │   │    SaleLine    │      │
//! │                       │  (immutable,   │   │  (immutable,   │      │
//! │                       │   snapshots)   │   │   snapshots)   │      │
//! │                       └────────────────┘   └────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key: a product is identified by (barcode, MRP) within the
//!   resolution tolerance; documents by their date + counterpart
//!
//! ## Snapshot Pattern
//! Lines copy barcode/name/rate at transaction time. The snapshots preserve
//! historical cost fidelity even if the product record later changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Transaction Kind
// =============================================================================

/// The two stock-affecting document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Stock in: increments quantity on hand.
    Purchase,
    /// Stock out: decrements quantity on hand (may go negative).
    Sale,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Purchase => write!(f, "PURCHASE"),
            TxKind::Sale => write!(f, "SALE"),
        }
    }
}

// =============================================================================
// Valuation Method
// =============================================================================

/// Inventory costing convention used by the valuation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    /// First In, First Out. Oldest purchase lots cover the held quantity.
    Fifo,
    /// Last In, First Out. Newest purchase lots cover the held quantity.
    Lifo,
    /// Lifetime average: total purchased value over total purchased quantity.
    /// Not recomputed per sale.
    #[default]
    WeightedAverage,
}

impl FromStr for ValuationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LIFO" => Ok(Self::Lifo),
            "WEIGHTED_AVERAGE" | "WEIGHTED-AVERAGE" | "AVERAGE" => Ok(Self::WeightedAverage),
            _ => Err(format!("unknown valuation method: {s}")),
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "FIFO"),
            Self::Lifo => write!(f, "LIFO"),
            Self::WeightedAverage => write!(f, "WEIGHTED_AVERAGE"),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stock-keeping identity, keyed by (barcode, MRP) within tolerance.
///
/// Mutated by every purchase/sale line that resolves to it; never hard
/// deleted (soft delete via `is_active`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.). Absent for loose/unlabelled goods.
    pub barcode: Option<String>,

    /// Display name.
    pub name: String,

    /// Reporting category (e.g. "Beverages").
    pub category: String,

    /// Maximum retail price in paisa - the pricing key alongside barcode.
    pub mrp_paisa: i64,

    /// Actual selling rate in paisa.
    pub sale_price_paisa: i64,

    /// Current stock level. May legitimately be negative (tolerated oversell).
    pub quantity_on_hand: i64,

    /// Stock level at or below which the product shows on the low-stock report.
    pub reorder_point: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the MRP as a Money type.
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paisa(self.mrp_paisa)
    }

    /// Returns the selling rate as a Money type.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_paisa(self.sale_price_paisa)
    }

    /// True when stock has fallen to or below the reorder point.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.reorder_point
    }
}

// =============================================================================
// Purchase (header + line)
// =============================================================================

/// A committed supplier purchase document.
///
/// Totals are aggregated from the lines at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub supplier_name: String,
    /// Document date: the business date the ledger and reports key on.
    pub doc_date: DateTime<Utc>,
    pub total_quantity: i64,
    pub taxable_paisa: i64,
    pub tax_paisa: i64,
    pub total_paisa: i64,
    pub created_at: DateTime<Utc>,
}

/// A line of a committed purchase. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    /// Barcode at transaction time (frozen).
    pub barcode_snapshot: Option<String>,
    /// Product name at transaction time (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Per-unit purchase rate in paisa at transaction time (frozen).
    pub rate_paisa: i64,
    pub taxable_paisa: i64,
    pub tax_paisa: i64,
    pub total_paisa: i64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseLine {
    /// Returns the per-unit rate as Money.
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_paisa(self.rate_paisa)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paisa(self.total_paisa)
    }
}

// =============================================================================
// Sale (header + line)
// =============================================================================

/// A committed customer sale document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub customer_name: String,
    pub doc_date: DateTime<Utc>,
    pub total_quantity: i64,
    pub taxable_paisa: i64,
    pub tax_paisa: i64,
    pub total_paisa: i64,
    pub created_at: DateTime<Utc>,
}

/// A line of a committed sale. Immutable once written.
///
/// `product_id` is nullable: imported or legacy rows may carry lines that
/// never resolved to a product. Lines committed through the recorder always
/// resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    pub barcode_snapshot: Option<String>,
    pub name_snapshot: String,
    pub quantity: i64,
    /// Per-unit selling rate in paisa at transaction time (frozen).
    pub rate_paisa: i64,
    pub taxable_paisa: i64,
    pub tax_paisa: i64,
    pub total_paisa: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the per-unit rate as Money.
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_paisa(self.rate_paisa)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paisa(self.total_paisa)
    }
}

// =============================================================================
// Drafts (commit inputs)
// =============================================================================

/// One entered line, before commit.
///
/// Carries everything product resolution needs (barcode + MRP + descriptive
/// fields) and the transaction amounts. The taxable amount is derived as
/// `rate x quantity`; the line total as taxable + tax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDraft {
    /// Scanned or typed barcode. Empty/absent forces a new product.
    pub barcode: Option<String>,
    pub name: String,
    pub category: String,
    /// List price in paisa - the resolution key alongside barcode.
    pub mrp_paisa: i64,
    pub quantity: i64,
    /// Per-unit transaction rate in paisa.
    pub rate_paisa: i64,
    pub tax_paisa: i64,
}

impl LineDraft {
    /// Taxable amount: rate x quantity.
    #[inline]
    pub fn taxable_paisa(&self) -> i64 {
        self.rate_paisa * self.quantity
    }

    /// Line total: taxable + tax.
    #[inline]
    pub fn total_paisa(&self) -> i64 {
        self.taxable_paisa() + self.tax_paisa
    }
}

/// An entered purchase document, before commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub supplier_name: String,
    pub doc_date: DateTime<Utc>,
    pub lines: Vec<LineDraft>,
}

/// An entered sale document, before commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_name: String,
    pub doc_date: DateTime<Utc>,
    pub lines: Vec<LineDraft>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valuation_method_round_trip() {
        for m in [
            ValuationMethod::Fifo,
            ValuationMethod::Lifo,
            ValuationMethod::WeightedAverage,
        ] {
            assert_eq!(m.to_string().parse::<ValuationMethod>().unwrap(), m);
        }
        assert!("hifo".parse::<ValuationMethod>().is_err());
    }

    #[test]
    fn test_valuation_method_default() {
        assert_eq!(ValuationMethod::default(), ValuationMethod::WeightedAverage);
    }

    #[test]
    fn test_line_draft_totals() {
        let line = LineDraft {
            barcode: Some("8901234567890".to_string()),
            name: "Tea 250g".to_string(),
            category: "Grocery".to_string(),
            mrp_paisa: 25000,
            quantity: 3,
            rate_paisa: 20000,
            tax_paisa: 900,
        };
        assert_eq!(line.taxable_paisa(), 60000);
        assert_eq!(line.total_paisa(), 60900);
    }

    #[test]
    fn test_low_stock() {
        let mut product = Product {
            id: "p1".to_string(),
            barcode: None,
            name: "Sugar 1kg".to_string(),
            category: "Grocery".to_string(),
            mrp_paisa: 9000,
            sale_price_paisa: 8800,
            quantity_on_hand: 3,
            reorder_point: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
        product.quantity_on_hand = 6;
        assert!(!product.is_low_stock());
    }
}
