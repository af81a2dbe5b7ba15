//! # Repository Implementations
//!
//! Repositories encapsulate SQL queries for each aggregate.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Service code never writes SQL - it calls repository methods.       │
//! │                                                                     │
//! │  Two call shapes per repository:                                    │
//! │                                                                     │
//! │  • Pool methods:   repo.get_by_id(id).await                         │
//! │    Run on any pool connection. Used by read-side reports.           │
//! │                                                                     │
//! │  • Tx functions:   Repo::insert_tx(&mut *tx, ...).await             │
//! │    Take &mut SqliteConnection so several writes compose into one    │
//! │    atomic transaction owned by the caller (the recorder).           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod product;
pub mod purchase;
pub mod sale;

/// Generates a new UUID v4 string for entity IDs.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// One transaction line joined with its document header.
///
/// Shared row shape for the product-history queries on both the purchase
/// and sale sides; the ledger reconstructor merges the two streams.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentLine {
    /// Header document ID (purchase or sale).
    pub doc_id: String,
    /// Business date from the header.
    pub doc_date: DateTime<Utc>,
    /// Supplier name (purchases) or customer name (sales).
    pub counterpart: String,
    /// Units on this line, always positive as stored.
    pub quantity: i64,
    /// Per-unit rate in paisa, snapshotted at transaction time.
    pub rate_paisa: i64,
    /// Line total in paisa (taxable + tax).
    pub total_paisa: i64,
}

/// Per-product sale totals over a date range, for cost-of-goods reporting.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SoldTotals {
    pub product_id: String,
    pub name: String,
    pub category: String,
    /// Current MRP: the cost fallback when the product was never purchased.
    pub mrp_paisa: i64,
    pub quantity_sold: i64,
    pub revenue_paisa: i64,
}

/// Lifetime purchase totals for one product (all history, no date filter).
///
/// Feeds the weighted-average cost used by aging and cost-of-goods.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseTotals {
    pub product_id: String,
    pub total_quantity: i64,
    pub total_cost_paisa: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::product::ProductRepository;
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use khata_core::Product;

    fn sample_product(barcode: &str, mrp_paisa: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_id(),
            barcode: Some(barcode.to_string()),
            name: "Test Biscuit".to_string(),
            category: "Snacks".to_string(),
            mrp_paisa,
            sale_price_paisa: mrp_paisa - 100,
            quantity_on_hand: 10,
            reorder_point: 2,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("8964000111111", 5_000);

        db.products().insert(&product).await.unwrap();

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Test Biscuit");
        assert_eq!(found.mrp_paisa, 5_000);
        assert_eq!(found.quantity_on_hand, 10);
    }

    #[tokio::test]
    async fn test_adjust_stock_returns_new_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("8964000222222", 5_000);
        db.products().insert(&product).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let balance = ProductRepository::adjust_stock_tx(&mut *tx, &product.id, -12)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        // 10 on hand, sold 12: recorded as -2, not rejected
        assert_eq!(balance, -2);

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.quantity_on_hand, -2);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("8964000333333", 5_000);

        {
            let mut tx = db.pool().begin().await.unwrap();
            ProductRepository::insert_tx(&mut *tx, &product).await.unwrap();
            // Dropped without commit
        }

        let found = db.products().get_by_id(&product.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_exact_requires_matching_mrp() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("8964000444444", 5_000);
        db.products().insert(&product).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();

        let exact = ProductRepository::find_exact_tx(&mut *conn, "8964000444444", 5_000)
            .await
            .unwrap();
        assert!(exact.is_some());

        let miss = ProductRepository::find_exact_tx(&mut *conn, "8964000444444", 5_100)
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
