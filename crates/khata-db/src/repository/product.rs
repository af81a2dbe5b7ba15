//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Barcode lookups for transaction-time resolution
//! - Stock adjustment via deltas inside the recorder's transaction
//! - Soft delete (historical lines still reference the product)
//!
//! ## Delta Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: Absolute update (read-modify-write race)                 │
//! │     UPDATE products SET quantity_on_hand = 7 WHERE id = ?           │
//! │                                                                     │
//! │  ✅ CORRECT: Delta update                                           │
//! │     UPDATE products                                                 │
//! │     SET quantity_on_hand = quantity_on_hand + ?                     │
//! │     RETURNING quantity_on_hand                                      │
//! │                                                                     │
//! │  The RETURNING clause hands the post-update balance back so the     │
//! │  recorder can warn when a sale drives stock negative.               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::Product;

const PRODUCT_COLUMNS: &str = "id, barcode, name, category, mrp_paisa, sale_price_paisa, \
     quantity_on_hand, reorder_point, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let matches = repo.find_by_barcode("8964000123456").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Finds all active products carrying the given barcode.
    ///
    /// Several catalog rows may share one barcode when the same pack is
    /// listed at different MRPs; resolution picks among them by price.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE barcode = ?1 AND is_active = 1 \
             ORDER BY created_at"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists all active products, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 \
             ORDER BY name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products with positive stock on hand.
    ///
    /// This is the population the valuation and aging reports run over.
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND quantity_on_hand > 0 \
             ORDER BY name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products at or below their reorder point.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND quantity_on_hand <= reorder_point \
             ORDER BY quantity_on_hand, name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Duplicate ID
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(name = %product.name, "Inserting product");

        Self::insert_with(&self.pool, product).await
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical purchase/sale lines still reference this product
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Restores a soft-deleted product.
    pub async fn reactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Reactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 1, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transactional variants
    //
    // Associated functions taking &mut SqliteConnection so the recorder can
    // compose resolution, stock adjustment and line inserts into one atomic
    // transaction that it owns.
    // =========================================================================

    /// Finds active products by barcode on an open transaction.
    pub async fn find_by_barcode_tx(
        conn: &mut SqliteConnection,
        barcode: &str,
    ) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE barcode = ?1 AND is_active = 1 \
             ORDER BY created_at"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_all(conn)
            .await?;

        Ok(products)
    }

    /// Finds the active product with exactly this barcode + MRP pair.
    pub async fn find_exact_tx(
        conn: &mut SqliteConnection,
        barcode: &str,
        mrp_paisa: i64,
    ) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE barcode = ?1 AND mrp_paisa = ?2 AND is_active = 1 \
             ORDER BY created_at \
             LIMIT 1"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .bind(mrp_paisa)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Inserts a new product on an open transaction.
    pub async fn insert_tx(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        Self::insert_with(conn, product).await
    }

    /// Adjusts stock by a delta on an open transaction.
    ///
    /// Returns the post-update quantity on hand so the caller can detect
    /// (and log) a negative balance. Oversell is recorded, never blocked.
    pub async fn adjust_stock_tx(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let new_quantity: Option<i64> = sqlx::query_scalar(
            "UPDATE products \
             SET quantity_on_hand = quantity_on_hand + ?2, updated_at = ?3 \
             WHERE id = ?1 \
             RETURNING quantity_on_hand",
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        new_quantity.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Shared insert body for the pool and transaction entry points.
    async fn insert_with<'e, E>(executor: E, product: &Product) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO products (
                id, barcode, name, category, mrp_paisa, sale_price_paisa,
                quantity_on_hand, reorder_point, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.mrp_paisa)
        .bind(product.sale_price_paisa)
        .bind(product.quantity_on_hand)
        .bind(product.reorder_point)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }
}
