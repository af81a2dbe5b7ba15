//! # Purchase Repository
//!
//! Database operations for purchase documents and their lines.
//!
//! ## Read-Side Role
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Purchase lines are the cost history of the inventory.              │
//! │                                                                     │
//! │  lots_for_product()      → ordered cost lots (FIFO/LIFO/WAVG)       │
//! │  oldest_purchase_date()  → stock age for the aging report           │
//! │  lifetime_totals_all()   → weighted-average cost inputs             │
//! │  lines_for_product()     → purchase side of the product ledger      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{DocumentLine, PurchaseTotals};
use khata_core::{Purchase, PurchaseLine, PurchaseLot};

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Gets a purchase header by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT id, supplier_name, doc_date, total_quantity,
                    taxable_paisa, tax_paisa, total_paisa, created_at
             FROM purchases
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lists the lines of one purchase document, in insertion order.
    pub async fn lines_for_document(&self, purchase_id: &str) -> DbResult<Vec<PurchaseLine>> {
        let lines = sqlx::query_as::<_, PurchaseLine>(
            "SELECT id, purchase_id, product_id, barcode_snapshot, name_snapshot,
                    quantity, rate_paisa, taxable_paisa, tax_paisa, total_paisa, created_at
             FROM purchase_lines
             WHERE purchase_id = ?1
             ORDER BY created_at",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Purchase history of one product, joined with header metadata.
    ///
    /// Optional date bounds are applied against the header's business date.
    /// Rows come back oldest first.
    pub async fn lines_for_product(
        &self,
        product_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<DocumentLine>> {
        debug!(product_id = %product_id, "Loading purchase lines for product");

        let mut qb = QueryBuilder::new(
            "SELECT p.id AS doc_id, p.doc_date AS doc_date,
                    p.supplier_name AS counterpart,
                    pl.quantity AS quantity, pl.rate_paisa AS rate_paisa,
                    pl.total_paisa AS total_paisa
             FROM purchase_lines pl
             INNER JOIN purchases p ON p.id = pl.purchase_id
             WHERE pl.product_id = ",
        );
        qb.push_bind(product_id);

        if let Some(start) = start {
            qb.push(" AND p.doc_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = end {
            qb.push(" AND p.doc_date <= ");
            qb.push_bind(end);
        }

        qb.push(" ORDER BY p.doc_date, pl.created_at");

        let lines = qb
            .build_query_as::<DocumentLine>()
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Cost lots for one product, oldest first.
    ///
    /// The stable `(doc_date, created_at)` ordering is what FIFO and LIFO
    /// consume; same-day lots replay in the order they were recorded.
    pub async fn lots_for_product(&self, product_id: &str) -> DbResult<Vec<PurchaseLot>> {
        let lots = sqlx::query_as::<_, PurchaseLot>(
            "SELECT p.doc_date AS doc_date, pl.quantity AS quantity,
                    pl.rate_paisa AS rate_paisa
             FROM purchase_lines pl
             INNER JOIN purchases p ON p.id = pl.purchase_id
             WHERE pl.product_id = ?1
             ORDER BY p.doc_date, pl.created_at",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lots)
    }

    /// Business date of the earliest purchase of this product, if any.
    pub async fn oldest_purchase_date(
        &self,
        product_id: &str,
    ) -> DbResult<Option<DateTime<Utc>>> {
        let oldest: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MIN(p.doc_date)
             FROM purchase_lines pl
             INNER JOIN purchases p ON p.id = pl.purchase_id
             WHERE pl.product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(oldest)
    }

    /// Lifetime purchase totals for every product with purchase history.
    ///
    /// One grouped scan instead of a per-product query; the caller divides
    /// cost by quantity to get each weighted-average rate.
    pub async fn lifetime_totals_all(&self) -> DbResult<Vec<PurchaseTotals>> {
        let totals = sqlx::query_as::<_, PurchaseTotals>(
            "SELECT pl.product_id AS product_id,
                    SUM(pl.quantity) AS total_quantity,
                    SUM(pl.rate_paisa * pl.quantity) AS total_cost_paisa
             FROM purchase_lines pl
             GROUP BY pl.product_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    // =========================================================================
    // Transactional variants
    // =========================================================================

    /// Inserts a purchase header on an open transaction.
    pub async fn insert_header_tx(
        conn: &mut SqliteConnection,
        purchase: &Purchase,
    ) -> DbResult<()> {
        debug!(id = %purchase.id, supplier = %purchase.supplier_name, "Inserting purchase header");

        sqlx::query(
            "INSERT INTO purchases (
                id, supplier_name, doc_date, total_quantity,
                taxable_paisa, tax_paisa, total_paisa, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_name)
        .bind(purchase.doc_date)
        .bind(purchase.total_quantity)
        .bind(purchase.taxable_paisa)
        .bind(purchase.tax_paisa)
        .bind(purchase.total_paisa)
        .bind(purchase.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one purchase line on an open transaction.
    ///
    /// Lines are immutable once written; there is no update counterpart.
    pub async fn insert_line_tx(conn: &mut SqliteConnection, line: &PurchaseLine) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO purchase_lines (
                id, purchase_id, product_id, barcode_snapshot, name_snapshot,
                quantity, rate_paisa, taxable_paisa, tax_paisa, total_paisa, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&line.id)
        .bind(&line.purchase_id)
        .bind(&line.product_id)
        .bind(&line.barcode_snapshot)
        .bind(&line.name_snapshot)
        .bind(line.quantity)
        .bind(line.rate_paisa)
        .bind(line.taxable_paisa)
        .bind(line.tax_paisa)
        .bind(line.total_paisa)
        .bind(line.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
