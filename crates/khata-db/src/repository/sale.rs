//! # Sale Repository
//!
//! Database operations for sale documents and their lines.
//!
//! Mirrors the purchase repository, with one asymmetry: historical sale
//! lines may carry a NULL product_id (imported rows recorded before a
//! catalog entry existed). Product-scoped queries skip those rows.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{DocumentLine, SoldTotals};
use khata_core::{Sale, SaleLine};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, customer_name, doc_date, total_quantity,
                    taxable_paisa, tax_paisa, total_paisa, created_at
             FROM sales
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists the lines of one sale document, in insertion order.
    pub async fn lines_for_document(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT id, sale_id, product_id, barcode_snapshot, name_snapshot,
                    quantity, rate_paisa, taxable_paisa, tax_paisa, total_paisa, created_at
             FROM sale_lines
             WHERE sale_id = ?1
             ORDER BY created_at",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Sale history of one product, joined with header metadata.
    ///
    /// Optional date bounds are applied against the header's business date.
    /// Rows come back oldest first.
    pub async fn lines_for_product(
        &self,
        product_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<DocumentLine>> {
        debug!(product_id = %product_id, "Loading sale lines for product");

        let mut qb = QueryBuilder::new(
            "SELECT s.id AS doc_id, s.doc_date AS doc_date,
                    s.customer_name AS counterpart,
                    sl.quantity AS quantity, sl.rate_paisa AS rate_paisa,
                    sl.total_paisa AS total_paisa
             FROM sale_lines sl
             INNER JOIN sales s ON s.id = sl.sale_id
             WHERE sl.product_id = ",
        );
        qb.push_bind(product_id);

        if let Some(start) = start {
            qb.push(" AND s.doc_date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = end {
            qb.push(" AND s.doc_date <= ");
            qb.push_bind(end);
        }

        qb.push(" ORDER BY s.doc_date, sl.created_at");

        let lines = qb
            .build_query_as::<DocumentLine>()
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Per-product quantity and revenue totals over a date range.
    ///
    /// Feeds the cost-of-goods report. Unresolved lines (NULL product_id)
    /// have no cost basis and are excluded.
    pub async fn sold_by_product(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SoldTotals>> {
        let totals = sqlx::query_as::<_, SoldTotals>(
            "SELECT sl.product_id AS product_id,
                    p.name AS name,
                    p.category AS category,
                    p.mrp_paisa AS mrp_paisa,
                    SUM(sl.quantity) AS quantity_sold,
                    SUM(sl.total_paisa) AS revenue_paisa
             FROM sale_lines sl
             INNER JOIN sales s ON s.id = sl.sale_id
             INNER JOIN products p ON p.id = sl.product_id
             WHERE sl.product_id IS NOT NULL
               AND s.doc_date >= ?1
               AND s.doc_date <= ?2
             GROUP BY sl.product_id
             ORDER BY p.name",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    // =========================================================================
    // Transactional variants
    // =========================================================================

    /// Inserts a sale header on an open transaction.
    pub async fn insert_header_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, customer = %sale.customer_name, "Inserting sale header");

        sqlx::query(
            "INSERT INTO sales (
                id, customer_name, doc_date, total_quantity,
                taxable_paisa, tax_paisa, total_paisa, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&sale.id)
        .bind(&sale.customer_name)
        .bind(sale.doc_date)
        .bind(sale.total_quantity)
        .bind(sale.taxable_paisa)
        .bind(sale.tax_paisa)
        .bind(sale.total_paisa)
        .bind(sale.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one sale line on an open transaction.
    ///
    /// Lines are immutable once written; there is no update counterpart.
    pub async fn insert_line_tx(conn: &mut SqliteConnection, line: &SaleLine) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sale_lines (
                id, sale_id, product_id, barcode_snapshot, name_snapshot,
                quantity, rate_paisa, taxable_paisa, tax_paisa, total_paisa, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&line.id)
        .bind(&line.sale_id)
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
