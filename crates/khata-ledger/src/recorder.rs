//! # Transaction Recorder
//!
//! Commits purchase and sale documents atomically.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  draft ── validate ── BEGIN                                         │
//! │                         │                                           │
//! │                         ├── insert header (totals from lines)       │
//! │                         │                                           │
//! │                         ├── per line:                               │
//! │                         │     resolve product (may create)          │
//! │                         │     insert immutable line                 │
//! │                         │     adjust quantity_on_hand by ±qty       │
//! │                         │                                           │
//! │                       COMMIT ── all visible at once                 │
//! │                                                                     │
//! │  any failure ──► ROLLBACK: header, lines, created products and      │
//! │                  stock changes all vanish together                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sale may drive stock negative. That is deliberate: the shop floor
//! already handed the goods over, so the ledger records reality and flags
//! the bookkeeping gap with a warning instead of rejecting the sale.

use chrono::Utc;
use tracing::{info, warn};

use khata_core::validation::{validate_purchase_draft, validate_sale_draft};
use khata_core::{
    Purchase, PurchaseDraft, PurchaseLine, Sale, SaleDraft, SaleLine, TxKind,
};
use khata_db::repository::generate_id;
use khata_db::{Database, DbError, ProductRepository, PurchaseRepository, SaleRepository};

use crate::error::LedgerResult;
use crate::resolver::ProductResolver;

/// Commits stock-affecting documents in single atomic transactions.
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    db: Database,
}

impl TransactionRecorder {
    /// Creates a recorder over the given database handle.
    pub fn new(db: Database) -> Self {
        TransactionRecorder { db }
    }

    /// Commits a purchase document: header, lines, product resolution and
    /// stock increments, all in one transaction.
    pub async fn commit_purchase(&self, draft: &PurchaseDraft) -> LedgerResult<Purchase> {
        validate_purchase_draft(draft)?;

        let now = Utc::now();
        let purchase = Purchase {
            id: generate_id(),
            supplier_name: draft.supplier_name.trim().to_string(),
            doc_date: draft.doc_date,
            total_quantity: draft.lines.iter().map(|l| l.quantity).sum(),
            taxable_paisa: draft.lines.iter().map(|l| l.taxable_paisa()).sum(),
            tax_paisa: draft.lines.iter().map(|l| l.tax_paisa).sum(),
            total_paisa: draft.lines.iter().map(|l| l.total_paisa()).sum(),
            created_at: now,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        PurchaseRepository::insert_header_tx(&mut *tx, &purchase).await?;

        for draft_line in &draft.lines {
            let product =
                ProductResolver::resolve(&mut *tx, draft_line, TxKind::Purchase, now).await?;

            let line = PurchaseLine {
                id: generate_id(),
                purchase_id: purchase.id.clone(),
                product_id: product.id.clone(),
                barcode_snapshot: product.barcode.clone(),
                name_snapshot: product.name.clone(),
                quantity: draft_line.quantity,
                rate_paisa: draft_line.rate_paisa,
                taxable_paisa: draft_line.taxable_paisa(),
                tax_paisa: draft_line.tax_paisa,
                total_paisa: draft_line.total_paisa(),
                created_at: now,
            };
            PurchaseRepository::insert_line_tx(&mut *tx, &line).await?;

            ProductRepository::adjust_stock_tx(&mut *tx, &product.id, draft_line.quantity)
                .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            id = %purchase.id,
            supplier = %purchase.supplier_name,
            lines = draft.lines.len(),
            total_paisa = purchase.total_paisa,
            "Committed purchase"
        );

        Ok(purchase)
    }

    /// Commits a sale document: header, lines, product resolution and stock
    /// decrements, all in one transaction.
    pub async fn commit_sale(&self, draft: &SaleDraft) -> LedgerResult<Sale> {
        validate_sale_draft(draft)?;

        let now = Utc::now();
        let sale = Sale {
            id: generate_id(),
            customer_name: draft.customer_name.trim().to_string(),
            doc_date: draft.doc_date,
            total_quantity: draft.lines.iter().map(|l| l.quantity).sum(),
            taxable_paisa: draft.lines.iter().map(|l| l.taxable_paisa()).sum(),
            tax_paisa: draft.lines.iter().map(|l| l.tax_paisa).sum(),
            total_paisa: draft.lines.iter().map(|l| l.total_paisa()).sum(),
            created_at: now,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        SaleRepository::insert_header_tx(&mut *tx, &sale).await?;

        for draft_line in &draft.lines {
            let product = ProductResolver::resolve(&mut *tx, draft_line, TxKind::Sale, now).await?;

            let line = SaleLine {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: Some(product.id.clone()),
                barcode_snapshot: product.barcode.clone(),
                name_snapshot: product.name.clone(),
                quantity: draft_line.quantity,
                rate_paisa: draft_line.rate_paisa,
                taxable_paisa: draft_line.taxable_paisa(),
                tax_paisa: draft_line.tax_paisa,
                total_paisa: draft_line.total_paisa(),
                created_at: now,
            };
            SaleRepository::insert_line_tx(&mut *tx, &line).await?;

            let balance =
                ProductRepository::adjust_stock_tx(&mut *tx, &product.id, -draft_line.quantity)
                    .await?;

            if balance < 0 {
                warn!(
                    product_id = %product.id,
                    name = %product.name,
                    quantity_on_hand = balance,
                    "Sale drove stock negative (recorded, not rejected)"
                );
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            id = %sale.id,
            customer = %sale.customer_name,
            lines = draft.lines.len(),
            total_paisa = sale.total_paisa,
            "Committed sale"
        );

        Ok(sale)
    }
}
