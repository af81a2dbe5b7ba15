//! # Product Resolution
//!
//! Maps an entered transaction line to a catalog product, or creates one.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  line (barcode, mrp_paisa)                                          │
//! │       │                                                             │
//! │       ├── barcode empty ──────────────► create new product          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  1. exact (barcode, mrp_paisa) match ──► reuse                      │
//! │       │ none                                                        │
//! │       ▼                                                             │
//! │  2. same barcode, |mrp diff| ≤ 1 paisa ─► reuse closest             │
//! │       │ none within tolerance           (first found wins on ties,  │
//! │       ▼                                  logged at debug)           │
//! │  3. create new product (qoh = 0)                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same physical barcode legitimately maps to several products when the
//! manufacturer revises the printed MRP: each price point is its own SKU
//! with its own cost history.
//!
//! Resolution runs against the recorder's open transaction, so a created
//! product and the lines referencing it commit or roll back together.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use khata_core::{LineDraft, Product, TxKind, MRP_TOLERANCE_PAISA};
use khata_db::repository::generate_id;
use khata_db::ProductRepository;

use crate::error::LedgerResult;

/// Resolves entered lines to catalog products inside an open transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductResolver;

impl ProductResolver {
    /// Resolves one line to an existing product, or creates a new one.
    ///
    /// A newly created product starts at zero stock; the recorder applies
    /// the line's stock delta afterwards, for new and reused products alike.
    pub async fn resolve(
        conn: &mut SqliteConnection,
        line: &LineDraft,
        kind: TxKind,
        now: DateTime<Utc>,
    ) -> LedgerResult<Product> {
        let barcode = line
            .barcode
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());

        let Some(barcode) = barcode else {
            // Loose/unlabelled goods: nothing to match against.
            return Self::create(conn, line, None, kind, now).await;
        };

        let candidates = ProductRepository::find_by_barcode_tx(conn, barcode).await?;

        // 1. Exact price-point match.
        if let Some(exact) = candidates.iter().find(|p| p.mrp_paisa == line.mrp_paisa) {
            return Ok(exact.clone());
        }

        // 2. Closest within tolerance. Candidates come back in creation
        //    order; only a strictly smaller distance displaces the held
        //    candidate, so ties resolve to the oldest product.
        let mut closest: Option<&Product> = None;
        for candidate in &candidates {
            let diff = (candidate.mrp_paisa - line.mrp_paisa).abs();
            if diff > MRP_TOLERANCE_PAISA {
                continue;
            }
            let held_diff = closest.map(|c| (c.mrp_paisa - line.mrp_paisa).abs());
            if held_diff.map_or(true, |h| diff < h) {
                closest = Some(candidate);
            }
        }

        if let Some(closest) = closest {
            if candidates.len() > 1 {
                debug!(
                    barcode = %barcode,
                    entered_mrp = line.mrp_paisa,
                    matched_mrp = closest.mrp_paisa,
                    candidates = candidates.len(),
                    "Ambiguous barcode resolved to closest MRP"
                );
            }
            return Ok(closest.clone());
        }

        // 3. New price point for this barcode: a distinct SKU.
        Self::create(conn, line, Some(barcode.to_string()), kind, now).await
    }

    async fn create(
        conn: &mut SqliteConnection,
        line: &LineDraft,
        barcode: Option<String>,
        kind: TxKind,
        now: DateTime<Utc>,
    ) -> LedgerResult<Product> {
        // A sale line tells us the actual selling rate; a purchase line only
        // tells us cost, so the list price stands in until a sale prices it.
        let sale_price_paisa = match kind {
            TxKind::Sale => line.rate_paisa,
            TxKind::Purchase => line.mrp_paisa,
        };

        let product = Product {
            id: generate_id(),
            barcode,
            name: line.name.trim().to_string(),
            category: line.category.trim().to_string(),
            mrp_paisa: line.mrp_paisa,
            sale_price_paisa,
            quantity_on_hand: 0,
            reorder_point: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        ProductRepository::insert_tx(conn, &product).await?;

        debug!(
            id = %product.id,
            name = %product.name,
            mrp_paisa = product.mrp_paisa,
            "Created product during resolution"
        );

        Ok(product)
    }
}
