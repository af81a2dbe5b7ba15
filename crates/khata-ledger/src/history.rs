//! # Ledger Reconstruction Service
//!
//! Loads one product's transaction lines and hands them to the pure
//! running-balance math in khata-core.
//!
//! Date bounds are pushed into SQL (indexed on `doc_date`); the sort,
//! opening-balance derivation and balance walk happen in memory on the
//! filtered rows only.

use tracing::debug;

use khata_core::ledger::{build_ledger, opening_balance};
use khata_core::validation::validate_date_range;
use khata_core::{LedgerEntry, LedgerFilter, TxKind};
use khata_db::repository::DocumentLine;
use khata_db::{Database, DbError};

use crate::error::LedgerResult;

/// Rebuilds the running-balance transaction history of one product.
#[derive(Debug, Clone)]
pub struct LedgerReconstructor {
    db: Database,
}

impl LedgerReconstructor {
    /// Creates a reconstructor over the given database handle.
    pub fn new(db: Database) -> Self {
        LedgerReconstructor { db }
    }

    /// Reconstructs the ledger for `product_id` under the given filter.
    ///
    /// Output is newest-first. Unfiltered, the chronologically-last entry's
    /// running balance equals the product's current quantity on hand.
    /// A product with no transactions (or none in the window) yields an
    /// empty ledger, not an error.
    ///
    /// ## Errors
    /// - `LedgerError::Validation` when end precedes start (checked before
    ///   any query runs)
    /// - `LedgerError::Db(NotFound)` for an unknown product
    pub async fn product_ledger(
        &self,
        product_id: &str,
        filter: &LedgerFilter,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        validate_date_range(filter.start, filter.end)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let mut entries: Vec<LedgerEntry> = Vec::new();

        if filter.kind != Some(TxKind::Sale) {
            let lines = self
                .db
                .purchases()
                .lines_for_product(product_id, filter.start, filter.end)
                .await?;
            entries.extend(lines.into_iter().map(|l| entry_from(l, TxKind::Purchase)));
        }

        if filter.kind != Some(TxKind::Purchase) {
            let lines = self
                .db
                .sales()
                .lines_for_product(product_id, filter.start, filter.end)
                .await?;
            entries.extend(lines.into_iter().map(|l| entry_from(l, TxKind::Sale)));
        }

        debug!(
            product_id = %product_id,
            entries = entries.len(),
            "Reconstructing ledger"
        );

        let opening = opening_balance(product.quantity_on_hand, &entries, filter);
        Ok(build_ledger(opening, entries))
    }
}

/// Signs the quantity by document kind; running balance is filled by the walk.
fn entry_from(line: DocumentLine, kind: TxKind) -> LedgerEntry {
    let signed = match kind {
        TxKind::Purchase => line.quantity,
        TxKind::Sale => -line.quantity,
    };

    LedgerEntry {
        doc_date: line.doc_date,
        doc_ref: line.doc_id,
        kind,
        quantity: signed,
        rate_paisa: line.rate_paisa,
        amount_paisa: line.total_paisa,
        counterpart: line.counterpart,
        running_balance: 0,
    }
}
