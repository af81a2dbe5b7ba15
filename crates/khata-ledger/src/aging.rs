//! # Aging Service
//!
//! Classifies in-stock products into age bands and aggregates the bands.
//!
//! `now` is a parameter rather than read from the clock inside, so reports
//! are reproducible and tests can pin the reference instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use khata_core::aging::{classify_product, summarize};
use khata_core::{AgingBucketSummary, AgingRow, CoreError};
use khata_db::Database;

use crate::error::LedgerResult;

/// Full aging report: per-product rows plus the six-band rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingReport {
    /// Per-product rows, oldest stock first.
    pub rows: Vec<AgingRow>,
    /// All six bands in ascending age order; empty bands zeroed.
    pub buckets: Vec<AgingBucketSummary>,
}

/// Buckets remaining stock by age since the oldest purchase on record.
#[derive(Debug, Clone)]
pub struct AgingClassifier {
    db: Database,
}

impl AgingClassifier {
    /// Creates a classifier over the given database handle.
    pub fn new(db: Database) -> Self {
        AgingClassifier { db }
    }

    /// Classifies every active product with positive stock as of `now`.
    ///
    /// ## Errors
    /// - `CoreError::EmptyDataset` when nothing is in stock
    pub async fn classify(&self, now: DateTime<Utc>) -> LedgerResult<AgingReport> {
        let products = self.db.products().list_in_stock().await?;

        if products.is_empty() {
            return Err(CoreError::EmptyDataset("no products in stock".to_string()).into());
        }

        debug!(products = products.len(), "Classifying stock age");

        let mut rows = Vec::with_capacity(products.len());
        for product in &products {
            let oldest = self.db.purchases().oldest_purchase_date(&product.id).await?;
            let lots = self.db.purchases().lots_for_product(&product.id).await?;
            rows.push(classify_product(product, oldest, &lots, now));
        }

        // Oldest stock first: the rows a shopkeeper acts on come on top.
        rows.sort_by(|a, b| b.age_days.cmp(&a.age_days));

        let buckets = summarize(&rows);

        Ok(AgingReport { rows, buckets })
    }
}
