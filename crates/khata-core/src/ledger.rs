//! # Ledger Reconstruction Math
//!
//! Rebuilds an ordered, running-balance view of one product's
//! stock-affecting transactions.
//!
//! ## How Reconstruction Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  purchase/sale lines for the product (date-filtered if requested)   │
//! │       │                                                             │
//! │       ▼  sort ascending by document date                            │
//! │  opening balance                                                    │
//! │   ├── unfiltered: 0                                                 │
//! │   └── filtered:   qty_on_hand - Σ(signed quantities in window)      │
//! │       │            (back-derived: no append-only balance log        │
//! │       ▼             is kept, so this is an approximation)           │
//! │  walk ascending, accumulating running_balance                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  reverse -> newest-first for display                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariant: in the unfiltered case the running balance attached to the
//! chronologically last transaction equals the product's current quantity
//! on hand exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TxKind;

// =============================================================================
// Filter
// =============================================================================

/// Caller-supplied restriction on the reconstructed history.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub kind: Option<TxKind>,
}

impl LedgerFilter {
    /// No restriction: full history, both kinds.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// True when neither a date window nor a kind filter applies.
    pub fn is_unrestricted(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.kind.is_none()
    }
}

// =============================================================================
// Entry
// =============================================================================

/// One reconstructed ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub doc_date: DateTime<Utc>,
    /// Reference to the parent purchase/sale document.
    pub doc_ref: String,
    pub kind: TxKind,
    /// Signed: positive for purchases, negative for sales.
    pub quantity: i64,
    pub rate_paisa: i64,
    pub amount_paisa: i64,
    /// Supplier or customer name from the document header.
    pub counterpart: String,
    /// Stock level after this transaction.
    pub running_balance: i64,
}

impl LedgerEntry {
    /// Returns the line amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paisa(self.amount_paisa)
    }
}

// =============================================================================
// Reconstruction
// =============================================================================

/// Back-derives the opening balance for a restricted window.
///
/// Unfiltered history opens at zero. A restricted view opens at
/// `quantity_on_hand - Σ(signed quantities in the window)`: what stock must
/// have been before the window, given where it ended up. An approximation -
/// no append-only balance log is kept - and with a kind filter applied the
/// balance is a view of that kind only.
pub fn opening_balance(quantity_on_hand: i64, entries: &[LedgerEntry], filter: &LedgerFilter) -> i64 {
    if filter.is_unrestricted() {
        return 0;
    }
    let window_delta: i64 = entries.iter().map(|e| e.quantity).sum();
    quantity_on_hand - window_delta
}

/// Sorts entries ascending by document date, accumulates the running
/// balance from `opening`, and returns them newest-first for display.
pub fn build_ledger(opening: i64, mut entries: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    // Stable sort: same-instant entries keep insertion order.
    entries.sort_by_key(|e| e.doc_date);

    let mut balance = opening;
    for entry in &mut entries {
        balance += entry.quantity;
        entry.running_balance = balance;
    }

    entries.reverse();
    entries
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(days_ago: i64, kind: TxKind, qty: i64) -> LedgerEntry {
        let signed = match kind {
            TxKind::Purchase => qty,
            TxKind::Sale => -qty,
        };
        LedgerEntry {
            doc_date: Utc::now() - Duration::days(days_ago),
            doc_ref: format!("doc-{days_ago}"),
            kind,
            quantity: signed,
            rate_paisa: 500,
            amount_paisa: 500 * qty,
            counterpart: "Mehta Traders".to_string(),
            running_balance: 0,
        }
    }

    #[test]
    fn test_running_balance_walk() {
        let entries = vec![
            entry(3, TxKind::Purchase, 10),
            entry(2, TxKind::Sale, 4),
            entry(1, TxKind::Purchase, 5),
        ];
        let ledger = build_ledger(0, entries);

        // Newest-first output.
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[0].running_balance, 11); // after +10 -4 +5
        assert_eq!(ledger[1].running_balance, 6);
        assert_eq!(ledger[2].running_balance, 10);
    }

    #[test]
    fn test_unfiltered_last_balance_matches_quantity_on_hand() {
        let entries = vec![
            entry(5, TxKind::Purchase, 8),
            entry(4, TxKind::Sale, 3),
            entry(2, TxKind::Sale, 7),
            entry(1, TxKind::Purchase, 2),
        ];
        let quantity_on_hand = 8 - 3 - 7 + 2;
        let filter = LedgerFilter::unrestricted();
        let opening = opening_balance(quantity_on_hand, &entries, &filter);
        assert_eq!(opening, 0);

        let ledger = build_ledger(opening, entries);
        assert_eq!(ledger[0].running_balance, quantity_on_hand);
    }

    #[test]
    fn test_filtered_opening_back_derivation() {
        // Full history: +10 (day 30), -4 (day 5), +2 (day 1); qoh = 8.
        // Window covers only the last two entries.
        let windowed = vec![entry(5, TxKind::Sale, 4), entry(1, TxKind::Purchase, 2)];
        let filter = LedgerFilter {
            start: Some(Utc::now() - Duration::days(10)),
            end: None,
            kind: None,
        };
        let opening = opening_balance(8, &windowed, &filter);
        // 8 - (-4 + 2) = 10: the stock the window must have opened at.
        assert_eq!(opening, 10);

        let ledger = build_ledger(opening, windowed);
        assert_eq!(ledger[0].running_balance, 8);
        assert_eq!(ledger[1].running_balance, 6);
    }

    #[test]
    fn test_output_is_newest_first() {
        let entries = vec![entry(1, TxKind::Purchase, 1), entry(9, TxKind::Purchase, 1)];
        let ledger = build_ledger(0, entries);
        assert!(ledger[0].doc_date > ledger[1].doc_date);
    }
}
