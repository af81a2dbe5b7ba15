//! # khata-core: Pure Business Logic for Khata
//!
//! This crate is the **heart** of the Khata inventory ledger. It contains the
//! valuation, aging, COGS and running-balance logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Khata Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              Report / export collaborators                    │ │
//! │  │      (spreadsheet, CSV, PDF writers - out of scope)           │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                 khata-ledger (services)                       │ │
//! │  │   resolver, recorder, history, valuation, aging, cogs         │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │               ★ khata-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌──────┐ ┌──────┐    │ │
//! │  │   │  money  │ │ valuation │ │ ledger  │ │aging │ │ cogs │    │ │
//! │  │   │  Money  │ │ FIFO/LIFO │ │ balance │ │bands │ │margin│    │ │
//! │  │   └─────────┘ └───────────┘ └─────────┘ └──────┘ └──────┘    │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                  khata-db (Database layer)                    │ │
//! │  │          SQLite queries, migrations, repositories             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Purchase, Sale, lines, drafts)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`valuation`] - FIFO / LIFO / weighted-average lot math
//! - [`ledger`] - Running-balance reconstruction over transaction entries
//! - [`aging`] - Stock age bands and catalog aggregation
//! - [`cogs`] - Cost-of-goods-sold and margin math
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are paisa (i64); floats appear
//!    only in derived unit rates and percentages
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aging;
pub mod cogs;
pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;
pub mod valuation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use khata_core::Money` instead of
// `use khata_core::money::Money`.

pub use aging::{AgingBucket, AgingBucketSummary, AgingRow};
pub use cogs::{CategoryCogs, CogsRow, CogsSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{LedgerEntry, LedgerFilter};
pub use money::Money;
pub use types::*;
pub use valuation::{PurchaseLot, ValuationRow};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// MRP tolerance, in paisa, for resolving a transaction line to an existing
/// product sharing its barcode.
///
/// ## Why a tolerance at all?
/// Repeated manual price entry produces rounding noise around the same list
/// price. One paisa (0.01 currency unit) absorbs that noise while still
/// treating meaningfully different price points as distinct SKUs. Because
/// prices are integer paisa, the comparison is exact integer arithmetic -
/// there is no epsilon and no rounding ambiguity.
pub const MRP_TOLERANCE_PAISA: i64 = 1;

/// Maximum quantity accepted on a single transaction line.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g. typing 100000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Maximum lines accepted on a single purchase or sale document.
///
/// ## Business Reason
/// Keeps one commit a bounded unit of work; real supplier invoices in this
/// segment run tens of lines, not thousands.
pub const MAX_DOCUMENT_LINES: usize = 500;
