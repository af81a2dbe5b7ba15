//! # khata-ledger: Service Layer for Khata
//!
//! Orchestrates the inventory ledger: commits stock-affecting documents and
//! assembles the read-side reports. Pure math lives in khata-core, SQL in
//! khata-db; this crate wires the two together.
//!
//! ## Services
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       khata-ledger services                         │
//! │                                                                     │
//! │  Write side                        Read side                        │
//! │  ──────────                        ─────────                        │
//! │  TransactionRecorder               LedgerReconstructor              │
//! │   └─ ProductResolver               ValuationEngine                  │
//! │      (inside the recorder's        AgingClassifier                  │
//! │       open transaction)            CogsCalculator                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use khata_db::{Database, DbConfig};
//! use khata_ledger::{TransactionRecorder, ValuationEngine};
//! use khata_core::ValuationMethod;
//!
//! let db = Database::new(DbConfig::new("./khata.db")).await?;
//!
//! let recorder = TransactionRecorder::new(db.clone());
//! recorder.commit_purchase(&draft).await?;
//!
//! let engine = ValuationEngine::new(db);
//! let report = engine.value_inventory(ValuationMethod::Fifo).await?;
//! ```
//!
//! Every service takes its `Database` handle explicitly; nothing in this
//! crate reads global state.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aging;
pub mod cogs;
pub mod error;
pub mod history;
pub mod recorder;
pub mod resolver;
pub mod valuation;

// =============================================================================
// Re-exports
// =============================================================================

pub use aging::{AgingClassifier, AgingReport};
pub use cogs::CogsCalculator;
pub use error::{LedgerError, LedgerResult};
pub use history::LedgerReconstructor;
pub use recorder::TransactionRecorder;
pub use resolver::ProductResolver;
pub use valuation::{ValuationEngine, ValuationReport};
