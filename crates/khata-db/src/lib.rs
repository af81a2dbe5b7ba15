//! # khata-db: Database Layer for Khata
//!
//! This crate provides database access for the Khata inventory ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khata Data Flow                                  │
//! │                                                                         │
//! │  Ledger service (TransactionRecorder, ValuationEngine, ...)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     khata-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │ (product.rs)  │    │  (embedded)  │    │    │
//! │  │   │               │    │               │    │              │    │    │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │    │    │
//! │  │   │ Connection    │◄───│ PurchaseRepo  │    │ 002_idx.sql  │    │    │
//! │  │   │ Management    │    │ SaleRepo      │    │              │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: for tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, purchase, sale)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khata_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/khata.db")).await?;
//!
//! let products = db.products().list_in_stock().await?;
//! let lots = db.purchases().lots_for_product("product-id").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
pub use repository::{DocumentLine, SoldTotals};
