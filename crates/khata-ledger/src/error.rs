//! # Service Error Types
//!
//! The error surface callers of the ledger services see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  khata-core  CoreError / ValidationError ──┐                        │
//! │                                            ├──► LedgerError         │
//! │  khata-db    DbError ──────────────────────┘                        │
//! │                                                                     │
//! │  A DbError inside an open commit means the transaction rolled       │
//! │  back; the store is exactly as it was before the commit began.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use khata_core::{CoreError, ValidationError};
use khata_db::DbError;

/// Errors surfaced by the ledger services.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Domain condition from the core (e.g. empty dataset for a report).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Caller input rejected before any query or commit ran.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence failure. For commits this means a full rollback.
    #[error("database error: {0}")]
    Db(#[from] DbError),
}

/// Result type for ledger service operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts() {
        let err: LedgerError = ValidationError::Required {
            field: "supplier_name".to_string(),
        }
        .into();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(err.to_string().contains("supplier_name"));
    }

    #[test]
    fn test_db_converts() {
        let err: LedgerError = DbError::not_found("Product", "p1").into();
        assert!(matches!(err, LedgerError::Db(DbError::NotFound { .. })));
    }
}
