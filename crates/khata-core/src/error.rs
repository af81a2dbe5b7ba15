//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  khata-core errors (this file)                                      │
//! │  ├── CoreError        - domain conditions (empty dataset, ...)      │
//! │  └── ValidationError  - input validation failures                   │
//! │                                                                     │
//! │  khata-db errors (separate crate)                                   │
//! │  └── DbError          - persistence failures                        │
//! │                                                                     │
//! │  khata-ledger errors                                                │
//! │  └── LedgerError      - unions the above for service callers        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! Resolution and valuation logic never error on missing history - they fall
//! back to documented defaults (MRP-based valuation, zero age). Only
//! persistence failures and caller mistakes (bad date range, empty document)
//! surface as errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A report was requested over an empty product/transaction set.
    ///
    /// Recoverable, user-facing "no data" condition - not a crash and not a
    /// bug. Callers typically render an empty-state screen.
    #[error("no data: {0}")]
    EmptyDataset(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any query or commit runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Caller-supplied date range has end before start.
    ///
    /// Must be rejected before invoking any report component; the core does
    /// not clamp or correct it.
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A document was submitted with no lines, or with too many.
    #[error("document must have between 1 and {max} lines, got {got}")]
    BadLineCount { got: usize, max: usize },

    /// Invalid format (e.g. bad UUID, bad barcode charset).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::EmptyDataset("no products in stock".to_string());
        assert_eq!(err.to_string(), "no data: no products in stock");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "supplier_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
