//! # Validation Module
//!
//! Input validation for transaction entry and report requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Caller (entry screen / import job)                        │
//! │  └── basic format checks, immediate feedback                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation, runs before       │
//! │           any transaction is opened or report query issued          │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (NOT NULL, FK, CHECK constraints)                │
//! │                                                                     │
//! │  Defense in depth: each layer catches different mistakes            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::{LineDraft, PurchaseDraft, SaleDraft};
use crate::{MAX_DOCUMENT_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Date Range
// =============================================================================

/// Validates a caller-supplied report window.
///
/// ## Rules
/// - Either bound may be open (None)
/// - When both are present, end must not precede start
///
/// The core never clamps or corrects a bad range; it is the caller's input
/// mistake and is rejected before any query runs.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use khata_core::validation::validate_date_range;
///
/// let now = Utc::now();
/// assert!(validate_date_range(Some(now - Duration::days(7)), Some(now)).is_ok());
/// assert!(validate_date_range(Some(now), Some(now - Duration::days(7))).is_err());
/// assert!(validate_date_range(None, Some(now)).is_ok());
/// ```
pub fn validate_date_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a counterpart (supplier/customer) name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_counterpart_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "counterpart name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "counterpart name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a barcode, when present.
///
/// ## Rules
/// - Empty is fine (loose goods carry no barcode)
/// - At most 64 characters
/// - Digits, letters and hyphens only (EAN/UPC/Code128 charsets)
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Ok(());
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if !barcode.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0); the sign of stock movement comes from the
///   document kind, not from the entered quantity
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price/rate in paisa.
///
/// ## Rules
/// - Must be non-negative; zero is allowed (free goods, samples)
pub fn validate_price_paisa(paisa: i64) -> ValidationResult<()> {
    if paisa < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates one entered line.
pub fn validate_line(line: &LineDraft) -> ValidationResult<()> {
    validate_product_name(&line.name)?;
    if let Some(barcode) = &line.barcode {
        validate_barcode(barcode)?;
    }
    validate_quantity(line.quantity)?;
    validate_price_paisa(line.mrp_paisa)?;
    validate_price_paisa(line.rate_paisa)?;
    validate_price_paisa(line.tax_paisa)?;
    Ok(())
}

fn validate_lines(lines: &[LineDraft]) -> ValidationResult<()> {
    if lines.is_empty() || lines.len() > MAX_DOCUMENT_LINES {
        return Err(ValidationError::BadLineCount {
            got: lines.len(),
            max: MAX_DOCUMENT_LINES,
        });
    }
    for line in lines {
        validate_line(line)?;
    }
    Ok(())
}

/// Validates a purchase draft in full, before any write begins.
pub fn validate_purchase_draft(draft: &PurchaseDraft) -> ValidationResult<()> {
    validate_counterpart_name(&draft.supplier_name)?;
    validate_lines(&draft.lines)
}

/// Validates a sale draft in full, before any write begins.
pub fn validate_sale_draft(draft: &SaleDraft) -> ValidationResult<()> {
    validate_counterpart_name(&draft.customer_name)?;
    validate_lines(&draft.lines)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft_line() -> LineDraft {
        LineDraft {
            barcode: Some("8901234567890".to_string()),
            name: "Atta 5kg".to_string(),
            category: "Grocery".to_string(),
            mrp_paisa: 45000,
            quantity: 2,
            rate_paisa: 40000,
            tax_paisa: 0,
        }
    }

    #[test]
    fn test_validate_date_range() {
        let now = Utc::now();
        assert!(validate_date_range(None, None).is_ok());
        assert!(validate_date_range(Some(now), None).is_ok());
        assert!(validate_date_range(None, Some(now)).is_ok());
        assert!(validate_date_range(Some(now), Some(now)).is_ok());
        assert!(validate_date_range(Some(now), Some(now - Duration::seconds(1))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901234567890").is_ok());
        assert!(validate_barcode("").is_ok());
        assert!(validate_barcode("ABC-123").is_ok());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"9".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_price_paisa() {
        assert!(validate_price_paisa(0).is_ok());
        assert!(validate_price_paisa(1099).is_ok());
        assert!(validate_price_paisa(-100).is_err());
    }

    #[test]
    fn test_validate_purchase_draft() {
        let draft = PurchaseDraft {
            supplier_name: "Mehta Traders".to_string(),
            doc_date: Utc::now(),
            lines: vec![draft_line()],
        };
        assert!(validate_purchase_draft(&draft).is_ok());

        let empty = PurchaseDraft {
            supplier_name: "Mehta Traders".to_string(),
            doc_date: Utc::now(),
            lines: vec![],
        };
        assert!(validate_purchase_draft(&empty).is_err());

        let mut bad_line = draft_line();
        bad_line.quantity = 0;
        let bad = PurchaseDraft {
            supplier_name: "Mehta Traders".to_string(),
            doc_date: Utc::now(),
            lines: vec![draft_line(), bad_line],
        };
        assert!(validate_purchase_draft(&bad).is_err());
    }
}
