//! # Error Types
//!
//! Domain-specific error types for salon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salon-core errors (this file)                                         │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  salon-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  └── ApiError         - What the HTTP layer sees (code + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError                          │
//! │                          DbError   → ApiError                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// Raised before anything is persisted; a request failing with one of these
/// leaves every record untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payment would push an invoice's paid amount over its base total.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice PI-0007: base 200.00, paid 0.00
    ///      │
    ///      ▼
    /// record_payment(250.00)
    ///      │
    ///      ▼
    /// PaymentExceedsTotal { paid: 0.00, payment: 250.00, base_total: 200.00 }
    ///      │
    ///      ▼
    /// Invoice and supplier unchanged
    /// ```
    #[error(
        "Payment of {payment} on invoice {invoice_number} exceeds its total: \
         already paid {paid} of {base_total}"
    )]
    PaymentExceedsTotal {
        invoice_number: String,
        paid: Money,
        payment: Money,
        base_total: Money,
    },

    /// Discount larger than the gross amount of a sale.
    #[error("Discount {discount} exceeds sale amount {amount}")]
    DiscountExceedsAmount { amount: Money, discount: Money },

    /// Opening a shift while another one is still open.
    #[error("Shift {open_shift_id} is still open; close it before opening a new one")]
    ShiftAlreadyOpen { open_shift_id: String },

    /// Closing (or otherwise finishing) a shift that is not open.
    #[error("Shift {shift_id} is not open")]
    ShiftNotOpen { shift_id: String },

    /// Money arithmetic left the representable range.
    #[error("{field} is too large")]
    AmountOverflow { field: String },

    /// An invoice number that does not follow `<PREFIX>-<sequence>`.
    #[error("Malformed invoice number: {0}")]
    MalformedInvoiceNumber(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any ledger arithmetic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field has invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
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
    fn test_payment_exceeds_message() {
        let err = CoreError::PaymentExceedsTotal {
            invoice_number: "PI-0007".to_string(),
            paid: Money::zero(),
            payment: Money::from_cents(25_000),
            base_total: Money::from_cents(20_000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of 250.00 on invoice PI-0007 exceeds its total: already paid 0.00 of 200.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "supplier".to_string(),
        };
        assert_eq!(err.to_string(), "supplier is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_overflow_message() {
        let err = CoreError::AmountOverflow {
            field: "invoice total".to_string(),
        };
        assert_eq!(err.to_string(), "invoice total is too large");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
