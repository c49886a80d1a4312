//! # Validation Module
//!
//! Input validation for back-office writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service (backoffice app)                                      │
//! │  └── THIS MODULE: field rules, amounts, item lines                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger (salon-core::ledger)                                   │
//! │  └── Payment sufficiency against the base total                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  └── UNIQUE invoice numbers, one open shift                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use salon_core::validation::{validate_item, validate_required};
//! use salon_core::Money;
//!
//! validate_required("supplier name", "Nile Beauty Supplies").unwrap();
//! validate_item("Shampoo 1L", 3, Money::from_cents(4_500)).unwrap();
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::{
    MAX_AMOUNT_CENTS, MAX_INVOICE_ITEMS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_NOTES_LENGTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required short text field (names, cashier, labels).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_NAME_LENGTH` characters
///
/// ## Returns
/// The trimmed value.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

/// Validates a phone number as typed at the till.
///
/// Digits, spaces, `+` and `-` only. The value is compared by exact string
/// match elsewhere, so it is trimmed but not otherwise normalized.
///
/// ```rust
/// use salon_core::validation::validate_phone;
///
/// assert!(validate_phone("0100000000").is_ok());
/// assert!(validate_phone("+20 100 000 0000").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_required("phone", phone)?;

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(phone)
}

/// Validates free-form notes.
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Amount Validators
// =============================================================================

fn validate_at_most_max(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Rejects negative amounts and amounts above `MAX_AMOUNT_CENTS`. Zero is
/// allowed.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    validate_at_most_max(field, amount)
}

/// Rejects zero, negative amounts and amounts above `MAX_AMOUNT_CENTS`.
pub fn validate_positive(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_at_most_max(field, amount)
}

/// Validates the gross amount and discount of a sale.
///
/// ## Rules
/// - Amount and discount must not be negative
/// - Discount must not exceed the amount, so the net amount is never negative
///
/// ```rust
/// use salon_core::validation::validate_sale_amounts;
/// use salon_core::Money;
///
/// assert!(validate_sale_amounts(Money::from_cents(500), Money::from_cents(500)).is_ok());
/// assert!(validate_sale_amounts(Money::from_cents(500), Money::from_cents(501)).is_err());
/// ```
pub fn validate_sale_amounts(amount: Money, discount: Money) -> CoreResult<()> {
    validate_non_negative("amount", amount)?;
    validate_non_negative("discount", discount)?;

    if discount > amount {
        return Err(CoreError::DiscountExceedsAmount { amount, discount });
    }

    Ok(())
}

// =============================================================================
// Purchase Invoice Items
// =============================================================================

/// Validates one purchase invoice line.
///
/// ## Rules
/// - Item name is required
/// - Quantity between 1 and `MAX_ITEM_QUANTITY`
/// - Unit price must not be negative (free samples are allowed) and not
///   above `MAX_AMOUNT_CENTS`
pub fn validate_item(item_name: &str, quantity: i64, unit_price: Money) -> ValidationResult<()> {
    validate_required("item name", item_name)?;

    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    validate_non_negative("unit price", unit_price)
}

/// Validates the number of lines on a purchase invoice.
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_INVOICE_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_INVOICE_ITEMS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
