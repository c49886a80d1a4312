//! # API Error Type
//!
//! Unified error type returned by the back office services.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back Office                        │
//! │                                                                         │
//! │  Service method → Result<T, ApiError>                                   │
//! │         │                                                               │
//! │         ├── ValidationError (field rules)    ──► 400 VALIDATION_ERROR   │
//! │         ├── CoreError (over-payment,                                   │
//! │         │   amount overflow)                 ──► 400 VALIDATION_ERROR   │
//! │         ├── CoreError (other ledger rules)   ──► 422 BUSINESS_LOGIC     │
//! │         ├── DbError::NotFound                ──► 404 NOT_FOUND          │
//! │         ├── DbError::Conflict                ──► 409 CONFLICT           │
//! │         └── DbError (storage)                ──► 500 DATABASE_ERROR     │
//! │                                                                         │
//! │  The HTTP layer serializes { code, message } and uses                   │
//! │  code.http_status() as the response status.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage details are logged, never returned to the caller.

use serde::Serialize;

use salon_core::{CoreError, ValidationError};
use salon_db::DbError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from service operations.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Payment of 250.00 on invoice PI-0001 exceeds its total: already paid 0.00 of 200.00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Record changed concurrently (409)
    Conflict,

    /// Ledger rule violated (422)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl ErrorCode {
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError => 400,
            ErrorCode::Conflict => 409,
            ErrorCode::BusinessLogic => 422,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    #[inline]
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Conflict { entity, id } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} was changed by someone else; reload and retry", entity, id),
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts ledger rule violations to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::MalformedInvoiceNumber(_) => ApiError::internal(err.to_string()),
            // Rejected request input, reported like any other invalid field.
            CoreError::PaymentExceedsTotal { .. } | CoreError::AmountOverflow { .. } => {
                ApiError::validation(err.to_string())
            }
            CoreError::DiscountExceedsAmount { .. }
            | CoreError::ShiftAlreadyOpen { .. }
            | CoreError::ShiftNotOpen { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::Money;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::from(DbError::not_found("Supplier", "s1")).http_status(), 404);
        assert_eq!(ApiError::from(DbError::conflict("Shift", "s1")).http_status(), 409);
        assert_eq!(
            ApiError::from(DbError::QueryFailed("disk I/O error".to_string())).http_status(),
            500
        );

        let exceeded = CoreError::PaymentExceedsTotal {
            invoice_number: "PI-0001".to_string(),
            paid: Money::zero(),
            payment: Money::from_cents(25_000),
            base_total: Money::from_cents(20_000),
        };
        let exceeded = ApiError::from(exceeded);
        assert_eq!(exceeded.code, ErrorCode::ValidationError);
        assert_eq!(exceeded.http_status(), 400);
        assert!(exceeded.message.contains("PI-0001"));

        let overflow = CoreError::AmountOverflow {
            field: "paid amount".to_string(),
        };
        assert_eq!(ApiError::from(overflow).http_status(), 400);

        let discount = CoreError::DiscountExceedsAmount {
            amount: Money::from_cents(100),
            discount: Money::from_cents(200),
        };
        assert_eq!(ApiError::from(discount).http_status(), 422);

        let required = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        });
        assert_eq!(ApiError::from(required).code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_storage_details_are_not_leaked() {
        let err = ApiError::from(DbError::QueryFailed("no such table: suppliers".to_string()));
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Sale", "abc")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Sale not found: abc");
    }
}
