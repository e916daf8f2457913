//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Voucher Desk                           │
//! │                                                                         │
//! │  voucher invoice generate <id>...                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── DbError::QueryFailed("...") ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule Error? ──── CoreError::MixedInvoiceParties ─ ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: error: [VALIDATION_ERROR] Select at least one voucher          │
//! │  --json: {"code":"VALIDATION_ERROR","message":"Select at least ..."}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged in full and shown to the operator as a generic
//! message; rule and validation failures are shown verbatim.

use serde::Serialize;
use voucher_core::{CoreError, ValidationError};
use voucher_db::DbError;

/// Error returned from CLI commands.
///
/// ## Serialization
/// What `--json` prints when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Voucher not found: 7d2c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripting
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Record already exists
    Duplicate,

    /// Database operation failed
    DatabaseError,

    /// Business rule rejected the operation
    BusinessLogic,

    /// Missing or wrong credentials
    Unauthorized,

    /// Role lacks the capability
    Forbidden,

    /// Reading or writing a file failed
    IoError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
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
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::PasswordHash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal("Could not store the password")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptySelection => ApiError::validation(err.to_string()),
            CoreError::VoucherNotFound(id) => ApiError::not_found("Voucher", &id),
            CoreError::MixedInvoiceParties { .. } | CoreError::InvalidVoucherStatus { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::AuthenticationFailed => ApiError::unauthorized(err.to_string()),
            CoreError::PermissionDenied { .. } => {
                ApiError::new(ErrorCode::Forbidden, err.to_string())
            }
            CoreError::Csv(e) => {
                tracing::error!("CSV encoding failed: {}", e);
                ApiError::internal("Could not encode the CSV document")
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("File operation failed: {}", err);
        ApiError::new(ErrorCode::IoError, format!("File operation failed: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "[{}] {}", code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_generic() {
        let err = ApiError::from(DbError::QueryFailed("no such table: vouchers".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_duplicate_maps_to_duplicate_code() {
        let err = ApiError::from(DbError::duplicate("receipt", "R-1 @ Subway"));
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(err.message, "receipt 'R-1 @ Subway' already exists");
    }

    #[test]
    fn test_rule_errors_keep_message() {
        let err = ApiError::from(CoreError::EmptySelection);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Select at least one voucher");

        let err = ApiError::from(CoreError::PermissionDenied {
            role: "user".into(),
            action: "manage users".into(),
        });
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_display_uses_wire_code() {
        let err = ApiError::not_found("Voucher", "abc");
        assert_eq!(err.to_string(), "[NOT_FOUND] Voucher not found: abc");
    }
}
