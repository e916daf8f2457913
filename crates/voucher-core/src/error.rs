//! # Error Types
//!
//! Domain-specific error types for voucher-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  voucher-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  voucher-db errors (separate crate)                                    │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  voucher-cli errors (in app)                                           │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice was requested without selecting any voucher.
    #[error("Select at least one voucher")]
    EmptySelection,

    /// One or more selected vouchers do not exist.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// An invoice batch mixes vouchers billed to different parties.
    ///
    /// ## When This Occurs
    /// ```text
    /// Selection: [Subway / Air Canada, Subway / Air France]
    ///      │
    ///      ▼
    /// InvoiceBatch::build
    ///      │
    ///      ▼
    /// MixedInvoiceParties { expected: "Subway / Air Canada",
    ///                       found:    "Subway / Air France" }
    /// ```
    #[error("All vouchers on one invoice must share restaurant and airline: expected {expected}, found {found}")]
    MixedInvoiceParties { expected: String, found: String },

    /// Voucher is not in a status that allows the requested transition.
    #[error("Voucher {voucher_id} is {current_status}, cannot perform operation")]
    InvalidVoucherStatus {
        voucher_id: String,
        current_status: String,
    },

    /// Username/password pair did not match a user.
    #[error("Invalid username or password")]
    AuthenticationFailed,

    /// The session's role lacks the capability for the action.
    #[error("{role} users are not allowed to {action}")]
    PermissionDenied { role: String, action: String },

    /// CSV text could not be produced.
    #[error("CSV encoding failed: {0}")]
    Csv(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state mutation is attempted, so a failed validation
/// never leaves a partial write behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid date, invalid code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Password does not satisfy the strength rule.
    #[error("Password must be 8+ chars, with uppercase, lowercase, and number")]
    WeakPassword,

    /// New password and its confirmation differ.
    #[error("New passwords do not match")]
    PasswordMismatch,
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
        let err = CoreError::MixedInvoiceParties {
            expected: "Subway / Air Canada".to_string(),
            found: "Subway / Air France".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "All vouchers on one invoice must share restaurant and airline: \
             expected Subway / Air Canada, found Subway / Air France"
        );

        let err = CoreError::PermissionDenied {
            role: "user".to_string(),
            action: "manage users".to_string(),
        };
        assert_eq!(err.to_string(), "user users are not allowed to manage users");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "receipt".to_string(),
        };
        assert_eq!(err.to_string(), "receipt is required");

        let err = ValidationError::TooLong {
            field: "receipt".to_string(),
            max: 64,
        };
        assert_eq!(err.to_string(), "receipt must be at most 64 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::WeakPassword.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
