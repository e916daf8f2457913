//! # Validation Module
//!
//! Input validation for vouchers, registries and user accounts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                   │
//! │  └── Presence of arguments, numeric types                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Receipt / name length                                              │
//! │  ├── Registry membership for manual entry                               │
//! │  └── Password strength, username charset                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE (receipt, restaurant)                                       │
//! │  └── UNIQUE username / restaurant / airline                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check runs before any write, so a rejected input never leaves a
//! partial change in the store.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{AirlineRegistry, RestaurantRegistry, VoucherDraft};
use crate::{MAX_NAME_LENGTH, MAX_RECEIPT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a receipt number and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_RECEIPT_LENGTH`] characters
///
/// ```rust
/// use voucher_core::validation::validate_receipt;
///
/// assert_eq!(validate_receipt(" 10042 ").unwrap(), "10042");
/// assert!(validate_receipt("   ").is_err());
/// ```
pub fn validate_receipt(receipt: &str) -> ValidationResult<String> {
    let receipt = receipt.trim();

    if receipt.is_empty() {
        return Err(ValidationError::Required {
            field: "receipt".to_string(),
        });
    }

    if receipt.chars().count() > MAX_RECEIPT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "receipt".to_string(),
            max: MAX_RECEIPT_LENGTH,
        });
    }

    Ok(receipt.to_string())
}

/// Validates a restaurant or airline name and returns it trimmed.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates an airline code and returns it upper-cased.
///
/// ## Rules
/// - Exactly three ASCII letters or digits
///
/// ```rust
/// use voucher_core::validation::validate_airline_code;
///
/// assert_eq!(validate_airline_code("wja").unwrap(), "WJA");
/// assert!(validate_airline_code("WJ").is_err());
/// assert!(validate_airline_code("W-A").is_err());
/// ```
pub fn validate_airline_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must be exactly 3 letters or digits".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a username and returns it trimmed.
///
/// ## Rules
/// - 3 to 32 characters
/// - Letters, digits, `.`, `_` and `-` only
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    let len = username.chars().count();
    if len < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }
    if len > 32 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 32,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(username.to_string())
}

// =============================================================================
// Passwords
// =============================================================================

/// Returns true for 8+ characters with a lowercase letter, an uppercase
/// letter and a digit.
///
/// ```rust
/// use voucher_core::validation::is_strong_password;
///
/// assert!(is_strong_password("Admin123"));
/// assert!(!is_strong_password("admin123"));
/// assert!(!is_strong_password("Admin12"));
/// ```
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Validates a password for a new account.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// Validates the new-password pair of a password change.
///
/// Verifying the old password needs the stored hash and happens in the store.
pub fn validate_password_change(new_password: &str, confirmation: &str) -> ValidationResult<()> {
    if new_password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    validate_password(new_password)
}

// =============================================================================
// Numeric and Date Validators
// =============================================================================

/// Parses an operator-entered subtotal.
///
/// Unlike [`Money::parse_lenient`], rejects non-numeric text so a typo on the
/// command line never becomes a zero-dollar voucher.
pub fn parse_subtotal(input: &str) -> ValidationResult<Money> {
    let subtotal = Money::parse(input).ok_or_else(|| ValidationError::InvalidFormat {
        field: "subtotal".to_string(),
        reason: "must be a decimal amount such as 12.50".to_string(),
    })?;
    validate_subtotal(subtotal)?;
    Ok(subtotal)
}

/// Validates that a subtotal is between zero and [`Money::MAX_SUBTOTAL`].
pub fn validate_subtotal(subtotal: Money) -> ValidationResult<()> {
    if subtotal.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "subtotal".to_string(),
        });
    }
    if subtotal > Money::MAX_SUBTOTAL {
        return Err(ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            min: 0,
            max: Money::MAX_SUBTOTAL.dollars(),
        });
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, input: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a date in YYYY-MM-DD format".to_string(),
        }
    })
}

// =============================================================================
// ID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a valid UUID".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a manually entered voucher against the registries.
///
/// ## User Workflow
/// ```text
/// voucher add --receipt 10042 --restaurant Subway --airline "Air Canada" ...
///      │
///      ▼
/// validate_draft ← THIS FUNCTION
///      │
///      ├── receipt empty / too long?      → Required / TooLong
///      ├── restaurant not registered?     → NotAllowed
///      ├── airline not registered?        → NotAllowed
///      ├── subtotal < 0?                  → MustNotBeNegative
///      │
///      └── OK → VoucherDraft::price → insert
/// ```
pub fn validate_draft(
    draft: &VoucherDraft,
    restaurants: &RestaurantRegistry,
    airlines: &AirlineRegistry,
) -> ValidationResult<()> {
    validate_receipt(&draft.receipt)?;

    let restaurant = validate_name("restaurant", &draft.restaurant)?;
    if !restaurants.contains(&restaurant) {
        return Err(ValidationError::NotAllowed {
            field: "restaurant".to_string(),
            allowed: restaurants.names().to_vec(),
        });
    }

    let airline = validate_name("airline", &draft.airline)?;
    if !airlines.contains(&airline) {
        return Err(ValidationError::NotAllowed {
            field: "airline".to_string(),
            allowed: airlines.iter().map(|(name, _)| name.to_string()).collect(),
        });
    }

    validate_subtotal(draft.subtotal)
}

// =============================================================================
// Unit Tests
// =============================================================================
