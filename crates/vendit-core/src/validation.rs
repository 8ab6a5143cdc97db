//! # Validation Module
//!
//! Input validation at the session boundary, before business logic runs.
//!
//! The cart operations enforce their own invariants (quantity caps, line
//! uniqueness); these helpers catch malformed caller input early so the
//! errors point at the offending field instead of a failed mutation.

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be at least 1 (quantity 0 is expressed as removal, not as input)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ## Example
/// ```rust
/// use vendit_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(100_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
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

    Ok(())
}

/// Validates a user identifier from the identity service.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Maximum 64 characters
///
/// ## Returns
/// The trimmed id.
pub fn validate_user_id(user_id: &str) -> ValidationResult<String> {
    let user_id = user_id.trim();

    if user_id.is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }

    if user_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "user_id".to_string(),
            max: 64,
        });
    }

    Ok(user_id.to_string())
}
