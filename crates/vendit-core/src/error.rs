//! # Error Types
//!
//! Domain-specific error types for vendit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendit-core errors (this file)                                        │
//! │  ├── CartError        - Cart line mutation failures                    │
//! │  ├── CouponError      - Coupon application failures                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendit-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vendit-session errors (separate crate)                                │
//! │  └── SessionError     - What presentation surfaces see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CartError → SessionError → UI                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, product id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Cart Error
// =============================================================================

/// Cart line mutation errors.
///
/// These represent business rule violations raised while editing the line
/// items of a cart. They are returned synchronously to the caller.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line exists for the given product.
    ///
    /// ## When This Occurs
    /// - `update_quantity` targets a product that is not in the cart
    /// - Usually a client-side state desync; the reconciler downgrades it
    ///   to a logged warning rather than failing the request
    #[error("No cart line for product: {product_id}")]
    LineNotFound { product_id: String },

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Coupon Error
// =============================================================================

/// Coupon application errors.
///
/// Returned synchronously from the coupon validator so the presentation
/// surface can show an inline message; never silently swallowed.
#[derive(Debug, Error)]
pub enum CouponError {
    /// A coupon is already active on this cart.
    ///
    /// Only one coupon is permitted at a time; the caller must remove the
    /// active one first. The active coupon is left intact.
    #[error("Coupon '{code}' is already applied; remove it first")]
    AlreadyApplied { code: String },

    /// The code does not exist in the coupon table.
    ///
    /// Matching is case-insensitive, so this is a genuine unknown code,
    /// not a casing mismatch.
    #[error("Unknown coupon code: '{code}'")]
    UnknownCode { code: String },

    /// The coupon's discount is larger than the cart's current subtotal.
    #[error("Coupon discount {discount} exceeds cart subtotal {subtotal}")]
    ExceedsSubtotal { discount: Money, subtotal: Money },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
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
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

/// Convenience type alias for Results with CouponError.
pub type CouponResult<T> = Result<T, CouponError>;

// =============================================================================
// Unit Tests
// =============================================================================
