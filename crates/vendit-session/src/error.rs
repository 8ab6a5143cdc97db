//! # Session Error Type
//!
//! Unified error type for the cart session surface.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vendit                                 │
//! │                                                                         │
//! │  vendit-core: CartError / CouponError / ValidationError                │
//! │       │                                                                 │
//! │  vendit-db:   DbError                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SessionError (this module) ← what presentation surfaces display       │
//! │                                                                         │
//! │  Validation failures come back synchronously for inline messages.      │
//! │  Persistence failures are NON-FATAL: the in-memory cart is kept and    │
//! │  the user may keep shopping (their cart just may not be saved).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use vendit_core::{CartError, CouponError, ValidationError};
use vendit_db::DbError;

/// Errors returned from the cart session API.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session is not in the Ready state.
    ///
    /// ## When This Occurs
    /// - A mutation arrives before the session-established event
    /// - A mutation arrives while the persisted cart is still loading
    ///
    /// Mutations are rejected, never queued, so nothing is lost silently.
    #[error("Cart session is not ready")]
    NotReady,

    /// Checkout was requested on an empty cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// The persisted write failed even after its retry.
    ///
    /// The in-memory cart is preserved (not rolled back); the user may
    /// retry the action or keep shopping.
    #[error("Cart could not be saved: {message}")]
    Persistence { message: String },

    /// Coupon validation failure (shown inline to the user).
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Cart mutation failure.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database failure outside the save path (e.g., the initial load).
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Convenience type alias for Results with SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
