//! # vendit-core: Pure Business Logic for Vendit
//!
//! This crate is the **heart** of the Vendit cart engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendit Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation Surfaces (thin consumers)            │   │
//! │  │     Product grid ──► Cart screen ──► Payment hand-off           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  vendit-session (reconciler)                    │   │
//! │  │     session state machine, mutation serialization, saves        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │  coupon   │  │  pricing  │  │   │
//! │  │   │   Money   │  │   Cart    │  │  Table +  │  │  Price    │  │   │
//! │  │   │  (paise)  │  │ CartLine  │  │ Validator │  │  Summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   vendit-db (persistence)                       │   │
//! │  │        SQLite catalog + per-user persisted cart records         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Catalog types (Product)
//! - [`cart`] - Cart and CartLine with the pure line mutations
//! - [`coupon`] - Static coupon table, validator, revalidation signal
//! - [`pricing`] - Price summary computation
//! - [`validation`] - Input validation at the session boundary
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vendit_core::Money` instead of
// `use vendit_core::money::Money`

pub use cart::{Cart, CartLine};
pub use coupon::{AppliedCoupon, Coupon, CouponTable, CouponValidator, Revalidation};
pub use error::{CartError, CouponError, ValidationError};
pub use money::Money;
pub use pricing::{compute_summary, PriceSummary};
pub use types::Product;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed platform fee added to every checkout regardless of cart contents.
///
/// Applied by the pricing engine as the last step, so the final total is
/// never below this amount.
pub const PLATFORM_FEE: Money = Money::from_rupees(8);

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps persisted records small.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10)
/// well before a vending machine could dispense it.
pub const MAX_ITEM_QUANTITY: i64 = 99;
