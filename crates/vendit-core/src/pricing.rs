//! # Pricing Engine
//!
//! Pure computation of cart totals. No side effects, no I/O.
//!
//! ## Price Breakdown
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subtotal   = Σ (line unit-price snapshot × quantity)                   │
//! │  Discount   = min(applied coupon discount, subtotal)                    │
//! │  Final      = max(subtotal − discount, 0) + platform fee                │
//! │                                                                         │
//! │  Milk ₹50 × 2                        ₹100.00                            │
//! │  Coupon GPAY                        − ₹50.00                            │
//! │  Platform fee                        + ₹8.00                            │
//! │  ─────────────────────────────────────────────                          │
//! │  To pay                               ₹58.00                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine always returns a summary, including for an empty cart
//! (subtotal 0, discount 0, final total = platform fee). Suppressing
//! checkout for an empty cart is the caller's job.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::money::Money;

// =============================================================================
// Price Summary
// =============================================================================

/// Derived monetary totals for a cart. Never stored; recomputed from cart
/// state after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    /// Sum of line totals before discount and fees.
    pub subtotal: Money,

    /// Coupon discount actually granted (clamped to subtotal).
    pub discount: Money,

    /// Fixed per-checkout platform fee.
    pub platform_fee: Money,

    /// Amount presented to the payment gateway.
    /// Always >= `platform_fee`.
    pub final_total: Money,
}

impl PriceSummary {
    /// Computes the summary for a cart, taking the discount from its
    /// applied coupon (zero when none).
    pub fn for_cart(cart: &Cart, platform_fee: Money) -> Self {
        let discount = cart
            .applied_coupon
            .as_ref()
            .map(|c| c.discount())
            .unwrap_or_else(Money::zero);
        compute_summary(&cart.lines, discount, platform_fee)
    }
}

// =============================================================================
// Pricing Function
// =============================================================================

/// Computes subtotal, discount, and final total for a set of cart lines.
///
/// Pure function; always returns a value.
///
/// The discount is defensively clamped to the subtotal here even though
/// the coupon validator enforces `discount <= subtotal` before this runs.
///
/// ## Example
/// ```rust
/// use vendit_core::money::Money;
/// use vendit_core::pricing::compute_summary;
///
/// let summary = compute_summary(&[], Money::zero(), Money::from_rupees(8));
/// assert_eq!(summary.final_total, Money::from_rupees(8));
/// ```
pub fn compute_summary(
    lines: &[CartLine],
    applied_discount: Money,
    platform_fee: Money,
) -> PriceSummary {
    let subtotal: Money = lines.iter().map(|l| l.line_total()).sum();
    let discount = applied_discount.min(subtotal);
    let final_total = subtotal.saturating_sub(discount) + platform_fee;

    PriceSummary {
        subtotal,
        discount,
        platform_fee,
        final_total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
