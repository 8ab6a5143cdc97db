//! # Coupon Table & Validator
//!
//! Fixed-amount promotional coupons and the rules for applying them.
//!
//! ## Coupon Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Coupon Lifecycle                                  │
//! │                                                                         │
//! │  "Apply GPAY" ──► validator.apply() ──┬── AlreadyApplied (one active    │
//! │                                       │   coupon max; original kept)    │
//! │                                       ├── UnknownCode (not in table)    │
//! │                                       ├── ExceedsSubtotal               │
//! │                                       └── Ok(AppliedCoupon)             │
//! │                                                                         │
//! │  any line mutation ──► validator.revalidate() ──┬── Unchanged           │
//! │                                                 └── Invalidated(coupon) │
//! │                                                     (discount grew      │
//! │                                                      past subtotal;     │
//! │                                                      user is notified)  │
//! │                                                                         │
//! │  "Remove" ──► validator.remove() ── always succeeds, even when no       │
//! │                                     coupon is active                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policy
//! One coupon per cart, fixed discount amount, codes matched
//! case-insensitively against a static table. The discount may equal the
//! subtotal but never exceed it.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CouponError, CouponResult};
use crate::money::Money;

// =============================================================================
// Coupon & Coupon Table
// =============================================================================

/// A promotional coupon: a fixed discount identified by a code.
///
/// Immutable; drawn from a static table, never user-created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique code, matched case-insensitively.
    pub code: String,

    /// Fixed discount in paise. Always positive.
    pub discount_paise: i64,
}

impl Coupon {
    /// Creates a coupon with the given code and discount.
    pub fn new(code: impl Into<String>, discount: Money) -> Self {
        Coupon {
            code: code.into(),
            discount_paise: discount.paise(),
        }
    }

    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_paise(self.discount_paise)
    }
}

/// The static coupon table.
///
/// An ordered set of coupons. The table itself is not mutable through the
/// cart engine; deployments construct it once and hand it to the
/// validator.
#[derive(Debug, Clone, Default)]
pub struct CouponTable {
    coupons: Vec<Coupon>,
}

impl CouponTable {
    /// Creates a table from an ordered list of coupons.
    pub fn new(coupons: Vec<Coupon>) -> Self {
        CouponTable { coupons }
    }

    /// The built-in production coupon set.
    ///
    /// ## Codes
    /// - `TRYNEW`  — ₹100 off
    /// - `GPAY`    — ₹50 off
    /// - `NEWUSER` — ₹150 off
    pub fn builtin() -> Self {
        CouponTable::new(vec![
            Coupon::new("TRYNEW", Money::from_rupees(100)),
            Coupon::new("GPAY", Money::from_rupees(50)),
            Coupon::new("NEWUSER", Money::from_rupees(150)),
        ])
    }

    /// Looks up a coupon by code, case-insensitively.
    pub fn lookup(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim();
        self.coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Returns the number of coupons in the table.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Checks if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

// =============================================================================
// Applied Coupon State
// =============================================================================

/// The coupon currently active on a cart.
///
/// At most one exists per cart. It records the code and discount at
/// apply-time; removed automatically if it becomes invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    /// The table code this state was created from.
    pub code: String,

    /// Fixed discount in paise.
    pub discount_paise: i64,
}

impl AppliedCoupon {
    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_paise(self.discount_paise)
    }
}

impl From<&Coupon> for AppliedCoupon {
    fn from(coupon: &Coupon) -> Self {
        AppliedCoupon {
            code: coupon.code.clone(),
            discount_paise: coupon.discount_paise,
        }
    }
}

// =============================================================================
// Coupon Validator
// =============================================================================

/// Result of re-checking the applied coupon after a cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Revalidation {
    /// The coupon (or the absence of one) is still valid.
    Unchanged,

    /// The coupon was dropped because its discount now exceeds the
    /// subtotal. Carries the dropped coupon so the caller can tell the
    /// user what disappeared.
    Invalidated(AppliedCoupon),
}

/// Applies, removes, and re-validates coupons against cart state.
///
/// Owns the two coupon invariants:
/// - at most one applied coupon per cart
/// - `discount <= subtotal` at all times
#[derive(Debug, Clone)]
pub struct CouponValidator {
    table: CouponTable,
}

impl CouponValidator {
    /// Creates a validator over the given coupon table.
    pub fn new(table: CouponTable) -> Self {
        CouponValidator { table }
    }

    /// Returns the underlying coupon table.
    pub fn table(&self) -> &CouponTable {
        &self.table
    }

    /// Applies a coupon code to the cart.
    ///
    /// ## Errors
    /// - [`CouponError::AlreadyApplied`] — a coupon is active; the caller
    ///   must remove it first. The active coupon is left intact.
    /// - [`CouponError::UnknownCode`] — the code is not in the table.
    /// - [`CouponError::ExceedsSubtotal`] — the discount is greater than
    ///   the cart's current subtotal (equal is allowed).
    pub fn apply(&self, cart: &mut Cart, code: &str) -> CouponResult<AppliedCoupon> {
        if let Some(active) = &cart.applied_coupon {
            return Err(CouponError::AlreadyApplied {
                code: active.code.clone(),
            });
        }

        let coupon = self
            .table
            .lookup(code)
            .ok_or_else(|| CouponError::UnknownCode {
                code: code.trim().to_string(),
            })?;

        let subtotal = cart.subtotal();
        if coupon.discount() > subtotal {
            return Err(CouponError::ExceedsSubtotal {
                discount: coupon.discount(),
                subtotal,
            });
        }

        let applied = AppliedCoupon::from(coupon);
        cart.applied_coupon = Some(applied.clone());
        Ok(applied)
    }

    /// Removes the applied coupon unconditionally.
    ///
    /// Returns the removed coupon, or `None` if none was active (a no-op,
    /// not an error).
    pub fn remove(&self, cart: &mut Cart) -> Option<AppliedCoupon> {
        cart.applied_coupon.take()
    }

    /// Re-checks the applied coupon after a line mutation.
    ///
    /// If the discount now exceeds the recomputed subtotal, the coupon is
    /// cleared and [`Revalidation::Invalidated`] is returned so the caller
    /// can surface a user-visible notice. Otherwise the cart is unchanged.
    pub fn revalidate(&self, cart: &mut Cart) -> Revalidation {
        let subtotal = cart.subtotal();
        match cart.applied_coupon.take() {
            Some(active) if active.discount() > subtotal => Revalidation::Invalidated(active),
            still_valid => {
                cart.applied_coupon = still_valid;
                Revalidation::Unchanged
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::Utc;

    fn test_product(id: &str, price_paise: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: None,
            image_url: None,
            price_paise,
            stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_with_subtotal(paise: i64) -> Cart {
        let mut cart = Cart::new("user-1");
        cart.add_line(&test_product("1", paise), 1).unwrap();
        cart
    }

    fn validator() -> CouponValidator {
        CouponValidator::new(CouponTable::builtin())
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CouponTable::builtin();
        assert!(table.lookup("gpay").is_some());
        assert!(table.lookup("Gpay").is_some());
        assert!(table.lookup("  GPAY  ").is_some());
        assert!(table.lookup("BOGUS").is_none());
    }

    #[test]
    fn test_apply_success() {
        let mut cart = cart_with_subtotal(10_000); // ₹100
        let applied = validator().apply(&mut cart, "gpay").unwrap();

        assert_eq!(applied.code, "GPAY");
        assert_eq!(applied.discount(), Money::from_rupees(50));
        assert_eq!(cart.applied_coupon, Some(applied));
    }

    #[test]
    fn test_apply_unknown_code() {
        let mut cart = cart_with_subtotal(10_000);
        let err = validator().apply(&mut cart, "BOGUS").unwrap_err();

        assert!(matches!(err, CouponError::UnknownCode { .. }));
        assert!(cart.applied_coupon.is_none()); // cart unchanged
    }

    #[test]
    fn test_apply_twice_keeps_original() {
        let mut cart = cart_with_subtotal(20_000); // ₹200
        let v = validator();

        v.apply(&mut cart, "GPAY").unwrap();
        let err = v.apply(&mut cart, "TRYNEW").unwrap_err();

        assert!(matches!(err, CouponError::AlreadyApplied { .. }));
        assert_eq!(cart.applied_coupon.as_ref().unwrap().code, "GPAY");
    }

    #[test]
    fn test_apply_exceeding_subtotal_rejected() {
        let mut cart = cart_with_subtotal(4000); // ₹40 < ₹50 discount
        let err = validator().apply(&mut cart, "GPAY").unwrap_err();

        assert!(matches!(err, CouponError::ExceedsSubtotal { .. }));
        assert!(cart.applied_coupon.is_none());
    }

    #[test]
    fn test_apply_discount_equal_to_subtotal_allowed() {
        let mut cart = cart_with_subtotal(5000); // exactly ₹50
        assert!(validator().apply(&mut cart, "GPAY").is_ok());
    }

    #[test]
    fn test_apply_on_empty_cart_rejected() {
        let mut cart = Cart::new("user-1"); // subtotal 0 < any discount
        let err = validator().apply(&mut cart, "GPAY").unwrap_err();
        assert!(matches!(err, CouponError::ExceedsSubtotal { .. }));
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut cart = cart_with_subtotal(10_000);
        let v = validator();

        assert!(v.remove(&mut cart).is_none()); // nothing applied: no-op

        v.apply(&mut cart, "GPAY").unwrap();
        let removed = v.remove(&mut cart).unwrap();
        assert_eq!(removed.code, "GPAY");
        assert!(cart.applied_coupon.is_none());
    }

    #[test]
    fn test_revalidate_keeps_coupon_at_equality() {
        let mut cart = Cart::new("user-1");
        cart.add_line(&test_product("1", 5000), 2).unwrap(); // ₹100
        let v = validator();
        v.apply(&mut cart, "GPAY").unwrap();

        cart.update_quantity("1", 1).unwrap(); // subtotal ₹50 == discount
        assert_eq!(v.revalidate(&mut cart), Revalidation::Unchanged);
        assert!(cart.applied_coupon.is_some());
    }

    #[test]
    fn test_revalidate_drops_coupon_below_discount() {
        let mut cart = Cart::new("user-1");
        cart.add_line(&test_product("1", 5000), 2).unwrap(); // ₹100
        let v = validator();
        v.apply(&mut cart, "GPAY").unwrap();

        cart.update_quantity("1", 0).unwrap(); // subtotal 0 < ₹50
        match v.revalidate(&mut cart) {
            Revalidation::Invalidated(dropped) => assert_eq!(dropped.code, "GPAY"),
            other => panic!("expected invalidation, got {:?}", other),
        }
        assert!(cart.applied_coupon.is_none());
    }

    #[test]
    fn test_revalidate_without_coupon_is_unchanged() {
        let mut cart = cart_with_subtotal(1000);
        assert_eq!(validator().revalidate(&mut cart), Revalidation::Unchanged);
    }
}
