//! # Cart Model
//!
//! The per-user cart and its line items.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Line Operations                                 │
//! │                                                                         │
//! │  User Action              Operation              State Change           │
//! │  ───────────              ─────────              ────────────           │
//! │                                                                         │
//! │  Tap "+" on product ────► add_line() ──────────► merge or append line   │
//! │                                                                         │
//! │  Edit quantity ─────────► update_quantity() ───► line.quantity = n      │
//! │                           (n < 1 removes the line entirely)             │
//! │                                                                         │
//! │  Tap remove ────────────► remove_line() ───────► line deleted           │
//! │                           (no-op when absent)                           │
//! │                                                                         │
//! │  Cancel / post-payment ─► clear() ─────────────► lines + coupon gone    │
//! │                                                                         │
//! │  These are the PURE state transitions. Revalidation, pricing and        │
//! │  persistence are layered on top by the session reconciler.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coupon::AppliedCoupon;
use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in a cart.
///
/// ## Design Notes
/// - `product_id`: Reference to the catalog product
/// - `unit_price_paise`: Frozen copy of the price at the time of adding.
///   The cart keeps charging the price the user saw, even if the catalog
///   price changes afterwards.
/// - `name`/`image_url`: Display fields only. They are NOT persisted with
///   the cart record; the sync gateway re-resolves them from the live
///   catalog on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding / last load (display only)
    pub name: String,

    /// Product image at time of adding / last load (display only)
    pub image_url: Option<String>,

    /// Price in paise at time of adding (frozen)
    pub unit_price_paise: i64,

    /// Quantity in cart, always >= 1
    pub quantity: i64,

    /// When this line was added to the cart
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    ///
    /// ## Price Freezing
    /// The price is captured at this moment. If the product price changes
    /// in the catalog, this line retains the original price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            unit_price_paise: product.price_paise,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The per-user shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges
///   into the existing line)
/// - `quantity >= 1` on every line; a quantity that would drop below 1
///   removes the line instead
/// - At most one applied coupon
/// - Maximum distinct lines: [`MAX_CART_ITEMS`]
/// - Maximum quantity per line: [`MAX_ITEM_QUANTITY`]
///
/// The coupon field is managed by the coupon validator, which also owns
/// the `discount <= subtotal` invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// The user this cart belongs to. Exactly one cart per user.
    pub owner_user_id: String,

    /// Line items, in insertion order.
    pub lines: Vec<CartLine>,

    /// The active coupon, if any.
    pub applied_coupon: Option<AppliedCoupon>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for a user.
    pub fn new(owner_user_id: impl Into<String>) -> Self {
        Cart {
            owner_user_id: owner_user_id.into(),
            lines: Vec::new(),
            applied_coupon: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: increases quantity by `quantity`
    /// - If product not in cart: appends a new line with the price frozen
    ///   at `product.price_paise`
    ///
    /// Stock is NOT checked here; offering an out-of-stock product for
    /// adding is the caller's responsibility (see [`Product::in_stock`]).
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CartResult<()> {
        if quantity < 1 {
            return Err(CartError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                },
            ));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CartError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CartError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line's quantity to an absolute value.
    ///
    /// ## Behavior
    /// - `quantity < 1`: the line is removed (same contract as
    ///   [`Cart::remove_line`], including the no-op when absent)
    /// - Line missing: returns [`CartError::LineNotFound`]
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CartResult<()> {
        if quantity < 1 {
            self.remove_line(product_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
            Ok(())
        } else {
            Err(CartError::LineNotFound {
                product_id: product_id.to_string(),
            })
        }
    }

    /// Removes a line by product ID.
    ///
    /// Returns `true` if a line was removed. Removing an absent line is a
    /// no-op, not an error.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != initial_len
    }

    /// Clears all lines and the applied coupon.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.applied_coupon = None;
        self.created_at = Utc::now();
    }

    /// Checks whether a line exists for the given product.
    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }

    /// Returns the number of distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the subtotal (sum of line totals, before discount/fee).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_paise: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: None,
            image_url: Some(format!("/images/{}.png", id)),
            price_paise,
            stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 999);

        cart.add_line(&product, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().paise(), 1998);
    }

    #[test]
    fn test_add_same_product_merges_into_one_line() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 999);

        cart.add_line(&product, 2).unwrap();
        cart.add_line(&product, 3).unwrap();

        assert_eq!(cart.line_count(), 1); // product_id stays unique
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_freezes_price() {
        let mut cart = Cart::new("user-1");
        let mut product = test_product("1", 999);

        cart.add_line(&product, 1).unwrap();
        product.price_paise = 1299; // catalog price change after add

        assert_eq!(cart.lines[0].unit_price_paise, 999);
        assert_eq!(cart.subtotal().paise(), 999);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 999);

        assert!(matches!(
            cart.add_line(&product, 0),
            Err(CartError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_is_absolute() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 500);

        cart.add_line(&product, 2).unwrap();
        cart.update_quantity("1", 5).unwrap();

        assert_eq!(cart.total_quantity(), 5); // set, not incremented
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 500);

        cart.add_line(&product, 2).unwrap();
        cart.update_quantity("1", 0).unwrap();

        assert!(!cart.contains("1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_line_errors() {
        let mut cart = Cart::new("user-1");

        let err = cart.update_quantity("ghost", 3).unwrap_err();
        assert!(matches!(err, CartError::LineNotFound { .. }));
    }

    #[test]
    fn test_update_quantity_zero_on_missing_line_is_noop() {
        let mut cart = Cart::new("user-1");

        // < 1 follows the remove contract, which tolerates absent lines
        assert!(cart.update_quantity("ghost", 0).is_ok());
    }

    #[test]
    fn test_remove_line_absent_is_noop() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 500);

        cart.add_line(&product, 1).unwrap();

        assert!(cart.remove_line("1"));
        assert!(!cart.remove_line("1")); // second remove: no-op
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 500);

        cart.add_line(&product, MAX_ITEM_QUANTITY).unwrap();
        let err = cart.add_line(&product, 1).unwrap_err();
        assert!(matches!(err, CartError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_cart_size_cap() {
        let mut cart = Cart::new("user-1");
        for i in 0..MAX_CART_ITEMS {
            let product = test_product(&format!("p{}", i), 100);
            cart.add_line(&product, 1).unwrap();
        }

        let overflow = test_product("overflow", 100);
        let err = cart.add_line(&overflow, 1).unwrap_err();
        assert!(matches!(err, CartError::CartTooLarge { .. }));
    }

    #[test]
    fn test_subtotal_tracks_every_mutation() {
        let mut cart = Cart::new("user-1");
        let p1 = test_product("1", 5000);
        let p2 = test_product("2", 4000);

        cart.add_line(&p1, 2).unwrap();
        cart.add_line(&p2, 1).unwrap();
        assert_eq!(cart.subtotal().paise(), 14_000);

        cart.update_quantity("1", 1).unwrap();
        assert_eq!(cart.subtotal().paise(), 9000);

        cart.remove_line("2");
        assert_eq!(cart.subtotal().paise(), 5000);

        cart.clear();
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_clear_drops_coupon() {
        let mut cart = Cart::new("user-1");
        let product = test_product("1", 10_000);
        cart.add_line(&product, 1).unwrap();
        cart.applied_coupon = Some(AppliedCoupon {
            code: "GPAY".to_string(),
            discount_paise: 5000,
        });

        cart.clear();

        assert!(cart.applied_coupon.is_none());
        assert!(cart.is_empty());
    }
}
