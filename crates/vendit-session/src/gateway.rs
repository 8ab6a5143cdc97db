//! # Cart Sync Gateway
//!
//! Bridges the in-memory cart and the persisted per-user record.
//!
//! ## Load/Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Sync Gateway                                 │
//! │                                                                         │
//! │  load(user_id)                                                          │
//! │    1. Fetch persisted record (missing → empty cart)                     │
//! │    2. Bulk-fetch the referenced products from the catalog               │
//! │    3. Merge: stored {productId, quantity, price} + live {name, image}   │
//! │    4. Lines whose product no longer resolves are DROPPED with a         │
//! │       warning — never a crash                                           │
//! │                                                                         │
//! │  save(cart)                                                             │
//! │    1. Project lines to the stored shape + recomputed subtotal           │
//! │    2. Overwrite the whole record (full replace, no patch)               │
//! │    3. On failure: retry once, then surface a recoverable error          │
//! │                                                                         │
//! │  subscribe_to_cart_count(user_id)                                       │
//! │    Push channel with the total item quantity, for badge displays        │
//! │    outside the core. Not required for correctness.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use vendit_core::{Cart, CartLine, MAX_ITEM_QUANTITY};
use vendit_db::{CartRecord, Database, StoredCartLine};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Gateway
// =============================================================================

/// Loads and saves per-user cart records, merging persisted line data with
/// live catalog data.
///
/// Stateless apart from the cart-count channels; safe to share behind an
/// `Arc` between the reconciler and display surfaces.
#[derive(Debug)]
pub struct CartSyncGateway {
    db: Database,

    /// One count channel per user, created lazily on first subscription
    /// or publish.
    counts: Mutex<HashMap<String, watch::Sender<i64>>>,
}

impl CartSyncGateway {
    /// Creates a gateway over the given database handle.
    pub fn new(db: Database) -> Self {
        CartSyncGateway {
            db,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the persisted cart for a user.
    ///
    /// Missing record → an empty cart for that user. Persisted lines are
    /// re-resolved against the current catalog for display fields; lines
    /// whose product no longer resolves (or whose stored quantity is
    /// invalid) are dropped with a warning.
    pub async fn load(&self, user_id: &str) -> SessionResult<Cart> {
        let record = self.db.carts().get(user_id).await?;

        let Some(record) = record else {
            debug!(user_id = %user_id, "No persisted cart; starting empty");
            let cart = Cart::new(user_id);
            self.publish_count(user_id, 0);
            return Ok(cart);
        };

        // One catalog round trip for all lines.
        let ids: Vec<String> = record.items.iter().map(|i| i.product_id.clone()).collect();
        let products = self.db.products().get_many(&ids).await?;
        let by_id: HashMap<&str, &vendit_core::Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut cart = Cart::new(user_id);
        for stored in &record.items {
            let Some(product) = by_id.get(stored.product_id.as_str()) else {
                warn!(
                    user_id = %user_id,
                    product_id = %stored.product_id,
                    "Dropping persisted cart line; product no longer in catalog"
                );
                continue;
            };

            if stored.quantity < 1 {
                warn!(
                    user_id = %user_id,
                    product_id = %stored.product_id,
                    quantity = stored.quantity,
                    "Dropping persisted cart line with invalid quantity"
                );
                continue;
            }

            let quantity = stored.quantity.min(MAX_ITEM_QUANTITY);
            cart.lines.push(CartLine {
                product_id: stored.product_id.clone(),
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                // The persisted snapshot wins over the live catalog price
                unit_price_paise: stored.price,
                quantity,
                added_at: record.updated_at,
            });
        }

        debug!(
            user_id = %user_id,
            persisted = record.items.len(),
            loaded = cart.line_count(),
            "Loaded persisted cart"
        );

        self.publish_count(user_id, cart.total_quantity());
        Ok(cart)
    }

    /// Writes the full line list and recomputed subtotal for the cart's
    /// owner, replacing any existing record.
    ///
    /// A failed write is retried once; if it still fails the error is
    /// returned as recoverable ([`SessionError::Persistence`]) and the
    /// in-memory cart is untouched.
    pub async fn save(&self, cart: &Cart) -> SessionResult<()> {
        let record = CartRecord {
            user_id: cart.owner_user_id.clone(),
            items: cart
                .lines
                .iter()
                .map(|l| StoredCartLine {
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                    price: l.unit_price_paise,
                })
                .collect(),
            total_price: cart.subtotal().paise(),
            updated_at: Utc::now(),
        };

        let repo = self.db.carts();
        if let Err(first) = repo.upsert(&record).await {
            warn!(
                user_id = %record.user_id,
                error = %first,
                "Cart save failed; retrying once"
            );

            if let Err(second) = repo.upsert(&record).await {
                return Err(SessionError::Persistence {
                    message: second.to_string(),
                });
            }
        }

        self.publish_count(&record.user_id, cart.total_quantity());
        Ok(())
    }

    /// Subscribes to the total item quantity of a user's cart.
    ///
    /// The channel starts at the last published count (0 if none yet) and
    /// receives a new value after every load and successful save. Used by
    /// display surfaces (e.g., the nav-bar badge); not required for
    /// correctness of the cart itself.
    pub fn subscribe_to_cart_count(&self, user_id: &str) -> watch::Receiver<i64> {
        let mut counts = self.counts.lock().expect("count map mutex poisoned");
        counts
            .entry(user_id.to_string())
            .or_insert_with(|| watch::channel(0).0)
            .subscribe()
    }

    fn publish_count(&self, user_id: &str, count: i64) {
        let mut counts = self.counts.lock().expect("count map mutex poisoned");
        let sender = counts
            .entry(user_id.to_string())
            .or_insert_with(|| watch::channel(0).0);
        // send_replace delivers even when no subscriber exists yet
        sender.send_replace(count);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
