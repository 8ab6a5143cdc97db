//! # Cart Reconciler
//!
//! Owns the one authoritative in-memory cart for an active user session.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart Session Lifecycle                              │
//! │                                                                         │
//! │               session established          load complete                │
//! │  ┌──────────┐ (identity service) ┌─────────┐          ┌─────────┐      │
//! │  │ Unloaded │ ──────────────────►│ Loading │ ────────►│  Ready  │      │
//! │  └──────────┘                    └─────────┘          └────┬────┘      │
//! │       ▲                                                    │           │
//! │       └────────────────── session ended (logout) ──────────┘           │
//! │                                                                         │
//! │  Ready is the ONLY state that accepts mutations. Anything earlier is   │
//! │  rejected with NotReady — an explicit answer, not silent data loss.    │
//! │                                                                         │
//! │  Every successful mutation:                                            │
//! │    1. edits the in-memory cart (serialized behind an async mutex)      │
//! │    2. re-validates the applied coupon (may raise an invalidation       │
//! │       notice for the user)                                             │
//! │    3. recomputes the price summary                                     │
//! │    4. enqueues an asynchronous full-record save                        │
//! │                                                                         │
//! │  Saves drain in order through a background task. checkout() flushes    │
//! │  the queue before handing the final amount to the payment gateway.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One `CartSession` is constructed per active session and handed by
//! `Arc` to whatever surfaces need it. There is no ambient singleton.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};

use vendit_core::{
    validation, AppliedCoupon, Cart, CartError, CartLine, CouponTable, CouponValidator, Money,
    PriceSummary, Product, Revalidation,
};

use crate::error::{SessionError, SessionResult};
use crate::gateway::CartSyncGateway;

// =============================================================================
// Views & Outcomes
// =============================================================================

/// Snapshot of the cart handed to presentation surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub applied_coupon: Option<AppliedCoupon>,
    pub summary: PriceSummary,
}

impl CartView {
    fn of(cart: &Cart, summary: PriceSummary) -> Self {
        CartView {
            lines: cart.lines.clone(),
            applied_coupon: cart.applied_coupon.clone(),
            summary,
        }
    }
}

/// Result of a successful line mutation.
///
/// `coupon_invalidated` carries the coupon that was auto-removed because
/// the mutation pushed the subtotal below its discount. It accompanies an
/// otherwise-successful mutation and must be surfaced to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub view: CartView,
    pub coupon_invalidated: Option<AppliedCoupon>,
}

/// Status of the most recent persisted write.
///
/// Exposed through a watch channel so surfaces can show a non-blocking
/// "your cart may not be saved" warning without polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// No write attempted yet this session.
    Idle,
    /// The last write completed.
    Saved,
    /// The last write failed after its retry; the in-memory cart is intact.
    Failed(String),
}

/// Notifications from the identity service.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user signed in; their persisted cart should be loaded.
    Established { user_id: String },
    /// The user signed out; the session returns to Unloaded.
    Ended,
}

// =============================================================================
// Internal State
// =============================================================================

enum SessionState {
    Unloaded,
    Loading,
    Ready(Cart),
}

enum PersistJob {
    /// Write this cart snapshot (full record replace).
    Save(Cart),
    /// Report the status of the last write once the queue is drained.
    Flush(oneshot::Sender<SaveStatus>),
}

// =============================================================================
// Cart Session
// =============================================================================

/// The cart reconciler for one user session.
///
/// Mutations are serialized: each one is processed to completion against
/// the in-memory state before the next is accepted. Persistence is
/// fire-and-forget from the caller's perspective; only `checkout` waits
/// for the write queue to drain.
pub struct CartSession {
    gateway: Arc<CartSyncGateway>,
    validator: CouponValidator,
    platform_fee: Money,
    state: Mutex<SessionState>,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
    save_status_rx: watch::Receiver<SaveStatus>,
}

impl CartSession {
    /// Creates a session over the given gateway, coupon table and fee.
    ///
    /// Spawns the background saver task that drains the persistence queue
    /// in order. The task exits when the session is dropped.
    pub fn new(gateway: Arc<CartSyncGateway>, coupons: CouponTable, platform_fee: Money) -> Self {
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let (status_tx, save_status_rx) = watch::channel(SaveStatus::Idle);

        tokio::spawn(run_saver(gateway.clone(), persist_rx, status_tx));

        CartSession {
            gateway,
            validator: CouponValidator::new(coupons),
            platform_fee,
            state: Mutex::new(SessionState::Unloaded),
            persist_tx,
            save_status_rx,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Handles a notification from the identity service.
    pub async fn handle_session_event(&self, event: SessionEvent) -> SessionResult<()> {
        match event {
            SessionEvent::Established { user_id } => {
                self.establish(&user_id).await?;
                Ok(())
            }
            SessionEvent::Ended => self.reset().await,
        }
    }

    /// Transitions the session into Ready for the given user.
    ///
    /// The gateway `load` runs exactly once per transition into Ready.
    /// Re-establishing while Ready for the same user returns the current
    /// view without reloading; a different user flushes pending writes
    /// and loads fresh.
    pub async fn establish(&self, user_id: &str) -> SessionResult<CartView> {
        let user_id = validation::validate_user_id(user_id)?;

        {
            let mut state = self.state.lock().await;
            match &*state {
                SessionState::Loading => return Err(SessionError::NotReady),
                SessionState::Ready(cart) if cart.owner_user_id == user_id => {
                    debug!(user_id = %user_id, "Session already established");
                    return Ok(self.view_of(cart));
                }
                SessionState::Ready(cart) => {
                    info!(
                        from = %cart.owner_user_id,
                        to = %user_id,
                        "Switching session user"
                    );
                }
                SessionState::Unloaded => {}
            }
            *state = SessionState::Loading;
        }

        // Writes queued for a previous user drain before the new load.
        self.flush().await;

        info!(user_id = %user_id, "Loading persisted cart");
        let cart = match self.gateway.load(&user_id).await {
            Ok(cart) => cart,
            Err(err) => {
                let mut state = self.state.lock().await;
                *state = SessionState::Unloaded;
                return Err(err);
            }
        };

        let mut state = self.state.lock().await;
        let view = self.view_of(&cart);
        *state = SessionState::Ready(cart);
        Ok(view)
    }

    /// Returns the session to Unloaded (logout), flushing pending writes
    /// first so nothing queued for the signed-out user is lost.
    pub async fn reset(&self) -> SessionResult<()> {
        self.flush().await;

        let mut state = self.state.lock().await;
        *state = SessionState::Unloaded;
        debug!("Session reset to Unloaded");
        Ok(())
    }

    /// Current cart snapshot with totals.
    pub async fn view(&self) -> SessionResult<CartView> {
        let state = self.state.lock().await;
        match &*state {
            SessionState::Ready(cart) => Ok(self.view_of(cart)),
            _ => Err(SessionError::NotReady),
        }
    }

    /// Watch channel with the status of the most recent persisted write.
    ///
    /// Surfaces use this for the non-blocking "cart may not be saved"
    /// warning; a failed save never interrupts shopping.
    pub fn save_status(&self) -> watch::Receiver<SaveStatus> {
        self.save_status_rx.clone()
    }

    // -------------------------------------------------------------------------
    // Line Mutations
    // -------------------------------------------------------------------------

    /// Adds a product to the cart (merging quantity if already present).
    ///
    /// The unit price is frozen at this moment. Out-of-stock gating is a
    /// caller-level precondition ([`Product::in_stock`]); the reconciler
    /// does not re-check stock.
    pub async fn add_item(&self, product: &Product, quantity: i64) -> SessionResult<MutationOutcome> {
        validation::validate_quantity(quantity)?;
        debug!(product_id = %product.id, quantity, "add_item");

        self.mutate(|cart| {
            cart.add_line(product, quantity)?;
            Ok(true)
        })
        .await
    }

    /// Sets a line's quantity to an absolute value (`< 1` removes it).
    ///
    /// A missing line is a client-side desync: it is logged and treated
    /// as a no-op, not an error.
    pub async fn update_quantity(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> SessionResult<MutationOutcome> {
        debug!(product_id = %product_id, quantity, "update_quantity");

        self.mutate(|cart| match cart.update_quantity(product_id, quantity) {
            Ok(()) => Ok(true),
            Err(CartError::LineNotFound { product_id }) => {
                warn!(
                    product_id = %product_id,
                    "update_quantity for a line not in the cart; ignoring (client desync)"
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        })
        .await
    }

    /// Removes a line (no-op when absent).
    pub async fn remove_item(&self, product_id: &str) -> SessionResult<MutationOutcome> {
        debug!(product_id = %product_id, "remove_item");

        self.mutate(|cart| Ok(cart.remove_line(product_id))).await
    }

    /// Empties the cart (lines and coupon) and persists the empty record.
    ///
    /// Used by "cancel order" and by the payment surface after a
    /// completed checkout.
    pub async fn clear(&self) -> SessionResult<MutationOutcome> {
        debug!("clear cart");

        self.mutate(|cart| {
            cart.clear();
            Ok(true)
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Coupons
    // -------------------------------------------------------------------------

    /// Applies a coupon code to the cart.
    ///
    /// Validation failures (already applied / unknown code / exceeds
    /// subtotal) come back synchronously for inline display. Coupon state
    /// is not part of the persisted record, so no save is queued.
    pub async fn apply_coupon(&self, code: &str) -> SessionResult<CartView> {
        let mut state = self.state.lock().await;
        let SessionState::Ready(cart) = &mut *state else {
            return Err(SessionError::NotReady);
        };

        let applied = self.validator.apply(cart, code)?;
        info!(code = %applied.code, discount = %applied.discount(), "Coupon applied");
        Ok(self.view_of(cart))
    }

    /// Removes the applied coupon; succeeds even when none is active.
    pub async fn remove_coupon(&self) -> SessionResult<CartView> {
        let mut state = self.state.lock().await;
        let SessionState::Ready(cart) = &mut *state else {
            return Err(SessionError::NotReady);
        };

        if let Some(removed) = self.validator.remove(cart) {
            debug!(code = %removed.code, "Coupon removed");
        }
        Ok(self.view_of(cart))
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Hands off to the payment gateway: returns the final amount.
    ///
    /// Awaits the persistence queue first — the hand-off is only
    /// permitted once the last write has completed. Fails with
    /// [`SessionError::EmptyCart`] on an empty cart and with
    /// [`SessionError::Persistence`] if the last write failed even after
    /// its retry (the user can retry checkout).
    ///
    /// The cart is left intact; the payment surface calls [`Self::clear`]
    /// once payment has gone through.
    pub async fn checkout(&self) -> SessionResult<Money> {
        let state = self.state.lock().await;
        let SessionState::Ready(cart) = &*state else {
            return Err(SessionError::NotReady);
        };

        if cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }

        let summary = PriceSummary::for_cart(cart, self.platform_fee);

        // Holding the state lock here also blocks new mutations from
        // sneaking in between the flush and the hand-off.
        if let SaveStatus::Failed(message) = self.flush().await {
            return Err(SessionError::Persistence { message });
        }

        info!(
            user_id = %cart.owner_user_id,
            amount = %summary.final_total,
            "Checkout hand-off"
        );
        Ok(summary.final_total)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Runs one serialized mutation: edit, revalidate coupon, recompute
    /// totals, queue a save when something changed.
    ///
    /// The closure returns whether the cart actually changed; no-op
    /// mutations skip the persisted write.
    async fn mutate<F>(&self, op: F) -> SessionResult<MutationOutcome>
    where
        F: FnOnce(&mut Cart) -> SessionResult<bool>,
    {
        let mut state = self.state.lock().await;
        let SessionState::Ready(cart) = &mut *state else {
            return Err(SessionError::NotReady);
        };

        let changed = op(cart)?;

        let coupon_invalidated = match self.validator.revalidate(cart) {
            Revalidation::Invalidated(dropped) => {
                info!(code = %dropped.code, "Coupon invalidated by cart mutation");
                Some(dropped)
            }
            Revalidation::Unchanged => None,
        };

        if changed {
            self.enqueue_save(cart.clone());
        }

        Ok(MutationOutcome {
            view: self.view_of(cart),
            coupon_invalidated,
        })
    }

    fn view_of(&self, cart: &Cart) -> CartView {
        CartView::of(cart, PriceSummary::for_cart(cart, self.platform_fee))
    }

    fn enqueue_save(&self, snapshot: Cart) {
        if self.persist_tx.send(PersistJob::Save(snapshot)).is_err() {
            // Saver task gone; cart stays correct in memory
            warn!("Persistence queue closed; cart changes kept in memory only");
        }
    }

    /// Waits until every queued write has been attempted, then returns
    /// the status of the last one.
    async fn flush(&self) -> SaveStatus {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.persist_tx.send(PersistJob::Flush(ack_tx)).is_err() {
            return self.save_status_rx.borrow().clone();
        }
        ack_rx
            .await
            .unwrap_or_else(|_| self.save_status_rx.borrow().clone())
    }
}

// =============================================================================
// Background Saver
// =============================================================================

/// Drains the persistence queue in order, one write at a time.
///
/// Retry policy lives in the gateway (`save` retries once); here a
/// failure is recorded and surfaced, never fatal — the in-memory cart is
/// the source of truth and the user may keep shopping.
async fn run_saver(
    gateway: Arc<CartSyncGateway>,
    mut jobs: mpsc::UnboundedReceiver<PersistJob>,
    status_tx: watch::Sender<SaveStatus>,
) {
    let mut last = SaveStatus::Idle;

    while let Some(job) = jobs.recv().await {
        match job {
            PersistJob::Save(cart) => {
                last = match gateway.save(&cart).await {
                    Ok(()) => SaveStatus::Saved,
                    Err(err) => {
                        error!(
                            user_id = %cart.owner_user_id,
                            error = %err,
                            "Cart save failed after retry; cart kept in memory"
                        );
                        SaveStatus::Failed(err.to_string())
                    }
                };
                status_tx.send_replace(last.clone());
            }
            PersistJob::Flush(ack) => {
                let _ = ack.send(last.clone());
            }
        }
    }

    debug!("Saver task shutting down");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vendit_core::{Coupon, PLATFORM_FEE};
    use vendit_db::{Database, DbConfig};

    fn test_product(id: &str, name: &str, price_paise: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            image_url: None,
            price_paise,
            stock: 10,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn coupons() -> CouponTable {
        CouponTable::new(vec![
            Coupon::new("SAVE50", Money::from_rupees(50)),
            Coupon::new("TRYNEW", Money::from_rupees(100)),
        ])
    }

    /// In-memory database with Milk (₹50) and Chips (₹20) seeded.
    async fn session() -> (CartSession, Arc<CartSyncGateway>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&test_product("p1", "Milk", 5000))
            .await
            .unwrap();
        db.products()
            .insert(&test_product("p2", "Chips", 2000))
            .await
            .unwrap();

        let gateway = Arc::new(CartSyncGateway::new(db));
        let session = CartSession::new(gateway.clone(), coupons(), PLATFORM_FEE);
        (session, gateway)
    }

    #[tokio::test]
    async fn test_mutations_rejected_before_establish() {
        let (session, _gw) = session().await;
        let milk = test_product("p1", "Milk", 5000);

        assert!(matches!(
            session.add_item(&milk, 1).await,
            Err(SessionError::NotReady)
        ));
        assert!(matches!(session.view().await, Err(SessionError::NotReady)));
        assert!(matches!(
            session.checkout().await,
            Err(SessionError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_establish_empty_cart() {
        let (session, _gw) = session().await;

        let view = session.establish("u-1").await.unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.summary.subtotal, Money::zero());
        assert_eq!(view.summary.final_total, PLATFORM_FEE);
    }

    #[tokio::test]
    async fn test_add_single_item_totals() {
        // Empty cart + ₹50 item: subtotal 50, discount 0, final 58
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();

        let outcome = session
            .add_item(&test_product("p1", "Milk", 5000), 1)
            .await
            .unwrap();

        let summary = outcome.view.summary;
        assert_eq!(summary.subtotal, Money::from_rupees(50));
        assert_eq!(summary.discount, Money::zero());
        assert_eq!(summary.final_total, Money::from_rupees(58));
        assert!(outcome.coupon_invalidated.is_none());
    }

    #[tokio::test]
    async fn test_coupon_follows_quantity_changes() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        let milk = test_product("p1", "Milk", 5000);

        // qty 2 @ ₹50 (subtotal ₹100), apply SAVE50: 100 - 50 + 8 = 58
        session.add_item(&milk, 2).await.unwrap();
        let view = session.apply_coupon("SAVE50").await.unwrap();
        assert_eq!(view.summary.final_total, Money::from_rupees(58));

        // qty → 1: subtotal ₹50 == discount, coupon stays: 50 - 50 + 8 = 8
        let outcome = session.update_quantity("p1", 1).await.unwrap();
        assert!(outcome.coupon_invalidated.is_none());
        assert!(outcome.view.applied_coupon.is_some());
        assert_eq!(outcome.view.summary.final_total, Money::from_rupees(8));

        // qty → 0: line removed, subtotal 0 < 50, coupon dropped with notice
        let outcome = session.update_quantity("p1", 0).await.unwrap();
        let dropped = outcome.coupon_invalidated.expect("coupon should drop");
        assert_eq!(dropped.code, "SAVE50");
        assert!(outcome.view.applied_coupon.is_none());
        assert!(outcome.view.lines.is_empty());
        assert_eq!(outcome.view.summary.final_total, PLATFORM_FEE);
    }

    #[tokio::test]
    async fn test_apply_unknown_coupon_leaves_cart_unchanged() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 2)
            .await
            .unwrap();

        let err = session.apply_coupon("BOGUS").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Coupon(vendit_core::CouponError::UnknownCode { .. })
        ));

        let view = session.view().await.unwrap();
        assert!(view.applied_coupon.is_none());
        assert_eq!(view.summary.final_total, Money::from_rupees(108));
    }

    #[tokio::test]
    async fn test_second_coupon_rejected_and_original_kept() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 3)
            .await
            .unwrap();

        session.apply_coupon("SAVE50").await.unwrap();
        let err = session.apply_coupon("TRYNEW").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Coupon(vendit_core::CouponError::AlreadyApplied { .. })
        ));

        let view = session.view().await.unwrap();
        assert_eq!(view.applied_coupon.unwrap().code, "SAVE50");
    }

    #[tokio::test]
    async fn test_remove_coupon_is_unconditional() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();

        // No coupon active: still succeeds
        let view = session.remove_coupon().await.unwrap();
        assert!(view.applied_coupon.is_none());
    }

    #[tokio::test]
    async fn test_update_quantity_missing_line_is_logged_noop() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 1)
            .await
            .unwrap();

        let outcome = session.update_quantity("ghost", 4).await.unwrap();
        assert_eq!(outcome.view.lines.len(), 1);
        assert_eq!(outcome.view.summary.subtotal, Money::from_rupees(50));
    }

    #[tokio::test]
    async fn test_remove_item_absent_is_noop() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();

        let outcome = session.remove_item("ghost").await.unwrap();
        assert!(outcome.view.lines.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_awaits_persistence_and_returns_final_amount() {
        let (session, gateway) = session().await;
        session.establish("u-1").await.unwrap();

        session
            .add_item(&test_product("p1", "Milk", 5000), 1)
            .await
            .unwrap();

        let amount = session.checkout().await.unwrap();
        assert_eq!(amount, Money::from_rupees(58));

        // The write queue was drained before the hand-off, so a fresh
        // load sees the persisted line.
        let persisted = gateway.load("u-1").await.unwrap();
        assert_eq!(persisted.line_count(), 1);
        assert_eq!(persisted.subtotal(), Money::from_rupees(50));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_refused() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();

        assert!(matches!(
            session.checkout().await,
            Err(SessionError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_cart_survives_across_sessions() {
        let (session, gateway) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 2)
            .await
            .unwrap();
        session.reset().await.unwrap();

        // A later session for the same user loads the persisted cart,
        // with display fields re-resolved from the catalog.
        let session2 = CartSession::new(gateway, coupons(), PLATFORM_FEE);
        let view = session2.establish("u-1").await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].name, "Milk");
        assert_eq!(view.summary.subtotal, Money::from_rupees(100));
    }

    #[tokio::test]
    async fn test_establish_twice_loads_once() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 1)
            .await
            .unwrap();

        // Second establish for the same user must NOT reload (a reload
        // would resurrect the persisted state and drop in-memory edits
        // that are still in the save queue).
        let view = session.establish("u-1").await.unwrap();
        assert_eq!(view.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_empties_cart_and_record() {
        let (session, gateway) = session().await;
        session.establish("u-1").await.unwrap();
        session
            .add_item(&test_product("p1", "Milk", 5000), 2)
            .await
            .unwrap();
        session.apply_coupon("SAVE50").await.unwrap();

        let outcome = session.clear().await.unwrap();
        assert!(outcome.view.lines.is_empty());
        assert!(outcome.view.applied_coupon.is_none());
        assert_eq!(outcome.view.summary.final_total, PLATFORM_FEE);

        session.reset().await.unwrap(); // flush
        let persisted = gateway.load("u-1").await.unwrap();
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_subtotal_invariant_after_every_mutation() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();
        let milk = test_product("p1", "Milk", 5000);
        let chips = test_product("p2", "Chips", 2000);

        let check = |view: &CartView| {
            let expected: i64 = view
                .lines
                .iter()
                .map(|l| l.unit_price_paise * l.quantity)
                .sum();
            assert_eq!(view.summary.subtotal.paise(), expected);
            assert!(view.summary.discount <= view.summary.subtotal);
        };

        check(&session.add_item(&milk, 2).await.unwrap().view);
        check(&session.add_item(&chips, 5).await.unwrap().view);
        check(&session.update_quantity("p2", 1).await.unwrap().view);
        check(&session.remove_item("p1").await.unwrap().view);
        check(&session.update_quantity("p2", 0).await.unwrap().view);
    }

    #[tokio::test]
    async fn test_save_status_reports_success() {
        let (session, _gw) = session().await;
        session.establish("u-1").await.unwrap();

        let status = session.save_status();
        assert_eq!(*status.borrow(), SaveStatus::Idle);

        session
            .add_item(&test_product("p1", "Milk", 5000), 1)
            .await
            .unwrap();
        session.checkout().await.unwrap(); // drains the queue

        assert_eq!(*status.borrow(), SaveStatus::Saved);
    }

    #[tokio::test]
    async fn test_session_event_dispatch() {
        let (session, _gw) = session().await;

        session
            .handle_session_event(SessionEvent::Established {
                user_id: "u-1".to_string(),
            })
            .await
            .unwrap();
        assert!(session.view().await.is_ok());

        session
            .handle_session_event(SessionEvent::Ended)
            .await
            .unwrap();
        assert!(matches!(session.view().await, Err(SessionError::NotReady)));
    }
}
