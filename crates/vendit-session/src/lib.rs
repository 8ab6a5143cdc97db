//! # vendit-session: Cart Orchestration for Vendit
//!
//! The live cart engine for one signed-in user: an explicit session state
//! machine, serialized mutations, coupon revalidation, pricing, and
//! asynchronous persistence through the cart sync gateway.
//!
//! ## Module Organization
//! ```text
//! vendit_session/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── reconciler.rs   ◄─── CartSession: state machine + mutations
//! ├── gateway.rs      ◄─── CartSyncGateway: load/merge/save
//! └── error.rs        ◄─── SessionError for presentation surfaces
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./vendit.db")).await?;
//! let gateway = Arc::new(CartSyncGateway::new(db));
//! let session = CartSession::new(gateway, CouponTable::builtin(), PLATFORM_FEE);
//!
//! // Identity service says a user signed in:
//! session.establish("user-42").await?;
//!
//! // UI events:
//! session.add_item(&product, 1).await?;
//! session.apply_coupon("GPAY").await?;
//!
//! // Hand-off to the payment gateway:
//! let amount = session.checkout().await?;
//! ```

pub mod error;
pub mod gateway;
pub mod reconciler;

pub use error::{SessionError, SessionResult};
pub use gateway::CartSyncGateway;
pub use reconciler::{CartSession, CartView, MutationOutcome, SaveStatus, SessionEvent};
