//! # vendit-db: Persistence Layer for Vendit
//!
//! SQLite-backed storage for the two things the cart engine needs
//! remembered: the product catalog and the per-user persisted cart record.
//!
//! ## Responsibility
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          vendit-db                                      │
//! │                                                                         │
//! │  ✅ RESPONSIBILITIES                   ❌ NOT RESPONSIBLE FOR           │
//! │  ──────────────────────                ─────────────────────────        │
//! │  • Connection pool management          • Cart/coupon rules (core)       │
//! │  • SQL query execution                 • Session orchestration          │
//! │  • Schema migrations                   • Catalog merging (gateway)      │
//! │  • Repository implementations          • Payment hand-off               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Features
//! - Embedded migrations (no runtime SQL files)
//! - Connection pooling with SqlitePool, WAL mode
//! - In-memory configuration for isolated tests

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{CartRecord, CartRepository, ProductRepository, StoredCartLine};
