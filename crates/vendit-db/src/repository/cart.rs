//! # Cart Record Repository
//!
//! The persisted cart store: one document per user, read and overwritten
//! wholesale.
//!
//! ## Record Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  carts table (keyed by user_id)                                         │
//! │                                                                         │
//! │  user_id │ items (JSON)                                │ total_price    │
//! │  ────────┼─────────────────────────────────────────────┼─────────────   │
//! │  u-42    │ [{"productId":"p1","quantity":2,            │ 10000          │
//! │          │   "price":5000}]                            │ (paise)        │
//! │                                                                         │
//! │  The JSON stores only productId/quantity/price — display fields         │
//! │  (name, image) are re-resolved from the catalog on every load.          │
//! │  totalPrice is always recomputed by the core, never hand-edited.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `upsert` is a full replace, not a patch: two sessions racing on the
//! same user will silently overwrite each other, and the later write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Record Types
// =============================================================================

/// One persisted line: the minimal fields needed to rebuild a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCartLine {
    /// Catalog product this line references.
    pub product_id: String,

    /// Quantity in cart.
    pub quantity: i64,

    /// Unit price snapshot in paise, frozen at add-time.
    pub price: i64,
}

/// The full per-user cart document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecord {
    /// Owning user (record key).
    pub user_id: String,

    /// Persisted line items.
    pub items: Vec<StoredCartLine>,

    /// Recomputed subtotal in paise, stored for display convenience.
    pub total_price: i64,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for persisted cart records.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

/// Raw carts row before the JSON column is decoded.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    user_id: String,
    items: String,
    total_price_paise: i64,
    updated_at: DateTime<Utc>,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Fetches the persisted record for a user.
    ///
    /// ## Returns
    /// * `Ok(Some(CartRecord))` - Record exists
    /// * `Ok(None)` - User has no persisted cart yet
    pub async fn get(&self, user_id: &str) -> DbResult<Option<CartRecord>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT user_id, items, total_price_paise, updated_at FROM carts WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<StoredCartLine> = serde_json::from_str(&row.items)?;

        Ok(Some(CartRecord {
            user_id: row.user_id,
            items,
            total_price: row.total_price_paise,
            updated_at: row.updated_at,
        }))
    }

    /// Writes the full record for a user, replacing any existing one.
    ///
    /// This is the only write path: the entire line list and the
    /// recomputed subtotal, every time.
    pub async fn upsert(&self, record: &CartRecord) -> DbResult<()> {
        debug!(
            user_id = %record.user_id,
            lines = record.items.len(),
            total_price = record.total_price,
            "Writing cart record"
        );

        let items = serde_json::to_string(&record.items)?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, items, total_price_paise, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                items = excluded.items,
                total_price_paise = excluded.total_price_paise,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.user_id)
        .bind(&items)
        .bind(record.total_price)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a user's persisted record (no-op if absent).
    pub async fn delete(&self, user_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, "Deleting cart record");

        sqlx::query("DELETE FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
