//! # Domain Types
//!
//! Catalog-owned types read by the cart engine.
//!
//! ## Ownership
//! `Product` belongs to the product catalog service; the cart core only
//! reads it. The one moment product data enters cart state is at add-time,
//! when the unit price is snapshotted onto the new line (see
//! [`crate::cart::CartLine::from_product`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available in the vending catalog.
///
/// Stock and price are eventually-consistent snapshots: a session may hold
/// a product fetched minutes ago, and staleness is tolerated until the
/// next catalog load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on product cards and cart lines.
    pub name: String,

    /// Catalog category ("Dairy Products", "Frozen Food", ...).
    pub category: Option<String>,

    /// Image reference for display surfaces.
    pub image_url: Option<String>,

    /// Price in paise (smallest currency unit). Never negative.
    pub price_paise: i64,

    /// Units currently available in the machine.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Checks whether the product can be added to a cart.
    ///
    /// Adding an out-of-stock product is a caller-level precondition: the
    /// surface offering the "add" action gates on this, and the cart
    /// reconciler does not re-check it.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Milk".to_string(),
            category: Some("Dairy Products".to_string()),
            image_url: None,
            price_paise: 5000,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_as_money() {
        assert_eq!(product(3).price(), Money::from_rupees(50));
    }

    #[test]
    fn test_in_stock() {
        assert!(product(1).in_stock());
        assert!(!product(0).in_stock());
    }
}
