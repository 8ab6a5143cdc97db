//! # Product Repository
//!
//! Database operations for the vending catalog.
//!
//! The cart engine is a reader here: it resolves persisted cart lines
//! against the live catalog (`get_many`) and fetches single products for
//! add-to-cart flows (`get_by_id`). Writes exist for seeding and for the
//! stock decrement at dispense time.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendit_core::Product;

/// Columns selected for every product query, in `Product` field order.
const PRODUCT_COLUMNS: &str =
    "id, name, category, image_url, price_paise, stock, is_active, created_at, updated_at";

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
///
/// // Bulk resolve persisted cart lines
/// let products = repo.get_many(&ids).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets several products by ID in one round trip.
    ///
    /// Used by the cart sync gateway to re-resolve display fields for all
    /// persisted lines at once. IDs with no matching product are simply
    /// absent from the result; the caller decides how to degrade.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Bulk-fetching products");

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let products = query.fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, image_url,
                price_paise, stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.price_paise)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adjusts product stock by a delta (negative when units are dispensed).
    ///
    /// Stock never goes below zero; the floor is applied in SQL so
    /// concurrent decrements can't race past it.
    pub async fn update_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                stock = MAX(stock + ?2, 0),
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn test_product(id: &str, name: &str, price_paise: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: Some("Packaged Food".to_string()),
            image_url: Some(format!("/images/{}.png", id)),
            price_paise,
            stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_by_id() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&test_product("p1", "Instant Noodles", 4000, 12))
            .await
            .unwrap();

        let fetched = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Instant Noodles");
        assert_eq!(fetched.price_paise, 4000);
        assert_eq!(fetched.stock, 12);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_ids() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&test_product("p1", "Apple", 12_000, 5))
            .await
            .unwrap();
        repo.insert(&test_product("p2", "Milk", 5000, 5))
            .await
            .unwrap();

        let found = repo
            .get_many(&[
                "p1".to_string(),
                "ghost".to_string(),
                "p2".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(found.len(), 2);

        let empty = repo.get_many(&[]).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_list_active_and_count() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&test_product("p1", "Chocolate", 10_000, 3))
            .await
            .unwrap();
        let mut inactive = test_product("p2", "Headphones", 150_000, 1);
        inactive.is_active = false;
        repo.insert(&inactive).await.unwrap();

        let active = repo.list_active(10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p1");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_stock_floors_at_zero() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&test_product("p1", "Ice Cream", 8000, 2))
            .await
            .unwrap();

        repo.update_stock("p1", -5).await.unwrap();
        let product = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 0);

        let err = repo.update_stock("ghost", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
