//! # Repository Module
//!
//! Repository pattern implementations for database access.
//!
//! Each repository owns the SQL for one table:
//! - [`product::ProductRepository`] - the vending catalog
//! - [`cart::CartRepository`] - per-user persisted cart records

pub mod cart;
pub mod product;

pub use cart::{CartRecord, CartRepository, StoredCartLine};
pub use product::ProductRepository;
