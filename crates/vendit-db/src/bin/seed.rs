//! # Seed Data Generator
//!
//! Populates the database with the vending catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./vendit.db)
//! cargo run -p vendit-db --bin seed
//!
//! # Specify database path
//! cargo run -p vendit-db --bin seed -- --db ./data/vendit.db
//!
//! # Initial stock per product (default 25)
//! cargo run -p vendit-db --bin seed -- --stock 40
//! ```
//!
//! ## Generated Products
//! One block per vending category:
//! - Fruits & Vegetables, Dairy Products, Frozen Food,
//!   Sweet Cravings, Packaged Food, Electronics
//!
//! Each product has a UUID id, a display image path, and a price in paise.

use chrono::Utc;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vendit_core::Product;
use vendit_db::{Database, DbConfig};

/// The vending catalog: (category, [(name, price in paise)]).
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Fruits & Vegetables",
        &[
            ("Apple", 12_000),
            ("Banana", 4_000),
            ("Orange", 8_000),
            ("Carrot Pack", 3_500),
        ],
    ),
    (
        "Dairy Products",
        &[
            ("Milk", 5_000),
            ("Paneer", 9_000),
            ("Curd", 4_500),
            ("Butter", 5_500),
        ],
    ),
    (
        "Frozen Food",
        &[
            ("Ice Cream", 8_000),
            ("Frozen Peas", 6_000),
            ("Frozen Paratha", 7_500),
        ],
    ),
    (
        "Sweet Cravings",
        &[
            ("Chocolate", 10_000),
            ("Gulab Jamun Tin", 14_000),
            ("Cookies", 5_000),
        ],
    ),
    (
        "Packaged Food",
        &[
            ("Instant Noodles", 4_000),
            ("Chips", 2_000),
            ("Biscuits", 2_500),
            ("Namkeen Mix", 4_500),
        ],
    ),
    (
        "Electronics",
        &[("Headphones", 150_000), ("Power Bank", 120_000)],
    ),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (db_path, stock) = parse_args();

    info!(path = %db_path, stock, "Seeding vending catalog");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .expect("failed to open database");

    let repo = db.products();
    let now = Utc::now();
    let mut inserted = 0u32;

    for (category, products) in CATALOG {
        for (name, price_paise) in *products {
            let product = Product {
                id: Uuid::new_v4().to_string(),
                name: (*name).to_string(),
                category: Some((*category).to_string()),
                image_url: Some(format!("/images/{}.png", slug(name))),
                price_paise: *price_paise,
                stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            };

            repo.insert(&product).await.expect("failed to insert product");
            inserted += 1;
        }
    }

    info!(inserted, "Catalog seeded");
    db.close().await;
}

/// Parses `--db <path>` and `--stock <n>` from the command line.
fn parse_args() -> (String, i64) {
    let mut db_path = "./vendit.db".to_string();
    let mut stock: i64 = 25;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 2;
            }
            "--stock" if i + 1 < args.len() => {
                stock = args[i + 1].parse().expect("--stock must be an integer");
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: seed [--db <path>] [--stock <n>]");
                std::process::exit(2);
            }
        }
    }

    (db_path, stock)
}

/// Lowercases a product name into an image slug ("Ice Cream" -> "ice-cream").
fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}
