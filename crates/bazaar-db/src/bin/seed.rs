//! # Seed Data Loader
//!
//! Populates the database with a sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p bazaar-db --bin seed
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```
//!
//! The loader is idempotent in practice: it refuses to run against a
//! database that already has items.

use chrono::Utc;
use std::env;

use bazaar_core::{Item, Money};
use bazaar_db::{Database, DbConfig, ItemFilter};
use uuid::Uuid;

/// Sample catalog: (name, description, price, category, image_url, stock).
const SAMPLE_ITEMS: &[(&str, &str, f64, &str, &str, i64)] = &[
    (
        "Wireless Bluetooth Headphones",
        "High-quality wireless headphones with noise cancellation and 30-hour battery life.",
        199.99,
        "Electronics",
        "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=300&h=200&fit=crop",
        50,
    ),
    (
        "Smartphone Case",
        "Durable protective case for smartphones with shock absorption.",
        24.99,
        "Electronics",
        "https://images.unsplash.com/photo-1556656793-08538906a9f8?w=300&h=200&fit=crop",
        100,
    ),
    (
        "Cotton T-Shirt",
        "Comfortable 100% cotton t-shirt available in multiple colors.",
        19.99,
        "Clothing",
        "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=300&h=200&fit=crop",
        75,
    ),
    (
        "Denim Jeans",
        "Classic fit denim jeans made from premium quality fabric.",
        79.99,
        "Clothing",
        "https://images.unsplash.com/photo-1542272604-787c3835535d?w=300&h=200&fit=crop",
        40,
    ),
    (
        "Running Shoes",
        "Lightweight running shoes with excellent cushioning and support.",
        129.99,
        "Sports",
        "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=300&h=200&fit=crop",
        60,
    ),
    (
        "Yoga Mat",
        "Non-slip yoga mat perfect for all types of workouts and meditation.",
        39.99,
        "Sports",
        "https://images.unsplash.com/photo-1544367567-0f2fcb009e0b?w=300&h=200&fit=crop",
        30,
    ),
    (
        "Coffee Maker",
        "Programmable coffee maker with 12-cup capacity and auto-shutoff feature.",
        89.99,
        "Home",
        "https://images.unsplash.com/photo-1495474472287-4d71bcdd2085?w=300&h=200&fit=crop",
        25,
    ),
    (
        "Desk Lamp",
        "Adjustable LED desk lamp with multiple brightness settings and USB charging port.",
        49.99,
        "Home",
        "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=300&h=200&fit=crop",
        45,
    ),
    (
        "Backpack",
        "Durable travel backpack with multiple compartments and laptop sleeve.",
        69.99,
        "Accessories",
        "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=300&h=200&fit=crop",
        35,
    ),
    (
        "Sunglasses",
        "Stylish sunglasses with UV protection and polarized lenses.",
        59.99,
        "Accessories",
        "https://images.unsplash.com/photo-1572635196237-14b3f281503f?w=300&h=200&fit=crop",
        80,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bazaar.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Seed Data Loader");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed
    let existing = db.items().list(&ItemFilter::default()).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} items", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Loading sample catalog...");

    let mut tx = db.begin().await?;
    for (name, description, price, category, image_url, stock) in SAMPLE_ITEMS {
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            price_cents: Money::from_display(*price).cents(),
            category: category.to_string(),
            image_url: Some(image_url.to_string()),
            stock_quantity: *stock,
            created_at: Utc::now(),
        };
        db.items().insert(&mut tx, &item).await?;
        println!("  + {} ({})", item.name, item.category);
    }
    tx.commit().await?;

    println!();
    println!("✓ Loaded {} items", SAMPLE_ITEMS.len());

    let categories = db.items().categories().await?;
    println!("  Categories: {}", categories.join(", "));

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
