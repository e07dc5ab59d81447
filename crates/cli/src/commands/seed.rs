//! Catalog seeding command.
//!
//! Inserts a small set of sample products for local development. The command
//! is a no-op when the catalog already contains rows, so it is safe to run
//! repeatedly.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: set SERVER_DATABASE_URL or DATABASE_URL")]
    MissingEnvVar,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const SAMPLE_PRODUCTS: &[(&str, &str, &str, i32)] = &[
    ("Clementine Crate", "A wooden crate of fresh clementines.", "12.50", 40),
    ("Blood Orange Box", "Six blood oranges, hand picked.", "9.00", 25),
    ("Citrus Press", "Cast aluminium manual citrus press.", "34.99", 10),
    ("Marmalade Jar", "Small-batch clementine marmalade, 250g.", "6.75", 60),
    ("Zester", "Stainless steel zester with soft grip.", "8.20", 0),
];

/// Seed the product catalog with sample data.
pub async fn products() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SERVER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        info!(existing, "Catalog already seeded, nothing to do");
        return Ok(());
    }

    for (name, description, price, stock) in SAMPLE_PRODUCTS {
        insert_product(&pool, name, description, price, *stock).await?;
    }

    info!(count = SAMPLE_PRODUCTS.len(), "Catalog seeded");
    Ok(())
}

async fn insert_product(
    pool: &PgPool,
    name: &str,
    description: &str,
    price: &str,
    stock: i32,
) -> Result<(), SeedError> {
    // Prices are compile-time literals, so a parse failure is a programmer
    // error rather than bad input.
    let price: Decimal = price.parse().unwrap_or_default();

    sqlx::query("INSERT INTO product (name, description, price, stock) VALUES ($1, $2, $3, $4)")
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;

    info!(name, %price, stock, "Inserted product");
    Ok(())
}
