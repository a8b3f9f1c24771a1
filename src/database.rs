// src/database.rs
use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS products (
    id      BIGSERIAL PRIMARY KEY,
    name    TEXT,
    price   TEXT,
    version BIGINT NOT NULL DEFAULT 1
)";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Creates the products table if it is missing. Existing tables are left as is.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_PRODUCTS).execute(pool).await?;
    Ok(())
}
