use async_trait::async_trait;
use sqlx::{Error as SqlxError, PgPool};
use tracing::debug;

use super::{ProductStore, StoreError, StoreResult};
use crate::models::product::{NewProduct, Product};

// unique_violation, serialization_failure
fn is_conflict_code(code: Option<&str>) -> bool {
    matches!(code, Some("23505" | "40001"))
}

fn map_write_error(err: SqlxError) -> StoreError {
    match err {
        SqlxError::Database(db_err) if is_conflict_code(db_err.code().as_deref()) => {
            StoreError::Conflict
        }
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find(&self, id: i64) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, version FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, version FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, price)
             VALUES ($1, $2)
             RETURNING id, name, price, version",
        )
        .bind(&product.name)
        .bind(&product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, product: &Product) -> StoreResult<Product> {
        // Zero rows means the version moved on or the row is gone.
        sqlx::query_as::<_, Product>(
            "UPDATE products SET
             name = $1,
             price = $2,
             version = version + 1
             WHERE id = $3 AND version = $4
             RETURNING id, name, price, version",
        )
        .bind(&product.name)
        .bind(&product.price)
        .bind(product.id)
        .bind(product.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::Conflict)
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(id = product.id, "Product already removed");
        }

        Ok(())
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_codes() {
        assert!(is_conflict_code(Some("23505")));
        assert!(is_conflict_code(Some("40001")));

        assert!(!is_conflict_code(Some("23503")));
        assert!(!is_conflict_code(Some("40P01")));
        assert!(!is_conflict_code(None));
    }

    #[test]
    fn non_database_errors_are_failures() {
        assert!(matches!(
            map_write_error(SqlxError::PoolTimedOut),
            StoreError::Failure(SqlxError::PoolTimedOut)
        ));
        assert!(matches!(
            map_write_error(SqlxError::RowNotFound),
            StoreError::Failure(_)
        ));
    }
}
