//! Persistence contract for products.
//!
//! Every operation returns a typed outcome instead of signalling write
//! races out of band: `Ok(value)` on success, [`StoreError::Conflict`] when
//! an optimistic check or a uniqueness constraint rejects the write, and
//! [`StoreError::Failure`] for everything the caller cannot recover from.
//! Absence is reported through `Option`/`bool` by `find` and `exists`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::product::{NewProduct, Product};

pub use memory::MemoryProductStore;
pub use postgres::PgProductStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write lost a race: the row changed or vanished since it was read,
    /// or an insert hit a constraint.
    #[error("write conflict")]
    Conflict,

    #[error("store failure: {0}")]
    Failure(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find(&self, id: i64) -> StoreResult<Option<Product>>;

    /// All rows, ordered by id.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Stores a new row and returns it with its assigned id and version.
    async fn insert(&self, product: NewProduct) -> StoreResult<Product>;

    /// Writes the full record if the stored version still equals
    /// `product.version`. Returns the committed row with its new version.
    async fn update(&self, product: &Product) -> StoreResult<Product>;

    /// Removes the row. Deleting a row that is already gone is not an error.
    async fn delete(&self, product: &Product) -> StoreResult<()>;

    async fn exists(&self, id: i64) -> StoreResult<bool>;
}
