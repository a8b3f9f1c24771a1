//! Product mutation service.
//!
//! Owns the outcome policy for every product operation: which store
//! results map to `NotFound`, which to `Conflict`, and how partial updates
//! are merged. The service keeps no state of its own; all shared mutable
//! state lives behind the [`ProductStore`].
//!
//! Only `update` re-checks existence after a write conflict. A conflict on
//! `create` is reported as is, and `delete` has no conflict path at all.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::models::product::{NewProduct, Product, ProductPatch};
use crate::store::{ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Conflict(String),

    #[error("Malformed product request: {0}")]
    MalformedInput(String),

    #[error("Product store failure: {0}")]
    Store(#[source] sqlx::Error),
}

impl ProductError {
    fn from_store(err: StoreError, conflict_message: &str) -> Self {
        match err {
            StoreError::Conflict => ProductError::Conflict(conflict_message.to_string()),
            StoreError::Failure(e) => {
                error!(?e, "Product store failure");
                ProductError::Store(e)
            }
        }
    }
}

fn store_failure(err: StoreError) -> ProductError {
    ProductError::from_store(err, "Product store rejected the request")
}

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Product, ProductError> {
        self.store
            .find(id)
            .await
            .map_err(store_failure)?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        self.store.list().await.map_err(store_failure)
    }

    /// Inserts `candidate`; the id is always assigned by the store.
    #[instrument(skip(self, candidate))]
    pub async fn create(&self, candidate: NewProduct) -> Result<Product, ProductError> {
        match self.store.insert(candidate).await {
            Ok(product) => {
                info!(id = product.id, "Product created");
                Ok(product)
            }
            Err(err) => {
                if matches!(err, StoreError::Conflict) {
                    warn!("Product insert conflicted");
                }
                Err(ProductError::from_store(err, "Error creating product"))
            }
        }
    }

    /// Merges `patch` into the stored record and writes it back.
    ///
    /// A conflict from the store is ambiguous: the row was either changed or
    /// deleted after it was read. The follow-up existence probe decides
    /// between `Conflict` and `NotFound`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, ProductError> {
        let current = self
            .store
            .find(id)
            .await
            .map_err(store_failure)?
            .ok_or(ProductError::NotFound(id))?;

        let merged = current.merge(&patch);

        match self.store.update(&merged).await {
            Ok(committed) => {
                info!(id, version = committed.version, "Product updated");
                Ok(committed)
            }
            Err(StoreError::Conflict) => {
                if self.store.exists(id).await.map_err(store_failure)? {
                    warn!(id, "Product update lost a concurrent write");
                    Err(ProductError::Conflict(format!(
                        "Conflict on updating product {id}"
                    )))
                } else {
                    warn!(id, "Product deleted during update");
                    Err(ProductError::NotFound(id))
                }
            }
            Err(err) => Err(store_failure(err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ProductError> {
        let product = self
            .store
            .find(id)
            .await
            .map_err(store_failure)?
            .ok_or(ProductError::NotFound(id))?;

        self.store.delete(&product).await.map_err(store_failure)?;
        info!(id, "Product deleted");

        Ok(())
    }
}
