use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ProductStore, StoreError, StoreResult};
use crate::models::product::{NewProduct, Product};

const INITIAL_VERSION: i64 = 1;

/// Process-local product table with the same optimistic-concurrency rules
/// as the Postgres store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    table: RwLock<Table>,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Product>,
    last_id: i64,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let row = Product {
            id: table.last_id,
            name: product.name,
            price: product.price,
            version: INITIAL_VERSION,
        };
        table.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn update(&self, product: &Product) -> StoreResult<Product> {
        let mut table = self.table.write().await;
        let row = match table.rows.get_mut(&product.id) {
            Some(row) if row.version == product.version => row,
            _ => return Err(StoreError::Conflict),
        };

        row.name = product.name.clone();
        row.price = product.price.clone();
        row.version += 1;

        Ok(row.clone())
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        self.table.write().await.rows.remove(&product.id);
        Ok(())
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.read().await.rows.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: Some(name.to_string()),
            price: Some(price.to_string()),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryProductStore::new();

        let first = store.insert(new_product("Widget", "9.99")).await.unwrap();
        let second = store.insert(new_product("Gadget", "4.50")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.version, INITIAL_VERSION);
        assert_eq!(store.find(1).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryProductStore::new();
        let first = store.insert(NewProduct::default()).await.unwrap();
        store.delete(&first).await.unwrap();

        let second = store.insert(NewProduct::default()).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemoryProductStore::new();
        assert!(store.list().await.unwrap().is_empty());

        for name in ["c", "a", "b"] {
            store.insert(new_product(name, "1")).await.unwrap();
        }

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_advances_version() {
        let store = MemoryProductStore::new();
        let mut row = store.insert(new_product("Widget", "9.99")).await.unwrap();
        row.price = Some("12.50".to_string());

        let committed = store.update(&row).await.unwrap();

        assert_eq!(committed.version, INITIAL_VERSION + 1);
        assert_eq!(committed.price.as_deref(), Some("12.50"));
        assert_eq!(store.find(row.id).await.unwrap(), Some(committed));
    }

    #[tokio::test]
    async fn stale_update_is_rejected_and_not_applied() {
        let store = MemoryProductStore::new();
        let read_a = store.insert(new_product("Widget", "9.99")).await.unwrap();
        let read_b = read_a.clone();

        let mut write_a = read_a.clone();
        write_a.name = Some("A".to_string());
        store.update(&write_a).await.unwrap();

        let mut write_b = read_b;
        write_b.name = Some("B".to_string());
        let result = store.update(&write_b).await;

        assert!(matches!(result, Err(StoreError::Conflict)));
        let stored = store.find(read_a.id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn update_of_deleted_row_conflicts() {
        let store = MemoryProductStore::new();
        let row = store.insert(new_product("Widget", "9.99")).await.unwrap();
        store.delete(&row).await.unwrap();

        assert!(matches!(store.update(&row).await, Err(StoreError::Conflict)));
        assert!(!store.exists(row.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryProductStore::new();
        let row = store.insert(new_product("Widget", "9.99")).await.unwrap();

        store.delete(&row).await.unwrap();
        store.delete(&row).await.unwrap();

        assert_eq!(store.find(row.id).await.unwrap(), None);
    }
}
