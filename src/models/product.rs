use sqlx::FromRow;

/// A committed catalog row.
///
/// `version` is the store's optimistic-concurrency token. It travels with
/// the record from `find` to `update` so the store can reject stale writes,
/// and is never exposed to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: Option<String>,
    pub price: Option<String>,
    pub version: i64,
}

/// Fields of a product that has not been stored yet (no id, no version).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<String>,
}

/// Requested changes for a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<String>,
}

impl Product {
    /// Applies `patch` on top of this record.
    ///
    /// A patch value only replaces the stored one when it is non-blank;
    /// `None`, `""` and whitespace-only strings keep the current value.
    /// `id` and `version` are carried over unchanged.
    pub fn merge(&self, patch: &ProductPatch) -> Product {
        Product {
            id: self.id,
            name: pick(patch.name.as_deref(), &self.name),
            price: pick(patch.price.as_deref(), &self.price),
            version: self.version,
        }
    }
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn pick(incoming: Option<&str>, current: &Option<String>) -> Option<String> {
    match incoming {
        Some(value) if !is_blank(Some(value)) => Some(value.to_string()),
        _ => current.clone(),
    }
}
