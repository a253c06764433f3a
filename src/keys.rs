//! Cache key generation.
//!
//! Keys are exact strings; the cache backend is only ever asked to delete
//! the keys computed here, never a pattern.

use crate::types::{CategoryId, ProductId};
use std::borrow::Borrow;
use std::fmt;

/// Exact key of a memoized view.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from a trusted string.
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Full product listing.
pub fn products() -> CacheKey {
    CacheKey::from("products")
}

/// Single product by id.
pub fn product(id: ProductId) -> CacheKey {
    CacheKey(format!("product_{id}"))
}

/// Products listed under one category.
pub fn products_of_category(id: CategoryId) -> CacheKey {
    CacheKey(format!("products_of_category_{id}"))
}

/// Full category listing.
pub fn categories() -> CacheKey {
    CacheKey::from("categories")
}

/// Single category by id.
pub fn category(id: CategoryId) -> CacheKey {
    CacheKey(format!("category_{id}"))
}
