use crate::keys::{self, CacheKey};
use crate::resource::{CategoryRecord, ProductRecord};
use std::collections::BTreeSet;

/// Set of exact cache keys to delete before a write is committed.
///
/// Ordered so that invalidation order is deterministic; each key appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationSet(BTreeSet<CacheKey>);

impl InvalidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: CacheKey) -> bool {
        self.0.insert(key)
    }

    /// Merges another set into this one.
    pub fn extend(&mut self, other: InvalidationSet) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheKey> {
        self.0.iter()
    }
}

impl IntoIterator for InvalidationSet {
    type Item = CacheKey;
    type IntoIter = std::collections::btree_set::IntoIter<CacheKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<CacheKey> for InvalidationSet {
    fn from_iter<I: IntoIterator<Item = CacheKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Capability of a resource whose writes stale memoized views.
pub trait Invalidate {
    /// Every key derived from this resource's collection.
    fn invalidation_keys(&self) -> InvalidationSet;
}

impl Invalidate for ProductRecord {
    fn invalidation_keys(&self) -> InvalidationSet {
        let mut set = InvalidationSet::new();
        set.insert(keys::products());
        set.insert(keys::product(self.id));
        if let Some(category) = self.category {
            set.insert(keys::products_of_category(category));
        }
        set
    }
}

impl Invalidate for CategoryRecord {
    fn invalidation_keys(&self) -> InvalidationSet {
        [
            keys::categories(),
            keys::category(self.id),
            keys::products_of_category(self.id),
        ]
        .into_iter()
        .collect()
    }
}

/// Computes the keys to invalidate immediately before writing `target`.
///
/// Pure: the same target always yields the same set.
pub fn before_write<T: Invalidate + ?Sized>(target: &T) -> InvalidationSet {
    target.invalidation_keys()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::types::{CategoryId, ProductId};

    fn product(id: u64, category: Option<u64>) -> ProductRecord {
        ProductRecord {
            id: ProductId::from_raw(id),
            category: category.map(CategoryId::from_raw),
        }
    }

    fn key_strings(set: &InvalidationSet) -> Vec<&str> {
        set.iter().map(CacheKey::as_str).collect()
    }

    #[test]
    fn product_write_should_cover_listing_detail_and_category() {
        let set = before_write(&product(42, Some(7)));
        assert_eq!(
            key_strings(&set),
            vec!["product_42", "products", "products_of_category_7"]
        );
    }

    #[test]
    fn product_without_category_should_skip_category_key() {
        let set = before_write(&product(5, None));
        assert_eq!(key_strings(&set), vec!["product_5", "products"]);
    }

    #[test]
    fn category_write_should_cover_its_product_listing() {
        let set = before_write(&CategoryRecord {
            id: CategoryId::from_raw(3),
        });
        assert_eq!(
            key_strings(&set),
            vec!["categories", "category_3", "products_of_category_3"]
        );
    }

    #[test]
    fn before_write_should_be_idempotent() {
        let target = product(42, Some(7));
        assert_eq!(before_write(&target), before_write(&target));
    }

    #[test]
    fn dispatch_through_resource_should_match_direct_call() {
        let resource = Resource::product(ProductId::from_raw(42), Some(CategoryId::from_raw(7)));
        let via_resource = resource.invalidation().map(before_write).unwrap();
        assert_eq!(via_resource, before_write(&product(42, Some(7))));
    }

    #[test]
    fn extend_should_deduplicate() {
        let mut set = before_write(&product(1, Some(2)));
        set.extend(before_write(&product(1, Some(3))));
        assert_eq!(set.len(), 4);
        assert!(set.contains("products_of_category_2"));
        assert!(set.contains("products_of_category_3"));
    }
}
