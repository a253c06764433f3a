use crate::error::CacheError;
use crate::keys::CacheKey;
use async_trait::async_trait;
use std::marker::PhantomData;

/// Keyed cache of memoized catalog views.
///
/// Only exact-key operations are required; invalidation never relies on
/// pattern deletes.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Memoized value type.
    type Value: Clone + Send + Sync + 'static;

    /// Gets the value stored under `key`.
    async fn get(&self, key: &CacheKey) -> Result<Option<Self::Value>, CacheError>;

    /// Stores a value under `key` with no expiry.
    async fn set(&self, key: &CacheKey, value: Self::Value) -> Result<(), CacheError>;

    /// Deletes the value stored under `key`, if any.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError>;
}

/// No-op cache implementation.
#[derive(Debug)]
pub struct NoCache<V = ()> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> NoCache<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for NoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for NoCache<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NoCache<V> {}

#[async_trait]
impl<V> Cache for NoCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;

    async fn get(&self, _key: &CacheKey) -> Result<Option<V>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _value: V) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &CacheKey) -> Result<(), CacheError> {
        Ok(())
    }
}
