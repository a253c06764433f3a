use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::cache::Cache;
use crate::error::CacheError;
use crate::keys::CacheKey;

/// In-memory cache for memoized views.
///
/// Entries never expire. By default the cache is unbounded, matching the
/// cache-aside storefront layout where per-id keys accumulate until they are
/// invalidated. [`MemoryCache::with_capacity`] turns it into an LRU.
#[derive(Debug)]
pub struct MemoryCache<V> {
    inner: Arc<Mutex<CacheState<V>>>,
    capacity: Option<usize>,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<CacheKey, V>,
    order: VecDeque<CacheKey>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryCache<V> {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
            capacity: None,
        }
    }

    /// Bounds the cache, evicting least recently used entries.
    ///
    /// A capacity of zero disables caching.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true when `key` currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.lock()
            .map(|state| state.entries.contains_key(key))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState<V>>, CacheError> {
        self.inner
            .lock()
            .map_err(|_| CacheError::Unavailable("poisoned lock".to_string()))
    }

    fn touch(state: &mut CacheState<V>, key: &CacheKey) {
        state.order.retain(|existing| existing != key);
        state.order.push_back(key.clone());
    }

    fn evict_if_needed(state: &mut CacheState<V>, capacity: usize) {
        if capacity == 0 {
            state.entries.clear();
            state.order.clear();
            return;
        }

        while state.entries.len() > capacity {
            if let Some(key) = state.order.pop_front() {
                state.entries.remove(&key);
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl<V> Cache for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;

    async fn get(&self, key: &CacheKey) -> Result<Option<V>, CacheError> {
        if self.capacity == Some(0) {
            return Ok(None);
        }

        let mut guard = self.lock()?;
        let value = guard.entries.get(key).cloned();
        if value.is_some() && self.capacity.is_some() {
            Self::touch(&mut guard, key);
        }
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: V) -> Result<(), CacheError> {
        if self.capacity == Some(0) {
            return Ok(());
        }

        let mut guard = self.lock()?;
        guard.entries.insert(key.clone(), value);
        if let Some(capacity) = self.capacity {
            Self::touch(&mut guard, key);
            Self::evict_if_needed(&mut guard, capacity);
        }
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut guard = self.lock()?;
        if guard.entries.remove(key).is_some() && self.capacity.is_some() {
            guard.order.retain(|existing| existing != key);
        }
        Ok(())
    }
}
