use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::resource::{Resource, ResourceRef};
use crate::store::{ResourceStore, Write, WriteStore};

/// In-memory store implementation for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    resources: RwLock<HashMap<ResourceRef, Resource>>,
    commits: RwLock<Vec<Write>>,
}

fn poisoned() -> StoreError {
    "poisoned lock".into()
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a resource without recording a commit.
    pub fn insert(&self, resource: Resource) {
        if let Ok(mut guard) = self.inner.resources.write() {
            guard.insert(resource.reference(), resource);
        }
    }

    /// Returns the stored snapshot, if any.
    pub fn get(&self, reference: ResourceRef) -> Option<Resource> {
        self.inner
            .resources
            .read()
            .ok()
            .and_then(|guard| guard.get(&reference).copied())
    }

    /// Writes committed so far, oldest first.
    pub fn commits(&self) -> Vec<Write> {
        self.inner
            .commits
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn resolve(
        &self,
        reference: ResourceRef,
    ) -> std::result::Result<Option<Resource>, StoreError> {
        let guard = self.inner.resources.read().map_err(|_| poisoned())?;
        Ok(guard.get(&reference).copied())
    }
}

#[async_trait]
impl WriteStore for MemoryStore {
    async fn commit(&self, write: Write) -> std::result::Result<(), StoreError> {
        {
            let mut guard = self.inner.resources.write().map_err(|_| poisoned())?;
            match write {
                Write::Upsert(resource) => {
                    guard.insert(resource.reference(), resource);
                }
                Write::Remove(reference) => {
                    guard.remove(&reference);
                }
            }
        }
        let mut log = self.inner.commits.write().map_err(|_| poisoned())?;
        log.push(write);
        Ok(())
    }
}
