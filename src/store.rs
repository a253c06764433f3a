use crate::error::StoreError;
use crate::resource::{Resource, ResourceRef};
use async_trait::async_trait;

/// Change committed to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", content = "target", rename_all = "snake_case"))]
pub enum Write {
    /// Insert or replace a resource.
    Upsert(Resource),
    /// Remove a resource.
    Remove(ResourceRef),
}

impl Write {
    pub fn target(&self) -> ResourceRef {
        match self {
            Self::Upsert(resource) => resource.reference(),
            Self::Remove(reference) => *reference,
        }
    }
}

/// Store interface supplying resource snapshots.
#[async_trait]
pub trait ResourceStore {
    /// Returns the current snapshot of a resource, or `None` if it does not exist.
    async fn resolve(
        &self,
        reference: ResourceRef,
    ) -> std::result::Result<Option<Resource>, StoreError>;
}

/// Store interface receiving committed writes.
#[async_trait]
pub trait WriteStore {
    /// Applies a write. Called only after its cache invalidation was issued.
    async fn commit(&self, write: Write) -> std::result::Result<(), StoreError>;
}

/// Composite store trait.
pub trait Store: ResourceStore + WriteStore + Send + Sync {}

impl<T> Store for T where T: ResourceStore + WriteStore + Send + Sync {}
