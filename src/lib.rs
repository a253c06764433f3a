//! Authorization and cache consistency for a storefront catalog.
//!
//! The crate decides whether a [`Principal`] may perform an [`Action`] on a
//! [`Resource`] (accounts, products, categories, comments, likes) using one
//! declarative rule table, and computes the exact cache keys a catalog write
//! makes stale. The default behavior is deny-by-default.
//! Use [`Engine`] to authorize, invalidate and commit in the right order.
//!
//! # Examples
//!
//! Evaluating the policy directly:
//! ```
//! use storefront_guard::{Action, Decision, Principal, ProductId, Resource, UserId, decide};
//!
//! let staff = Principal::staff(UserId::new(1).unwrap());
//! let product = Resource::product(ProductId::new(5).unwrap(), None);
//! assert_eq!(decide(&staff, Action::Delete, &product), Decision::Allow);
//! assert_eq!(decide(&Principal::anonymous(), Action::Delete, &product), Decision::Deny);
//! ```
//!
//! Keys invalidated before a product write:
//! ```
//! use storefront_guard::{CategoryId, ProductId, ProductRecord, before_write};
//!
//! let product = ProductRecord {
//!     id: ProductId::new(42).unwrap(),
//!     category: Some(CategoryId::new(7).unwrap()),
//! };
//! let keys = before_write(&product);
//! assert!(keys.contains("products"));
//! assert!(keys.contains("product_42"));
//! assert!(keys.contains("products_of_category_7"));
//! ```
//!
//! Applying a mutation with the in-memory backends (enable `memory-store`
//! and `memory-cache`):
//! ```
//! # #[cfg(all(feature = "memory-store", feature = "memory-cache"))]
//! # {
//! use futures::executor::block_on;
//! use storefront_guard::{EngineBuilder, MemoryCache, MemoryStore, Mutation, Principal};
//! use storefront_guard::{ProductId, Resource, UserId};
//! let store = MemoryStore::new();
//! let cache: MemoryCache<String> = MemoryCache::new();
//! let engine = EngineBuilder::new(store).cache(cache).build();
//! let staff = Principal::staff(UserId::new(1).unwrap());
//! let product = Resource::product(ProductId::new(5).unwrap(), None);
//! let keys = block_on(engine.apply(&staff, Mutation::Create(product))).unwrap();
//! assert!(keys.contains("product_5"));
//! assert_eq!(engine.store().get(product.reference()), Some(product));
//! # }
//! ```
#![forbid(unsafe_code)]

mod action;
mod cache;
mod engine;
mod error;
mod invalidation;
pub mod keys;
mod policy;
mod principal;
mod resource;
mod store;
mod types;

#[cfg(feature = "memory-cache")]
mod memory_cache;

#[cfg(feature = "memory-store")]
mod memory_store;

#[cfg(feature = "axum")]
pub mod axum;

pub use crate::action::Action;
pub use crate::cache::{Cache, NoCache};
pub use crate::engine::{Engine, EngineBuilder, Mutation};
pub use crate::error::{CacheError, Denial, Error, Result, StoreError};
pub use crate::invalidation::{Invalidate, InvalidationSet, before_write};
pub use crate::keys::CacheKey;
pub use crate::policy::{Decision, Evaluation, RULES, Rule, decide, evaluate};
pub use crate::principal::Principal;
pub use crate::resource::{
    AccountRecord, CategoryRecord, CommentRecord, LikeRecord, ProductRecord, Resource,
    ResourceKind, ResourceRef,
};
pub use crate::store::{ResourceStore, Store, Write, WriteStore};
pub use crate::types::{CategoryId, CommentId, LikeId, ProductId, UserId};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;

#[cfg(feature = "memory-cache")]
pub use crate::memory_cache::MemoryCache;
