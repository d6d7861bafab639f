//! Store adapter: the seam between the services and the external store
//!
//! The backing store is an external hierarchical key-value tree addressed by
//! slash-separated paths (e.g. `products/{id}`, `carts/{id}/items`). The
//! services only ever talk to it through [`StoreAdapter`], so the real
//! backend stays a collaborator: the crate ships [`InMemoryStore`] as the
//! default implementation and for tests.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors reported by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation
    #[error("store backend unavailable: {message}")]
    Unavailable { message: String },

    /// The value at a path could not be decoded into the expected shape
    #[error("failed to decode value at '{path}': {message}")]
    Decode { path: String, message: String },
}

/// Async interface over a hierarchical key-value store
///
/// Paths are slash-separated; a path addresses a whole subtree. `update`
/// follows external-store merge semantics: the patch is shallow-merged into
/// the object at the path, creating it if absent. Existence checks are the
/// caller's responsibility.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Read the subtree at `path`, `None` if nothing is stored there
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite the subtree at `path`
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Shallow-merge an object patch into the subtree at `path`
    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the subtree at `path` (idempotent)
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Store `value` under a freshly generated child key of `path` and
    /// return the key
    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;
}
