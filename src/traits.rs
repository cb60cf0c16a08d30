use std::error::Error;

use async_trait::async_trait;
use serde_json::Value;

/// A path-addressed hierarchical JSON store.
///
/// This is the seam between the reconciliation engines and whatever holds the
/// data: an actual remote database (see [`crate::client::RestStore`]) or an
/// in-memory tree (see [`crate::memory::MemoryStore`]). Engines take the store
/// as an injected dependency so tests can substitute the in-memory one.
///
/// No implementation retries on its own; a failed call surfaces as `Err` and
/// the caller decides what to do with it.
#[async_trait]
pub trait DataStore {
    /// Read the node at `path`. A missing node is `Ok(None)`, never an error
    async fn get(&self, path: &str) -> Result<Option<Value>, Box<dyn Error>>;

    /// Write `value` at `path`, replacing whatever was there.
    /// Writing `null` is equivalent to [`DataStore::delete`]
    async fn set(&self, path: &str, value: Value) -> Result<(), Box<dyn Error>>;

    /// Remove the node at `path` (and any now-empty ancestors).
    /// Deleting an absent node is a successful no-op
    async fn delete(&self, path: &str) -> Result<(), Box<dyn Error>>;

    /// Append `value` under `path` with a store-generated child key, and
    /// return that key. This is how identifiers get allocated
    async fn push(&self, path: &str, value: Value) -> Result<String, Box<dyn Error>>;
}
