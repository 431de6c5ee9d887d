//! Remote store abstraction.
//!
//! The board treats the shared object store as a foreign collaborator: a
//! set of keyed collections with `set`/`update`/`remove` writes, a change
//! feed, and per-client presence entries. Conflicts are the store's
//! business; the last write to land wins.

mod memory;

pub use memory::{MemoryBackend, MemoryStore};

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::items::{Fields, ItemId, ItemKind};

/// Store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Store rejected the write: {0}")]
    Rejected(String),
    #[error("Store is offline")]
    Offline,
    #[error("{0} item not found: {1}")]
    NotFound(ItemKind, ItemId),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A change delivered by the store feed.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added {
        kind: ItemKind,
        id: ItemId,
        value: Fields,
    },
    Changed {
        kind: ItemKind,
        id: ItemId,
        value: Fields,
    },
    Removed {
        kind: ItemKind,
        id: ItemId,
    },
    /// The number of connected clients changed.
    Presence { count: usize },
}

/// Trait for shared object store backends.
///
/// Writes resolve once the store has durably accepted them. Their effects
/// come back through [`RemoteStore::poll_events`], including to the
/// client that issued them.
pub trait RemoteStore {
    /// Generate a fresh unique key in a collection, without writing.
    fn generate_id(&self, kind: ItemKind) -> ItemId;

    /// Create or overwrite an entry.
    fn set(&self, kind: ItemKind, id: &ItemId, value: Fields) -> BoxFuture<'_, StoreResult<()>>;

    /// Merge fields into an entry. `null` values delete the field.
    fn update(&self, kind: ItemKind, id: &ItemId, fields: Fields) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete an entry. Deleting a missing entry succeeds.
    fn remove(&self, kind: ItemKind, id: &ItemId) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete a whole collection.
    fn remove_all(&self, kind: ItemKind) -> BoxFuture<'_, StoreResult<()>>;

    /// Register this client's presence entry. The store removes it when
    /// the client disconnects.
    fn join_presence(&self) -> BoxFuture<'_, StoreResult<ItemId>>;

    /// Drain feed events received since the last call.
    fn poll_events(&self) -> Vec<StoreEvent>;
}
