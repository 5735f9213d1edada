//! Persisted grid state.
//!
//! A [`StateStore`] is a byte-level key-value backend. [`PersistedState`] is
//! the snapshot the grid writes into it under its `state_key`, encoded with
//! bincode.
//!
//! Persistence is best-effort: the grid logs store failures and carries on.

mod memory;
mod snapshot;
mod sqlite;

pub use memory::MemoryStore;
pub use snapshot::PersistedState;
pub use sqlite::SqliteStore;

use crate::error::StoreError;

/// Backend trait for snapshot storage.
///
/// Implementations handle raw byte storage/retrieval.
/// [`PersistedState`] wraps this with typed serialization.
pub trait StateStore: Send + Sync {
    /// Get raw bytes for a key.
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Set raw bytes for a key.
    fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Delete a key.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
