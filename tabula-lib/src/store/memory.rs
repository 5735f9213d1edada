//! In-memory state store using DashMap

use dashmap::DashMap;

use super::StateStore;
use crate::error::StoreError;

/// A process-local store backed by a concurrent hash map.
///
/// This is the default store when state preservation is enabled without an
/// explicit backend. Snapshots are lost when the process exits.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tabula_lib::store::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    store: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Returns the number of stored snapshots.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get_bytes("grid").unwrap().is_none());

        store.set_bytes("grid", vec![1, 2, 3]).unwrap();
        assert_eq!(store.get_bytes("grid").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);

        store.delete("grid").unwrap();
        assert!(store.is_empty());
    }
}
