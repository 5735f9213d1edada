//! The persisted grid snapshot.

use serde::Deserialize;
use serde::Serialize;

use super::StateStore;
use crate::error::StoreError;
use crate::model::RowId;
use crate::query::ColumnFilter;
use crate::query::SortKey;

/// User-facing grid state that survives a restart.
///
/// Rows are not part of the snapshot; only the view over them is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub sort: Vec<SortKey>,
    pub filters: Vec<ColumnFilter>,
    pub search: String,
    pub page_index: usize,
    pub page_size: usize,
    pub selected: Vec<RowId>,
    /// `(column id, visible)` for every column.
    pub column_visibility: Vec<(String, bool)>,
}

impl PersistedState {
    /// Current snapshot format.
    pub const VERSION: u32 = 1;

    /// Reads and decodes the snapshot under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    pub fn load(store: &dyn StateStore, key: &str) -> Result<Option<Self>, StoreError> {
        let Some(bytes) = store.get_bytes(key)? else {
            return Ok(None);
        };
        let state: Self = bincode::deserialize(&bytes).map_err(StoreError::Deserialization)?;
        if state.version != Self::VERSION {
            return Err(StoreError::Version {
                found: state.version,
                expected: Self::VERSION,
            });
        }
        Ok(Some(state))
    }

    /// Encodes and writes the snapshot under `key`.
    pub fn save(&self, store: &dyn StateStore, key: &str) -> Result<(), StoreError> {
        let bytes = bincode::serialize(self).map_err(StoreError::Serialization)?;
        store.set_bytes(key, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::store::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let store = MemoryStore::new();
        let state = PersistedState {
            version: PersistedState::VERSION,
            sort: vec![SortKey::desc("age")],
            filters: vec![ColumnFilter::between("age", 18i64, Value::Float(65.5))],
            search: "ann".into(),
            page_index: 2,
            page_size: 50,
            selected: vec![RowId::from(7)],
            column_visibility: vec![("age".into(), false)],
        };

        state.save(&store, "grid").unwrap();
        assert_eq!(PersistedState::load(&store, "grid").unwrap(), Some(state));
        assert_eq!(PersistedState::load(&store, "other").unwrap(), None);
    }

    #[test]
    fn test_version_mismatch() {
        let store = MemoryStore::new();
        let state = PersistedState {
            version: 99,
            ..PersistedState::default()
        };
        state.save(&store, "grid").unwrap();
        assert!(matches!(
            PersistedState::load(&store, "grid"),
            Err(StoreError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn test_garbage_bytes() {
        let store = MemoryStore::new();
        store.set_bytes("grid", vec![0xff]).unwrap();
        assert!(matches!(
            PersistedState::load(&store, "grid"),
            Err(StoreError::Deserialization(_))
        ));
    }
}
