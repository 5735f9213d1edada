//! State store error types

/// Errors raised by [`StateStore`](crate::store::StateStore) backends.
///
/// The grid never propagates these: persistence is best-effort and failures
/// are logged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("store lock poisoned")]
    Poisoned,
}
