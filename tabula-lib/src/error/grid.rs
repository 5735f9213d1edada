//! Grid operation error types

use super::ExportError;
use super::RemoteError;
use super::StoreError;
use crate::model::RowId;

/// Errors returned by [`DataGrid`](crate::DataGrid) operations.
///
/// Misuse such as unknown column or row ids is logged and ignored rather than
/// reported here. The variants below are the conditions a caller must handle.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The grid has been destroyed and can no longer be used.
    #[error("grid has been destroyed")]
    Destroyed,

    /// Two records produced the same row id.
    #[error("duplicate row id '{id}'")]
    DuplicateRowId { id: RowId },

    /// The row id source produced no id for a record.
    #[error("record at position {position} has no row id")]
    MissingRowId { position: usize },

    /// Remote fetch failure, surfaced where a caller drives the fetch directly.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// State store failure, surfaced by explicit store helpers.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Export failure.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl GridError {
    /// Returns `true` if this is the destroyed-instance error.
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}
