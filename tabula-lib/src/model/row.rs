//! Grid rows and row identifiers.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;

/// Identifier of a row, unique within the current row collection.
///
/// Numeric ids are stored in their decimal text form, so `RowId::from(5)` and
/// an id read from a field holding `5` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from text.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a row id from a field value. Null, lists and empty strings
    /// yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Int(n) => Some(Self(n.to_string())),
            Value::Float(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            Value::DateTime(dt) => Some(Self(dt.to_rfc3339())),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<i64> for RowId {
    fn from(v: i64) -> Self {
        Self(v.to_string())
    }
}

impl From<i32> for RowId {
    fn from(v: i32) -> Self {
        Self(v.to_string())
    }
}

impl From<&RowId> for RowId {
    fn from(v: &RowId) -> Self {
        v.clone()
    }
}

/// Function deriving a row id from a record.
pub type RowIdExtractor = Arc<dyn Fn(&Record) -> Option<RowId> + Send + Sync>;

/// Where a row's identifier comes from.
#[derive(Clone)]
pub enum RowIdSource {
    /// Read from a record field.
    Field(String),
    /// Computed from the whole record.
    Extractor(RowIdExtractor),
}

impl RowIdSource {
    /// Extracts the id of a record, if the source yields one.
    pub fn extract(&self, record: &Record) -> Option<RowId> {
        match self {
            RowIdSource::Field(field) => RowId::from_value(record.value(field)),
            RowIdSource::Extractor(f) => f(record),
        }
    }
}

impl Default for RowIdSource {
    fn default() -> Self {
        RowIdSource::Field("id".to_string())
    }
}

impl std::fmt::Debug for RowIdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowIdSource::Field(field) => f.debug_tuple("Field").field(field).finish(),
            RowIdSource::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

/// A wrapped record plus its identifier and transient UI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    record: Record,
    /// Mirrors membership in the selection set.
    pub selected: bool,
    /// Detail/expanded state for renderers.
    pub expanded: bool,
    /// Disabled rows cannot be selected.
    pub disabled: bool,
}

impl Row {
    /// Wraps a record under the given id.
    pub fn new(id: RowId, record: Record) -> Self {
        Self {
            id,
            record,
            selected: false,
            expanded: false,
            disabled: false,
        }
    }

    /// Returns the row id.
    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Returns the record payload.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Returns the payload value of a field, null when missing.
    pub fn value(&self, field: &str) -> &Value {
        self.record.value(field)
    }

    pub(crate) fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
