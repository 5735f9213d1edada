//! Column definitions and per-column custom behaviour.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;
use crate::query::ColumnFilter;

/// How the values of a column are compared and matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    /// Infer from the values being compared.
    #[default]
    Auto,
    /// Case-insensitive lexicographic.
    Text,
    /// Numeric; numeric strings are parsed.
    Number,
    /// Date/time; RFC 3339 and `YYYY-MM-DD` strings are parsed.
    Date,
    /// `false < true`.
    Boolean,
}

/// Horizontal alignment hint for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column configuration.
///
/// Columns describe one field of a row: display metadata and whether the
/// column takes part in sorting, filtering and the visible projection.
///
/// # Examples
///
/// ```
/// use tabula_lib::model::{Column, ColumnKind};
///
/// let columns = vec![
///     Column::new("id", "ID").kind(ColumnKind::Number).not_sortable(),
///     Column::new("name", "Name"),
///     Column::new("age", "Age").kind(ColumnKind::Number),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Column {
    /// Unique column identifier; also the record field it reads.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Comparison kind.
    pub kind: ColumnKind,
    /// Alignment hint.
    pub align: Alignment,
    /// Preferred width hint, in renderer units.
    pub width: Option<u16>,
    /// Whether the column can be sorted.
    pub sortable: bool,
    /// Whether the column can be filtered and searched.
    pub filterable: bool,
    /// Whether the column is part of the visible projection.
    pub visible: bool,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            kind: ColumnKind::Auto,
            align: Alignment::Left,
            width: None,
            sortable: true,
            filterable: true,
            visible: true,
        }
    }
}

impl Column {
    /// Creates a sortable, filterable, visible column.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the comparison kind. Number columns default to right alignment.
    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        if kind == ColumnKind::Number {
            self.align = Alignment::Right;
        }
        self
    }

    /// Sets the alignment hint.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Sets the width hint.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Excludes the column from sorting.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Excludes the column from filtering and global search.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Starts the column hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Custom comparator for a column's values. Direction is applied afterwards.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Custom formatter producing a column's display text.
pub type Formatter = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// Custom filter replacing the built-in operator matching for a column.
pub type FilterFn = Arc<dyn Fn(&Value, &ColumnFilter, &Record) -> bool + Send + Sync>;

/// Per-column custom behaviour, keyed by column id.
///
/// Columns without an entry use the built-in, kind-aware defaults.
#[derive(Clone, Default)]
pub struct ColumnHooks {
    comparators: HashMap<String, Comparator>,
    formatters: HashMap<String, Formatter>,
    filters: HashMap<String, FilterFn>,
}

impl ColumnHooks {
    /// Creates an empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a comparator for a column.
    pub fn set_comparator(&mut self, column_id: impl Into<String>, comparator: Comparator) {
        self.comparators.insert(column_id.into(), comparator);
    }

    /// Registers a formatter for a column.
    pub fn set_formatter(&mut self, column_id: impl Into<String>, formatter: Formatter) {
        self.formatters.insert(column_id.into(), formatter);
    }

    /// Registers a filter function for a column.
    pub fn set_filter(&mut self, column_id: impl Into<String>, filter: FilterFn) {
        self.filters.insert(column_id.into(), filter);
    }

    /// Returns the comparator for a column, if any.
    pub fn comparator(&self, column_id: &str) -> Option<&Comparator> {
        self.comparators.get(column_id)
    }

    /// Returns the formatter for a column, if any.
    pub fn formatter(&self, column_id: &str) -> Option<&Formatter> {
        self.formatters.get(column_id)
    }

    /// Returns the filter function for a column, if any.
    pub fn filter(&self, column_id: &str) -> Option<&FilterFn> {
        self.filters.get(column_id)
    }
}

impl std::fmt::Debug for ColumnHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnHooks")
            .field("comparators", &self.comparators.keys().collect::<Vec<_>>())
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
