//! Grid construction options.
//!
//! [`GridConfig`] is the declarative part: plain data with defaults that can
//! be deserialized from a JSON options document. [`GridOptions`] wraps it with
//! what cannot be data: initial records, callbacks, custom column behaviour,
//! the state store and the remote data source.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::DataGrid;
use crate::error::RemoteError;
use crate::model::Column;
use crate::model::ColumnHooks;
use crate::model::Comparator;
use crate::model::FilterFn;
use crate::model::Formatter;
use crate::model::Record;
use crate::model::Row;
use crate::model::RowId;
use crate::model::RowIdSource;
use crate::query::SortKey;
use crate::remote::DataSource;
use crate::remote::Transformer;
use crate::store::StateStore;

// =============================================================================
// Declarative configuration
// =============================================================================

/// Where filtering, sorting and pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Locally, over the full row set.
    #[default]
    Client,
    /// On a remote endpoint; the grid holds one page at a time.
    Server,
}

/// How renderers should let users select rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// A checkbox column.
    #[default]
    Checkbox,
    /// Clicking anywhere on the row.
    Row,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortingOptions {
    pub enabled: bool,
    pub multi_sort: bool,
    /// Applied at construction and by `reset_state`.
    pub default_sort: Vec<SortKey>,
}

impl Default for SortingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            multi_sort: false,
            default_sort: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilteringOptions {
    pub enabled: bool,
    pub global_search: bool,
    /// Debounce interval for search input. The grid applies every call
    /// immediately; the calling layer debounces.
    pub debounce_ms: u64,
    pub case_sensitive: bool,
    /// Restricts global search to these column ids when non-empty.
    pub search_fields: Vec<String>,
    /// Search strings shorter than this (after trimming) are ignored.
    pub min_search_length: usize,
}

impl Default for FilteringOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            global_search: true,
            debounce_ms: 300,
            case_sensitive: false,
            search_fields: Vec::new(),
            min_search_length: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationOptions {
    pub enabled: bool,
    pub page_size: usize,
    /// Page sizes offered to the user. `set_page_size` does not enforce it.
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 25,
            page_size_options: vec![10, 25, 50, 100],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionOptions {
    pub enabled: bool,
    pub multiple: bool,
    pub mode: SelectionMode,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            multiple: true,
            mode: SelectionMode::Checkbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VirtualScrollOptions {
    /// Installs the [`VirtualScroll`](crate::plugin::VirtualScroll) plugin at construction.
    pub enabled: bool,
    pub row_height: f64,
    /// Extra rows rendered above and below the viewport.
    pub overscan: usize,
}

impl Default for VirtualScrollOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            row_height: 40.0,
            overscan: 5,
        }
    }
}

/// Remote endpoint settings for server mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerOptions {
    pub url: Option<String>,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Static parameters merged into every request.
    pub params: BTreeMap<String, serde_json::Value>,
    /// Dot path of the rows in the response.
    pub data_path: String,
    /// Dot path of the total count in the response.
    pub total_path: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            url: None,
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            data_path: "data".to_string(),
            total_path: "total".to_string(),
        }
    }
}

/// Declarative grid configuration.
///
/// # Example
///
/// ```
/// use tabula_lib::options::{DataMode, GridConfig};
///
/// let config: GridConfig = serde_json::from_str(r#"{
///     "columns": [{ "id": "name", "title": "Name" }],
///     "dataMode": "server",
///     "serverSide": { "url": "https://api.example.com/users", "method": "POST" },
///     "pagination": { "pageSize": 50 }
/// }"#).unwrap();
///
/// assert_eq!(config.data_mode, DataMode::Server);
/// assert_eq!(config.pagination.page_size, 50);
/// assert_eq!(config.filtering.debounce_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: Vec<Column>,
    pub data_mode: DataMode,
    #[serde(alias = "serverSide")]
    pub server: ServerOptions,
    pub sorting: SortingOptions,
    pub filtering: FilteringOptions,
    pub pagination: PaginationOptions,
    pub selection: SelectionOptions,
    pub virtual_scroll: VirtualScrollOptions,
    /// Record field holding the row id, unless an extractor is supplied.
    pub row_id: String,
    pub preserve_state: bool,
    /// Key of the persisted snapshot.
    pub state_key: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            data_mode: DataMode::Client,
            server: ServerOptions::default(),
            sorting: SortingOptions::default(),
            filtering: FilteringOptions::default(),
            pagination: PaginationOptions::default(),
            selection: SelectionOptions::default(),
            virtual_scroll: VirtualScrollOptions::default(),
            row_id: "id".to_string(),
            preserve_state: false,
            state_key: "tabula-grid".to_string(),
        }
    }
}

// =============================================================================
// Callbacks
// =============================================================================

/// Called once when construction completes.
pub type InitCallback = Arc<dyn Fn(&DataGrid) + Send + Sync>;

/// Called with the full row set after it changes.
pub type DataChangeCallback = Arc<dyn Fn(&[Row]) + Send + Sync>;

/// Called when a remote fetch fails.
pub type ErrorCallback = Arc<dyn Fn(&RemoteError) + Send + Sync>;

// =============================================================================
// Grid options
// =============================================================================

/// Everything needed to construct a [`DataGrid`].
///
/// # Example
///
/// ```
/// use tabula_lib::options::GridOptions;
/// use tabula_lib::model::{Column, ColumnKind, Record};
///
/// let options = GridOptions::new(vec![
///     Column::new("id", "ID").kind(ColumnKind::Number),
///     Column::new("name", "Name"),
/// ])
/// .with_data(vec![Record::new().set("id", 1i64).set("name", "Ann")])
/// .with_page_size(10);
/// ```
#[derive(Clone, Default)]
pub struct GridOptions {
    pub config: GridConfig,
    pub data: Vec<Record>,
    pub row_id: Option<RowIdSource>,
    pub hooks: ColumnHooks,
    pub store: Option<Arc<dyn StateStore>>,
    pub source: Option<Arc<dyn DataSource>>,
    pub transformer: Option<Transformer>,
    pub on_init: Option<InitCallback>,
    pub on_data_change: Option<DataChangeCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl GridOptions {
    /// Creates options for the given columns with every default.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::from_config(GridConfig {
            columns,
            ..GridConfig::default()
        })
    }

    /// Creates options from a declarative configuration.
    pub fn from_config(config: GridConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the initial records.
    pub fn with_data(mut self, data: Vec<Record>) -> Self {
        self.data = data;
        self
    }

    pub fn with_data_mode(mut self, mode: DataMode) -> Self {
        self.config.data_mode = mode;
        self
    }

    /// Switches to server mode with the given endpoint settings.
    pub fn with_server(mut self, server: ServerOptions) -> Self {
        self.config.data_mode = DataMode::Server;
        self.config.server = server;
        self
    }

    /// Switches to server mode with a custom data source.
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.config.data_mode = DataMode::Server;
        self.source = Some(source);
        self
    }

    /// Replaces the default path-based response transformer.
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn with_sorting(mut self, sorting: SortingOptions) -> Self {
        self.config.sorting = sorting;
        self
    }

    pub fn with_filtering(mut self, filtering: FilteringOptions) -> Self {
        self.config.filtering = filtering;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationOptions) -> Self {
        self.config.pagination = pagination;
        self
    }

    /// Sets the initial page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.pagination.page_size = page_size;
        self
    }

    pub fn with_selection(mut self, selection: SelectionOptions) -> Self {
        self.config.selection = selection;
        self
    }

    pub fn with_virtual_scroll(mut self, virtual_scroll: VirtualScrollOptions) -> Self {
        self.config.virtual_scroll = virtual_scroll;
        self
    }

    /// Reads row ids from `field`.
    pub fn with_row_id_field(mut self, field: impl Into<String>) -> Self {
        self.config.row_id = field.into();
        self.row_id = None;
        self
    }

    /// Derives row ids with a function of the record.
    pub fn with_row_id<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Record) -> Option<RowId> + Send + Sync + 'static,
    {
        self.row_id = Some(RowIdSource::Extractor(Arc::new(extractor)));
        self
    }

    /// Enables state preservation under `key` in `store`.
    pub fn with_preserve_state(mut self, key: impl Into<String>, store: Arc<dyn StateStore>) -> Self {
        self.config.preserve_state = true;
        self.config.state_key = key.into();
        self.store = Some(store);
        self
    }

    pub fn with_comparator(mut self, column_id: impl Into<String>, comparator: Comparator) -> Self {
        self.hooks.set_comparator(column_id, comparator);
        self
    }

    pub fn with_formatter(mut self, column_id: impl Into<String>, formatter: Formatter) -> Self {
        self.hooks.set_formatter(column_id, formatter);
        self
    }

    pub fn with_filter_fn(mut self, column_id: impl Into<String>, filter: FilterFn) -> Self {
        self.hooks.set_filter(column_id, filter);
        self
    }

    pub fn on_init<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DataGrid) + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(callback));
        self
    }

    pub fn on_data_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[Row]) + Send + Sync + 'static,
    {
        self.on_data_change = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RemoteError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Returns the configured row id source.
    pub fn row_id_source(&self) -> RowIdSource {
        self.row_id
            .clone()
            .unwrap_or_else(|| RowIdSource::Field(self.config.row_id.clone()))
    }
}

impl std::fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridOptions")
            .field("config", &self.config)
            .field("data", &self.data.len())
            .field("row_id", &self.row_id_source())
            .field("hooks", &self.hooks)
            .field("store", &self.store.is_some())
            .field("source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}
