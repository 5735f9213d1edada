//! The grid orchestrator.
//!
//! [`DataGrid`] owns the rows, the columns and every piece of view state. Each
//! mutating call updates its input state, reruns the pipeline
//!
//! ```text
//! filter -> sort -> paginate -> selection flags
//! ```
//!
//! (client mode) or marks a remote reload as due (server mode), snapshots
//! the state when preservation is on, and publishes events.

mod columns;
mod data;
mod paging;
mod plugins;
mod query;
mod selection;
mod server;
mod state;

pub use server::PendingReload;
pub use server::ReloadTicket;
pub use state::GridState;
pub use state::LoadState;
pub use state::PartialState;

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::engine::FilterContext;
use crate::engine::SelectionState;
use crate::engine::filter;
use crate::engine::paginate;
use crate::engine::sort;
use crate::error::GridError;
use crate::event::EventBus;
use crate::event::GridEvent;
use crate::event::StateSummary;
use crate::model::Column;
use crate::model::ColumnHooks;
use crate::model::Row;
use crate::model::RowId;
use crate::model::RowIdSource;
use crate::options::DataMode;
use crate::options::GridConfig;
use crate::options::GridOptions;
use crate::plugin::PluginRegistry;
use crate::plugin::VirtualScroll;
use crate::query::FilterState;
use crate::query::PaginationState;
use crate::query::SortState;
use crate::remote::DataSource;
use crate::remote::HttpDataSource;
use crate::remote::Transformer;
use crate::remote::path_transformer;
use crate::store::MemoryStore;
use crate::store::PersistedState;
use crate::store::StateStore;

/// Rows plus their id index.
type RowSet = (Vec<Row>, HashMap<RowId, usize>);

/// A headless data grid.
///
/// # Example
///
/// ```
/// use tabula_lib::DataGrid;
/// use tabula_lib::model::{Column, ColumnKind, Record};
/// use tabula_lib::options::GridOptions;
/// use tabula_lib::query::Direction;
///
/// let mut grid = DataGrid::new(
///     GridOptions::new(vec![
///         Column::new("id", "ID").kind(ColumnKind::Number),
///         Column::new("name", "Name"),
///     ])
///     .with_data(vec![
///         Record::new().set("id", 1i64).set("name", "Bob"),
///         Record::new().set("id", 2i64).set("name", "Ann"),
///     ]),
/// )?;
///
/// grid.sort("name", Some(Direction::Asc))?;
/// assert_eq!(grid.visible_rows()[0].value("name").as_str(), Some("Ann"));
/// # Ok::<(), tabula_lib::error::GridError>(())
/// ```
pub struct DataGrid {
    options: GridOptions,
    row_id: RowIdSource,
    /// Columns as configured at construction, for `reset_state`.
    initial_columns: Vec<Column>,
    columns: Vec<Column>,

    rows: Vec<Row>,
    index: HashMap<RowId, usize>,
    filtered: Vec<usize>,
    sorted: Vec<usize>,
    visible: Vec<usize>,

    sort: SortState,
    filter: FilterState,
    pagination: PaginationState,
    selection: SelectionState,
    load: LoadState,

    /// Server total reported by the last successful fetch.
    server_total: usize,
    needs_reload: bool,
    reload_seq: u64,

    events: EventBus,
    plugins: PluginRegistry,
    store: Option<Arc<dyn StateStore>>,
    source: Option<Arc<dyn DataSource>>,
    transformer: Transformer,
    destroyed: bool,
}

impl DataGrid {
    /// Builds a grid, loads any preserved state and runs the pipeline once.
    ///
    /// Fails if the initial records contain duplicate or missing row ids.
    pub fn new(mut options: GridOptions) -> Result<Self, GridError> {
        let columns = dedupe_columns(std::mem::take(&mut options.config.columns));
        let row_id = options.row_id_source();

        let store = match (&options.store, options.config.preserve_state) {
            (Some(store), true) => Some(Arc::clone(store)),
            (None, true) => Some(Arc::new(MemoryStore::new()) as Arc<dyn StateStore>),
            (_, false) => None,
        };

        let source = options.source.clone().or_else(|| {
            if options.config.data_mode == DataMode::Server {
                HttpDataSource::from_options(&options.config.server)
                    .map(|s| Arc::new(s) as Arc<dyn DataSource>)
            } else {
                None
            }
        });

        let transformer = options.transformer.clone().unwrap_or_else(|| {
            path_transformer(
                options.config.server.data_path.clone(),
                options.config.server.total_path.clone(),
            )
        });

        let data = std::mem::take(&mut options.data);
        let server_mode = options.config.data_mode == DataMode::Server;

        let mut grid = Self {
            sort: SortState::from_keys(options.config.sorting.default_sort.clone()),
            pagination: PaginationState::new(options.config.pagination.page_size),
            initial_columns: columns.clone(),
            columns,
            row_id,
            rows: Vec::new(),
            index: HashMap::new(),
            filtered: Vec::new(),
            sorted: Vec::new(),
            visible: Vec::new(),
            filter: FilterState::new(),
            selection: SelectionState::new(),
            load: LoadState::default(),
            server_total: 0,
            needs_reload: server_mode,
            reload_seq: 0,
            events: EventBus::new(),
            plugins: PluginRegistry::new(),
            store,
            source,
            transformer,
            destroyed: false,
            options,
        };

        let (rows, index) = grid.build_rows(data)?;
        grid.rows = rows;
        grid.index = index;
        grid.server_total = grid.rows.len();

        grid.restore_persisted();
        grid.recompute();

        if grid.options.config.virtual_scroll.enabled {
            let plugin = VirtualScroll::from_options(&grid.options.config.virtual_scroll);
            grid.use_plugin(plugin)?;
        }

        log::debug!(
            "grid ready: {} rows, {} columns, {:?} mode",
            grid.rows.len(),
            grid.columns.len(),
            grid.options.config.data_mode
        );

        grid.publish(GridEvent::Init);
        if let Some(callback) = grid.options.on_init.clone() {
            callback(&grid);
        }
        grid.finish();

        Ok(grid)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns every row in insertion (or server) order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the row with the given id.
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    /// Returns all columns, visible or not.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the visible columns in order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    /// Returns the rows passing the filters, in insertion order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.resolve(&self.filtered)
    }

    /// Returns the filtered rows in sorted order.
    pub fn sorted_rows(&self) -> Vec<&Row> {
        self.resolve(&self.sorted)
    }

    /// Returns the rows on the current page.
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.resolve(&self.visible)
    }

    /// Returns the selected rows present in the grid, in row order.
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.rows
            .iter()
            .filter(|r| self.selection.is_selected(r.id()))
            .collect()
    }

    /// Returns every selected id, including ids not currently loaded.
    pub fn selected_ids(&self) -> &HashSet<RowId> {
        self.selection.selected_ids()
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.selection
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Returns `true` when server-mode state changed since the last fetch.
    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    /// Returns the options the grid was built with, minus the initial data
    /// and columns (see [`columns`](Self::columns)).
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn config(&self) -> &GridConfig {
        &self.options.config
    }

    /// Returns the custom column comparators, formatters and filters.
    pub fn hooks(&self) -> &ColumnHooks {
        &self.options.hooks
    }

    /// Returns the event bus for subscribing and unsubscribing.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&Row> {
        indices.iter().map(|&i| &self.rows[i]).collect()
    }

    fn is_server(&self) -> bool {
        self.options.config.data_mode == DataMode::Server
    }

    fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Tears the grid down.
    ///
    /// Publishes `destroy`, uninstalls plugins and drops all subscriptions.
    /// Every later mutating call fails with [`GridError::Destroyed`]. Calling
    /// it again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        self.publish(GridEvent::Destroy);
        for mut plugin in self.plugins.drain() {
            plugin.uninstall(self);
        }
        self.events.clear();

        self.rows.clear();
        self.index.clear();
        self.filtered.clear();
        self.sorted.clear();
        self.visible.clear();
        self.destroyed = true;
        log::debug!("grid destroyed");
    }

    fn ensure_alive(&self) -> Result<(), GridError> {
        if self.destroyed {
            Err(GridError::Destroyed)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Reruns filter, sort and pagination, then the selection flags.
    fn recompute(&mut self) {
        if self.is_server() {
            let all: Vec<usize> = (0..self.rows.len()).collect();
            self.filtered = all.clone();
            self.sorted = all.clone();
            self.visible = all;
            // Before the first fetch the total is unknown; keep the requested page.
            if self.load.last_loaded_at.is_some() || !self.rows.is_empty() {
                let before = self.pagination.page_index();
                self.pagination.set_total_rows(self.server_total);
                if self.pagination.page_index() != before {
                    self.needs_reload = true;
                }
            }
        } else {
            let filtering = &self.options.config.filtering;
            let ctx = FilterContext {
                columns: &self.columns,
                hooks: &self.options.hooks,
                case_sensitive: filtering.case_sensitive,
                search_fields: &filtering.search_fields,
                min_search_length: filtering.min_search_length,
            };
            self.filtered = filter::apply(&self.rows, &self.filter, &ctx);
            self.sorted = sort::apply(
                &self.rows,
                &self.filtered,
                &self.sort,
                &self.columns,
                &self.options.hooks,
            );
            self.pagination.set_total_rows(self.sorted.len());
            self.visible = if self.options.config.pagination.enabled {
                paginate::apply(&self.sorted, &self.pagination)
            } else {
                self.sorted.clone()
            };
        }

        self.sync_selection();
        log::trace!(
            "recompute: {} rows, {} filtered, {} visible",
            self.rows.len(),
            self.filtered.len(),
            self.visible.len()
        );
    }

    /// Mirrors the selection set into row flags and refreshes derived flags.
    fn sync_selection(&mut self) {
        for row in &mut self.rows {
            row.selected = self.selection.is_selected(row.id());
        }
        self.selection.recompute(&self.rows, &self.visible);
    }

    fn summary(&self) -> StateSummary {
        StateSummary {
            total_rows: self.pagination.total_rows(),
            visible_rows: self.visible.len(),
            page_index: self.pagination.page_index(),
            page_size: self.pagination.page_size(),
            total_pages: self.pagination.total_pages(),
            selected_count: self.selection.selected_count(),
            loading: self.load.loading,
        }
    }

    fn publish(&mut self, event: GridEvent) {
        self.events.publish(&event);
    }

    fn publish_selection(&mut self) {
        self.publish(GridEvent::SelectionChange {
            selected_count: self.selection.selected_count(),
            all_selected: self.selection.all_selected(),
            partially_selected: self.selection.partially_selected(),
        });
    }

    /// Snapshots the state when preservation is on and publishes `state:change`.
    fn finish(&mut self) {
        self.persist();
        self.publish(GridEvent::StateChange(self.summary()));
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let key = &self.options.config.state_key;
        if let Err(e) = self.persisted_state().save(store.as_ref(), key) {
            log::warn!("failed to persist grid state under '{}': {}", key, e);
        }
    }

    fn restore_persisted(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let key = self.options.config.state_key.clone();
        match PersistedState::load(store.as_ref(), &key) {
            Ok(Some(snapshot)) => {
                log::debug!("restoring grid state from '{}'", key);
                self.apply_partial(snapshot.into());
            }
            Ok(None) => {}
            Err(e) => log::warn!("ignoring persisted grid state under '{}': {}", key, e),
        }
    }

    // =========================================================================
    // Rows
    // =========================================================================

    fn build_rows(&self, records: Vec<crate::model::Record>) -> Result<RowSet, GridError> {
        let mut rows = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            let id = self
                .row_id
                .extract(&record)
                .ok_or(GridError::MissingRowId { position })?;
            if index.insert(id.clone(), position).is_some() {
                return Err(GridError::DuplicateRowId { id });
            }
            rows.push(Row::new(id, record));
        }

        Ok((rows, index))
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id().clone(), i))
            .collect();
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("mode", &self.options.config.data_mode)
            .field("rows", &self.rows.len())
            .field("visible", &self.visible.len())
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .field("pagination", &self.pagination)
            .field("plugins", &self.plugins)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// Keeps the first column for each id.
fn dedupe_columns(columns: Vec<Column>) -> Vec<Column> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.id.clone());
            if !fresh {
                log::warn!("duplicate column id '{}' ignored", c.id);
            }
            fresh
        })
        .collect()
}
