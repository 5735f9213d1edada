//! State snapshots: read, partial write, reset and persistence.

use chrono::DateTime;
use chrono::Utc;

use super::DataGrid;
use crate::engine::SelectionState;
use crate::error::GridError;
use crate::model::Column;
use crate::model::Row;
use crate::model::RowId;
use crate::query::FilterState;
use crate::query::PaginationState;
use crate::query::SortState;
use crate::store::PersistedState;

/// Remote loading status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadState {
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// A full snapshot of the grid, detached from the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
    pub visible_columns: Vec<Column>,
    pub filtered_rows: Vec<Row>,
    pub sorted_rows: Vec<Row>,
    pub visible_rows: Vec<Row>,
    pub sort: SortState,
    pub filter: FilterState,
    pub pagination: PaginationState,
    pub selection: SelectionState,
    pub load: LoadState,
    pub needs_reload: bool,
}

/// The writable part of the grid state. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialState {
    pub sort: Option<SortState>,
    pub filter: Option<FilterState>,
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
    pub selected: Option<Vec<RowId>>,
    /// `(column id, visible)` pairs; unknown ids are ignored.
    pub column_visibility: Option<Vec<(String, bool)>>,
}

impl From<GridState> for PartialState {
    fn from(state: GridState) -> Self {
        Self {
            sort: Some(state.sort),
            filter: Some(state.filter),
            page_index: Some(state.pagination.page_index()),
            page_size: Some(state.pagination.page_size()),
            selected: Some(state.selection.selected_ids().iter().cloned().collect()),
            column_visibility: Some(
                state
                    .columns
                    .iter()
                    .map(|c| (c.id.clone(), c.visible))
                    .collect(),
            ),
        }
    }
}

impl From<PersistedState> for PartialState {
    fn from(state: PersistedState) -> Self {
        let mut filter = FilterState::new();
        filter.set_filters(state.filters);
        filter.set_search(state.search);
        Self {
            sort: Some(SortState::from_keys(state.sort)),
            filter: Some(filter),
            page_index: Some(state.page_index),
            page_size: Some(state.page_size),
            selected: Some(state.selected),
            column_visibility: Some(state.column_visibility),
        }
    }
}

impl DataGrid {
    /// Returns a snapshot of the whole grid state.
    pub fn get_state(&self) -> Result<GridState, GridError> {
        self.ensure_alive()?;
        let owned = |rows: Vec<&Row>| rows.into_iter().cloned().collect::<Vec<_>>();

        Ok(GridState {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            visible_columns: self.visible_columns().into_iter().cloned().collect(),
            filtered_rows: owned(self.filtered_rows()),
            sorted_rows: owned(self.sorted_rows()),
            visible_rows: owned(self.visible_rows()),
            sort: self.sort.clone(),
            filter: self.filter.clone(),
            pagination: self.pagination,
            selection: self.selection.clone(),
            load: self.load.clone(),
            needs_reload: self.needs_reload,
        })
    }

    /// Merges `partial` into the state and reruns the pipeline.
    ///
    /// Unlike the individual mutators this bypasses the enabled/sortable/
    /// filterable guards, so that a saved state always restores as saved.
    pub fn set_state(&mut self, partial: impl Into<PartialState>) -> Result<(), GridError> {
        self.ensure_alive()?;
        self.apply_partial(partial.into());
        if self.is_server() {
            self.needs_reload = true;
        }
        self.recompute();
        self.finish();
        Ok(())
    }

    /// Returns to the initial configuration.
    ///
    /// Restores the default sort, clears filters, search and selection, goes
    /// back to page 0 with the configured page size and restores column
    /// visibility. Rows are kept.
    pub fn reset_state(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        let config = &self.options.config;

        self.sort = SortState::from_keys(config.sorting.default_sort.clone());
        self.filter = FilterState::new();
        self.selection.clear();
        self.pagination.set_page_size(config.pagination.page_size);
        for column in &mut self.columns {
            if let Some(initial) = self.initial_columns.iter().find(|c| c.id == column.id) {
                column.visible = initial.visible;
            }
        }
        if self.is_server() {
            self.needs_reload = true;
        }

        self.recompute();
        self.publish(crate::event::GridEvent::SortChange(self.sort.clone()));
        self.publish(crate::event::GridEvent::FilterChange(self.filter.clone()));
        self.publish_selection();
        self.finish();
        Ok(())
    }

    pub(super) fn apply_partial(&mut self, partial: PartialState) {
        if let Some(sort) = partial.sort {
            self.sort = sort;
        }
        if let Some(filter) = partial.filter {
            self.filter = filter;
        }
        match partial.page_size {
            Some(0) => log::warn!("ignoring page size 0 in state"),
            Some(size) => self.pagination.set_page_size(size),
            None => {}
        }
        if let Some(index) = partial.page_index {
            // Clamped by the next recompute once the row count is known.
            self.pagination.set_page_index_unchecked(index);
        }
        if let Some(selected) = partial.selected {
            self.selection.clear();
            for id in selected {
                self.selection.insert(id);
            }
        }
        if let Some(visibility) = partial.column_visibility {
            for (id, visible) in visibility {
                match self.columns.iter_mut().find(|c| c.id == id) {
                    Some(column) => column.visible = visible,
                    None => log::warn!("ignoring visibility of unknown column '{}'", id),
                }
            }
        }
    }

    pub(super) fn persisted_state(&self) -> PersistedState {
        PersistedState {
            version: PersistedState::VERSION,
            sort: self.sort.keys().to_vec(),
            filters: self.filter.filters().to_vec(),
            search: self.filter.search().to_string(),
            page_index: self.pagination.page_index(),
            page_size: self.pagination.page_size(),
            selected: self.selection.selected_ids().iter().cloned().collect(),
            column_visibility: self
                .columns
                .iter()
                .map(|c| (c.id.clone(), c.visible))
                .collect(),
        }
    }
}
