//! Sorting, filtering and search.

use super::DataGrid;
use crate::error::GridError;
use crate::event::GridEvent;
use crate::query::ColumnFilter;
use crate::query::Direction;
use crate::query::SortKey;
use crate::query::SortState;

impl DataGrid {
    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by one column, replacing any prior ordering.
    ///
    /// With `None` the column cycles through ascending, descending and
    /// unsorted.
    pub fn sort(&mut self, column_id: &str, direction: Option<Direction>) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.can_sort(column_id) {
            return Ok(());
        }

        let next = match direction {
            Some(direction) => SortState::single(column_id, direction),
            None => self.sort.cycled(column_id),
        };
        self.apply_sort(next);
        Ok(())
    }

    /// Sorts by several keys in priority order.
    ///
    /// Keys on unknown or unsortable columns are dropped, as are repeats of a
    /// column already present.
    pub fn multi_sort(&mut self, keys: Vec<SortKey>) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.options.config.sorting.multi_sort {
            log::warn!("multi-column sorting is disabled");
            return Ok(());
        }

        let mut accepted: Vec<SortKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if accepted.iter().any(|k| k.column_id == key.column_id) {
                log::warn!("column '{}' appears twice in multi-sort", key.column_id);
                continue;
            }
            if self.can_sort(&key.column_id) {
                accepted.push(key);
            }
        }
        self.apply_sort(SortState::from_keys(accepted));
        Ok(())
    }

    pub fn clear_sort(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.sort.is_empty() {
            self.apply_sort(SortState::none());
        }
        Ok(())
    }

    fn can_sort(&self, column_id: &str) -> bool {
        if !self.options.config.sorting.enabled {
            log::warn!("sorting is disabled");
            return false;
        }
        match self.column(column_id) {
            None => {
                log::warn!("cannot sort by unknown column '{}'", column_id);
                false
            }
            Some(column) if !column.sortable => {
                log::warn!("column '{}' is not sortable", column_id);
                false
            }
            Some(_) => true,
        }
    }

    fn apply_sort(&mut self, sort: SortState) {
        if sort == self.sort {
            return;
        }
        self.sort = sort;
        self.query_changed();
        self.publish(GridEvent::SortChange(self.sort.clone()));
        self.finish();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replaces all column filters. Filters on unknown or unfilterable
    /// columns are dropped.
    pub fn filter(&mut self, filters: Vec<ColumnFilter>) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.filtering_enabled() {
            return Ok(());
        }

        let accepted: Vec<ColumnFilter> = filters
            .into_iter()
            .filter(|f| self.can_filter(&f.column_id))
            .collect();
        self.filter.set_filters(accepted);
        self.filters_changed();
        Ok(())
    }

    /// Adds a filter, replacing any filter on the same column.
    pub fn add_filter(&mut self, filter: ColumnFilter) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.filtering_enabled() || !self.can_filter(&filter.column_id) {
            return Ok(());
        }

        self.filter.upsert(filter);
        self.filters_changed();
        Ok(())
    }

    pub fn remove_filter(&mut self, column_id: &str) -> Result<(), GridError> {
        self.ensure_alive()?;
        if self.filter.remove(column_id) {
            self.filters_changed();
        }
        Ok(())
    }

    /// Removes every column filter. The search string is kept.
    pub fn clear_filters(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.filter.filters().is_empty() {
            self.filter.clear_filters();
            self.filters_changed();
        }
        Ok(())
    }

    /// Sets the global search string. An empty string clears the search.
    pub fn search(&mut self, query: impl Into<String>) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.filtering_enabled() {
            return Ok(());
        }
        if !self.options.config.filtering.global_search {
            log::warn!("global search is disabled");
            return Ok(());
        }

        let query = query.into();
        if query == self.filter.search() {
            return Ok(());
        }
        self.filter.set_search(query);

        let page_moved = self.reset_page();
        self.query_changed();
        self.publish(GridEvent::SearchChange {
            query: self.filter.search().to_string(),
        });
        if page_moved {
            self.publish_page();
        }
        self.finish();
        Ok(())
    }

    fn filtering_enabled(&self) -> bool {
        let enabled = self.options.config.filtering.enabled;
        if !enabled {
            log::warn!("filtering is disabled");
        }
        enabled
    }

    fn can_filter(&self, column_id: &str) -> bool {
        match self.column(column_id) {
            None => {
                log::warn!("cannot filter unknown column '{}'", column_id);
                false
            }
            Some(column) if !column.filterable => {
                log::warn!("column '{}' is not filterable", column_id);
                false
            }
            Some(_) => true,
        }
    }

    fn filters_changed(&mut self) {
        let page_moved = self.reset_page();
        self.query_changed();
        self.publish(GridEvent::FilterChange(self.filter.clone()));
        if page_moved {
            self.publish_page();
        }
        self.finish();
    }

    /// Goes back to page 0. Returns `true` if the page moved.
    fn reset_page(&mut self) -> bool {
        let moved = self.pagination.page_index() != 0;
        self.pagination.set_page_index_unchecked(0);
        moved
    }

    /// Reruns the pipeline after a query input changed.
    pub(super) fn query_changed(&mut self) {
        if self.is_server() {
            self.needs_reload = true;
        }
        self.recompute();
    }

    pub(super) fn publish_page(&mut self) {
        self.publish(GridEvent::PageChange {
            page_index: self.pagination.page_index(),
            page_size: self.pagination.page_size(),
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::DataGrid;
    use crate::model::Column;
    use crate::model::ColumnKind;
    use crate::model::Record;
    use crate::options::GridOptions;
    use crate::options::SortingOptions;
    use crate::query::ColumnFilter;
    use crate::query::Direction;
    use crate::query::SortKey;

    fn grid() -> DataGrid {
        DataGrid::new(
            GridOptions::new(vec![
                Column::new("id", "ID").kind(ColumnKind::Number),
                Column::new("name", "Name"),
                Column::new("secret", "Secret").not_sortable().not_filterable(),
            ])
            .with_data(
                (1..=30)
                    .map(|i| Record::new().set("id", i as i64).set("name", format!("n{:02}", i)))
                    .collect(),
            )
            .with_page_size(10),
        )
        .unwrap()
    }

    fn first_id(grid: &DataGrid) -> i64 {
        grid.visible_rows()[0].record().get_i64("id").unwrap().unwrap()
    }

    #[test]
    fn test_sort_cycle() {
        let mut grid = grid();
        grid.sort("id", None).unwrap();
        assert_eq!(grid.sort_state().direction_of("id"), Some(Direction::Asc));
        grid.sort("id", None).unwrap();
        assert_eq!(first_id(&grid), 30);
        grid.sort("id", None).unwrap();
        assert!(grid.sort_state().is_empty());
        assert_eq!(first_id(&grid), 1);
    }

    #[test]
    fn test_sort_guards() {
        let mut grid = grid();
        grid.sort("secret", Some(Direction::Asc)).unwrap();
        grid.sort("missing", Some(Direction::Asc)).unwrap();
        assert!(grid.sort_state().is_empty());

        grid.multi_sort(vec![SortKey::asc("name"), SortKey::desc("id")])
            .unwrap();
        assert!(grid.sort_state().is_empty());
    }

    #[test]
    fn test_multi_sort_drops_invalid_keys() {
        let mut grid = DataGrid::new(
            GridOptions::new(vec![Column::new("a", "A"), Column::new("b", "B")]).with_sorting(
                SortingOptions {
                    multi_sort: true,
                    ..SortingOptions::default()
                },
            ),
        )
        .unwrap();

        grid.multi_sort(vec![
            SortKey::asc("a"),
            SortKey::desc("missing"),
            SortKey::desc("a"),
            SortKey::desc("b"),
        ])
        .unwrap();
        assert_eq!(
            grid.sort_state().keys(),
            &[SortKey::asc("a"), SortKey::desc("b")]
        );
    }

    #[test]
    fn test_filter_resets_page() {
        let mut grid = grid();
        grid.go_to_page(2).unwrap();
        assert_eq!(grid.pagination().page_index(), 2);

        grid.add_filter(ColumnFilter::gt("id", 5i64)).unwrap();
        assert_eq!(grid.pagination().page_index(), 0);
        assert_eq!(grid.filtered_rows().len(), 25);

        grid.add_filter(ColumnFilter::contains("secret", "x")).unwrap();
        assert_eq!(grid.filter_state().filters().len(), 1);

        grid.remove_filter("id").unwrap();
        assert_eq!(grid.filtered_rows().len(), 30);
    }

    #[test]
    fn test_search() {
        let mut grid = grid();
        grid.search("N0").unwrap();
        assert_eq!(grid.filtered_rows().len(), 9);
        grid.search("").unwrap();
        assert_eq!(grid.filtered_rows().len(), 30);
    }
}
