//! Page navigation.

use super::DataGrid;
use crate::error::GridError;
use crate::query::PaginationState;

impl DataGrid {
    /// Moves to page `n`, clamped into the valid range.
    pub fn go_to_page(&mut self, n: i64) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.options.config.pagination.enabled {
            log::warn!("pagination is disabled");
            return Ok(());
        }

        let before = self.pagination.page_index();
        self.pagination.go_to(n);
        if self.pagination.page_index() == before {
            return Ok(());
        }

        self.query_changed();
        self.publish_page();
        self.finish();
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(self.pagination.page_index() as i64 + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(self.pagination.page_index() as i64 - 1)
    }

    pub fn first_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(0)
    }

    pub fn last_page(&mut self) -> Result<(), GridError> {
        self.go_to_page(self.pagination.last_index() as i64)
    }

    /// Changes the page size and returns to page 0.
    ///
    /// Zero is ignored. Sizes above [`PaginationState::MAX_PAGE_SIZE`] are
    /// capped.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), GridError> {
        self.ensure_alive()?;
        if size == 0 {
            log::warn!("page size must be positive");
            return Ok(());
        }
        if size > PaginationState::MAX_PAGE_SIZE {
            log::warn!(
                "page size {} capped at {}",
                size,
                PaginationState::MAX_PAGE_SIZE
            );
        }

        self.pagination.set_page_size(size);
        self.query_changed();
        self.publish_page();
        self.finish();
        Ok(())
    }
}
