//! Column set and visibility.

use super::DataGrid;
use super::dedupe_columns;
use crate::error::GridError;
use crate::event::GridEvent;
use crate::model::Column;

impl DataGrid {
    /// Replaces the column set. Duplicate ids keep their first column.
    ///
    /// Sort keys and filters on columns that no longer exist are kept; they
    /// match nothing until the column comes back.
    pub fn set_columns(&mut self, columns: Vec<Column>) -> Result<(), GridError> {
        self.ensure_alive()?;
        self.columns = dedupe_columns(columns);

        self.recompute();
        self.publish(GridEvent::ColumnVisibility {
            column_id: None,
            visible: true,
        });
        self.finish();
        Ok(())
    }

    pub fn show_column(&mut self, column_id: &str) -> Result<(), GridError> {
        self.set_column_visible(column_id, |_| true)
    }

    pub fn hide_column(&mut self, column_id: &str) -> Result<(), GridError> {
        self.set_column_visible(column_id, |_| false)
    }

    pub fn toggle_column(&mut self, column_id: &str) -> Result<(), GridError> {
        self.set_column_visible(column_id, |visible| !visible)
    }

    fn set_column_visible(
        &mut self,
        column_id: &str,
        visible: impl FnOnce(bool) -> bool,
    ) -> Result<(), GridError> {
        self.ensure_alive()?;
        let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) else {
            log::warn!("unknown column '{}'", column_id);
            return Ok(());
        };

        let visible = visible(column.visible);
        if column.visible == visible {
            return Ok(());
        }
        column.visible = visible;

        // Global search only looks at visible columns.
        if !self.filter.search().is_empty() {
            self.recompute();
        }
        self.publish(GridEvent::ColumnVisibility {
            column_id: Some(column_id.to_string()),
            visible,
        });
        self.finish();
        Ok(())
    }
}
