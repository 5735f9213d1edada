//! Row selection.

use super::DataGrid;
use crate::error::GridError;
use crate::event::GridEvent;
use crate::model::RowId;

impl DataGrid {
    /// Selects a row. In single-selection mode any prior selection is
    /// cleared first.
    pub fn select_row(&mut self, id: &RowId) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.can_select(id) || self.selection.is_selected(id) {
            return Ok(());
        }

        if !self.options.config.selection.multiple {
            self.selection.clear();
        }
        self.selection.insert(id.clone());
        self.selection_changed(Some((id.clone(), true)));
        Ok(())
    }

    pub fn deselect_row(&mut self, id: &RowId) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.selection_enabled() {
            return Ok(());
        }
        if self.selection.remove(id) {
            self.selection_changed(Some((id.clone(), false)));
        }
        Ok(())
    }

    pub fn toggle_row_selection(&mut self, id: &RowId) -> Result<(), GridError> {
        if self.selection.is_selected(id) {
            self.deselect_row(id)
        } else {
            self.select_row(id)
        }
    }

    /// Selects every visible, enabled row. Does nothing in
    /// single-selection mode.
    pub fn select_all(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.selection_enabled() {
            return Ok(());
        }
        if !self.options.config.selection.multiple {
            log::warn!("select_all is not available in single-selection mode");
            return Ok(());
        }

        let ids: Vec<RowId> = self
            .visible
            .iter()
            .map(|&i| &self.rows[i])
            .filter(|r| !r.disabled)
            .map(|r| r.id().clone())
            .collect();
        let mut changed = false;
        for id in ids {
            changed |= self.selection.insert(id);
        }
        if changed {
            self.selection_changed(None);
        }
        Ok(())
    }

    /// Clears the whole selection, including rows on other pages.
    pub fn deselect_all(&mut self) -> Result<(), GridError> {
        self.ensure_alive()?;
        if !self.selection_enabled() {
            return Ok(());
        }
        if self.selection.clear() {
            self.selection_changed(None);
        }
        Ok(())
    }

    fn selection_enabled(&self) -> bool {
        let enabled = self.options.config.selection.enabled;
        if !enabled {
            log::warn!("selection is disabled");
        }
        enabled
    }

    fn can_select(&self, id: &RowId) -> bool {
        if !self.selection_enabled() {
            return false;
        }
        match self.row(id) {
            None => {
                log::warn!("cannot select unknown row '{}'", id);
                false
            }
            Some(row) if row.disabled => {
                log::warn!("row '{}' is disabled", id);
                false
            }
            Some(_) => true,
        }
    }

    /// Selection never reorders or filters rows, so only the flags are
    /// refreshed.
    fn selection_changed(&mut self, row: Option<(RowId, bool)>) {
        self.sync_selection();
        if let Some((id, selected)) = row {
            self.publish(GridEvent::RowSelect { id, selected });
        }
        self.publish_selection();
        self.finish();
    }
}
