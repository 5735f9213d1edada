//! Row collection management.

use std::collections::BTreeMap;

use super::DataGrid;
use super::RowSet;
use crate::engine::AggregateSpec;
use crate::engine::aggregate;
use crate::error::GridError;
use crate::event::GridEvent;
use crate::model::Record;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Value;

impl DataGrid {
    /// Replaces every row.
    ///
    /// Fails with [`GridError::DuplicateRowId`] or [`GridError::MissingRowId`]
    /// before touching any state. In client mode selected ids that no longer
    /// exist are dropped; in server mode the selection spans pages and is
    /// kept as is.
    pub fn set_data(&mut self, records: Vec<Record>) -> Result<(), GridError> {
        self.ensure_alive()?;
        let rows = self.build_rows(records)?;
        self.replace_rows(rows);
        Ok(())
    }

    /// Shared tail of `set_data` and a successful reload.
    pub(super) fn replace_rows(&mut self, (rows, index): RowSet) {
        self.rows = rows;
        self.index = index;

        let before = self.selection.selected_count();
        if !self.is_server() {
            self.server_total = self.rows.len();
            let index = &self.index;
            self.selection.retain(|id| index.contains_key(id));
        }

        self.recompute();
        log::debug!("loaded {} rows", self.rows.len());

        let total = self.data_total();
        self.publish(GridEvent::DataChange { total });
        self.publish(GridEvent::DataLoad {
            rows: self.rows.len(),
            total,
        });
        if self.selection.selected_count() != before {
            self.publish_selection();
        }
        if let Some(callback) = self.options.on_data_change.clone() {
            callback(&self.rows);
        }
        self.finish();
    }

    /// Appends one row.
    pub fn add_row(&mut self, record: Record) -> Result<(), GridError> {
        self.ensure_alive()?;
        let position = self.rows.len();
        let id = self
            .row_id
            .extract(&record)
            .ok_or(GridError::MissingRowId { position })?;
        if self.index.contains_key(&id) {
            return Err(GridError::DuplicateRowId { id });
        }

        self.index.insert(id.clone(), position);
        self.rows.push(Row::new(id, record));
        self.server_total += 1;
        self.data_changed();
        Ok(())
    }

    /// Merges `patch` into the row with the given id.
    ///
    /// When the patch changes the row id the row is re-keyed and keeps its
    /// selection. The new id must not belong to another row.
    pub fn update_row(&mut self, id: &RowId, patch: Record) -> Result<(), GridError> {
        self.ensure_alive()?;
        let Some(&position) = self.index.get(id) else {
            log::warn!("update_row: unknown row id '{}'", id);
            return Ok(());
        };

        let mut record = self.rows[position].record().clone();
        record.merge(patch);
        let new_id = self
            .row_id
            .extract(&record)
            .ok_or(GridError::MissingRowId { position })?;

        if &new_id == id {
            *self.rows[position].record_mut() = record;
        } else {
            if self.index.contains_key(&new_id) {
                return Err(GridError::DuplicateRowId { id: new_id });
            }
            let old = &self.rows[position];
            let mut row = Row::new(new_id.clone(), record);
            row.expanded = old.expanded;
            row.disabled = old.disabled;
            self.rows[position] = row;
            self.index.remove(id);
            self.index.insert(new_id.clone(), position);
            if self.selection.remove(id) {
                self.selection.insert(new_id);
            }
        }

        self.data_changed();
        Ok(())
    }

    /// Removes the row with the given id and drops it from the selection.
    pub fn delete_row(&mut self, id: &RowId) -> Result<(), GridError> {
        self.ensure_alive()?;
        let Some(position) = self.index.get(id).copied() else {
            log::warn!("delete_row: unknown row id '{}'", id);
            return Ok(());
        };

        self.rows.remove(position);
        self.rebuild_index();
        self.server_total = self.server_total.saturating_sub(1);
        let was_selected = self.selection.remove(id);

        self.recompute();
        let total = self.data_total();
        self.publish(GridEvent::DataChange { total });
        if was_selected {
            self.publish_selection();
        }
        self.finish();
        Ok(())
    }

    /// Marks a row as disabled. Disabled rows cannot be selected and do not
    /// count towards the page's selection flags.
    pub fn set_row_disabled(&mut self, id: &RowId, disabled: bool) -> Result<(), GridError> {
        self.ensure_alive()?;
        let Some(&position) = self.index.get(id) else {
            log::warn!("set_row_disabled: unknown row id '{}'", id);
            return Ok(());
        };
        if self.rows[position].disabled == disabled {
            return Ok(());
        }

        self.rows[position].disabled = disabled;
        self.sync_selection();
        self.finish();
        Ok(())
    }

    pub fn set_row_expanded(&mut self, id: &RowId, expanded: bool) -> Result<(), GridError> {
        self.ensure_alive()?;
        let Some(&position) = self.index.get(id) else {
            log::warn!("set_row_expanded: unknown row id '{}'", id);
            return Ok(());
        };
        if self.rows[position].expanded == expanded {
            return Ok(());
        }

        self.rows[position].expanded = expanded;
        self.finish();
        Ok(())
    }

    /// Computes aggregates over the filtered rows.
    ///
    /// Keys are the aggregate labels, `column_function` unless set.
    pub fn aggregate(&self, specs: &[AggregateSpec]) -> Result<BTreeMap<String, Value>, GridError> {
        self.ensure_alive()?;
        Ok(aggregate::compute(&self.rows, &self.sorted, specs))
    }

    /// Total row count as a data consumer sees it.
    fn data_total(&self) -> usize {
        if self.is_server() {
            self.server_total
        } else {
            self.rows.len()
        }
    }

    fn data_changed(&mut self) {
        self.recompute();
        let total = self.data_total();
        self.publish(GridEvent::DataChange { total });
        if let Some(callback) = self.options.on_data_change.clone() {
            callback(&self.rows);
        }
        self.finish();
    }
}
