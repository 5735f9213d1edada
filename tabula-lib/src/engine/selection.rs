//! Selection tracking by row identity.

use std::collections::HashSet;

use crate::model::Row;
use crate::model::RowId;

/// Selected row ids plus flags derived from the visible page.
///
/// The id set is the only source of truth. `all_selected` and
/// `partially_selected` are recomputed against the rows that are visible and
/// not disabled; they say nothing about off-page selections, which still count
/// in [`selected_count`](Self::selected_count).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    selected: HashSet<RowId>,
    all_selected: bool,
    partially_selected: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected ids.
    pub fn selected_ids(&self) -> &HashSet<RowId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected ids, on or off the current page.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Every selectable visible row is selected (and there is at least one).
    pub fn all_selected(&self) -> bool {
        self.all_selected
    }

    /// Some, but not all, selectable visible rows are selected.
    pub fn partially_selected(&self) -> bool {
        self.partially_selected
    }

    /// Adds an id. Returns `true` if it was not selected before.
    pub(crate) fn insert(&mut self, id: RowId) -> bool {
        self.selected.insert(id)
    }

    /// Removes an id. Returns `true` if it was selected.
    pub(crate) fn remove(&mut self, id: &RowId) -> bool {
        self.selected.remove(id)
    }

    /// Clears the id set. Returns `true` if anything was selected.
    pub(crate) fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Drops ids for which `keep` returns `false`.
    pub(crate) fn retain(&mut self, keep: impl Fn(&RowId) -> bool) {
        self.selected.retain(|id| keep(id));
    }

    /// Recomputes the derived flags over `visible` indices into `rows`.
    pub(crate) fn recompute(&mut self, rows: &[Row], visible: &[usize]) {
        let mut selectable = 0usize;
        let mut selected = 0usize;
        for row in visible.iter().map(|&i| &rows[i]).filter(|r| !r.disabled) {
            selectable += 1;
            if self.selected.contains(row.id()) {
                selected += 1;
            }
        }
        self.all_selected = selectable > 0 && selected == selectable;
        self.partially_selected = selected > 0 && selected < selectable;
    }
}
