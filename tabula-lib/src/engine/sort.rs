//! Sort engine: stable, multi-key ordering of row indices.

use std::cmp::Ordering;

use super::compare;
use crate::model::Column;
use crate::model::ColumnHooks;
use crate::model::ColumnKind;
use crate::model::Comparator;
use crate::model::Row;
use crate::model::Value;
use crate::query::Direction;
use crate::query::SortState;

struct ResolvedKey<'a> {
    column_id: &'a str,
    direction: Direction,
    kind: ColumnKind,
    custom: Option<&'a Comparator>,
}

impl ResolvedKey<'_> {
    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        if let Some(custom) = self.custom {
            return self.direction.apply(custom(a, b));
        }
        // Nulls go last whatever the direction.
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .direction
                .apply(compare::compare(a, b, self.kind, false)),
        }
    }
}

/// Returns `indices` reordered by `state`.
///
/// Keys apply in order and the first non-equal one decides. Ties keep their
/// input order. An empty state returns the input unchanged. `Auto` columns
/// are sorted under the one kind all their cells share.
pub fn apply(
    rows: &[Row],
    indices: &[usize],
    state: &SortState,
    columns: &[Column],
    hooks: &ColumnHooks,
) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    if state.is_empty() {
        return sorted;
    }

    let keys: Vec<ResolvedKey<'_>> = state
        .keys()
        .iter()
        .map(|key| {
            let declared = columns
                .iter()
                .find(|c| c.id == key.column_id)
                .map(|c| c.kind)
                .unwrap_or_default();
            let kind = match declared {
                ColumnKind::Auto => {
                    compare::resolve_kind(indices.iter().map(|&i| rows[i].value(&key.column_id)))
                }
                kind => kind,
            };
            ResolvedKey {
                column_id: &key.column_id,
                direction: key.direction,
                kind,
                custom: hooks.comparator(&key.column_id),
            }
        })
        .collect();

    sorted.sort_by(|&a, &b| {
        let (a, b) = (&rows[a], &rows[b]);
        keys.iter()
            .map(|key| key.compare(a.value(key.column_id), b.value(key.column_id)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    sorted
}
