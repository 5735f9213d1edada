//! Filter engine: column filters AND global search.

use std::cmp::Ordering;

use super::compare;
use crate::model::Column;
use crate::model::ColumnHooks;
use crate::model::ColumnKind;
use crate::model::Row;
use crate::model::Value;
use crate::query::ColumnFilter;
use crate::query::FilterOperator;
use crate::query::FilterState;

/// Everything the filter engine needs besides the rows and the filter state.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub columns: &'a [Column],
    pub hooks: &'a ColumnHooks,
    pub case_sensitive: bool,
    /// Restricts global search to these column ids when non-empty.
    pub search_fields: &'a [String],
    /// Shorter (trimmed) search strings are ignored.
    pub min_search_length: usize,
}

impl<'a> FilterContext<'a> {
    /// Creates a context with case-insensitive matching over all columns.
    pub fn new(columns: &'a [Column], hooks: &'a ColumnHooks) -> Self {
        Self {
            columns,
            hooks,
            case_sensitive: false,
            search_fields: &[],
            min_search_length: 1,
        }
    }

    fn kind_of(&self, column_id: &str) -> ColumnKind {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.kind)
            .unwrap_or_default()
    }
}

/// Returns the indices of `rows` that pass every column filter and the
/// global search, in their original order.
pub fn apply(rows: &[Row], state: &FilterState, ctx: &FilterContext<'_>) -> Vec<usize> {
    let search = effective_search(state.search(), ctx);

    if state.filters().is_empty() && search.is_none() {
        return (0..rows.len()).collect();
    }

    let search_columns = search_columns(ctx);

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            state.filters().iter().all(|f| row_matches(row, f, ctx))
                && search
                    .as_deref()
                    .is_none_or(|q| row_matches_search(row, q, &search_columns, ctx))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Returns `true` if `row` passes `filter`.
pub fn row_matches(row: &Row, filter: &ColumnFilter, ctx: &FilterContext<'_>) -> bool {
    let value = row.value(&filter.column_id);
    if let Some(custom) = ctx.hooks.filter(&filter.column_id) {
        return custom(value, filter, row.record());
    }
    matches(value, filter, ctx.kind_of(&filter.column_id), ctx.case_sensitive)
}

/// Applies one operator to a cell value.
///
/// A null cell only satisfies `IsNull`, `NotEquals` / `NotContains` /
/// `NotIn` against a non-null operand, and `Equals` null.
pub fn matches(value: &Value, filter: &ColumnFilter, kind: ColumnKind, case_sensitive: bool) -> bool {
    let cmp = |operand: &Value| ordering(value, operand, kind, case_sensitive);

    match &filter.operator {
        FilterOperator::IsNull => value.is_null(),
        FilterOperator::IsNotNull => !value.is_null(),
        FilterOperator::Equals => cmp(&filter.value) == Some(Ordering::Equal),
        FilterOperator::NotEquals => cmp(&filter.value) != Some(Ordering::Equal),
        FilterOperator::GreaterThan => cmp(&filter.value) == Some(Ordering::Greater),
        FilterOperator::GreaterOrEqual => {
            matches!(cmp(&filter.value), Some(Ordering::Greater | Ordering::Equal))
        }
        FilterOperator::LessThan => cmp(&filter.value) == Some(Ordering::Less),
        FilterOperator::LessOrEqual => {
            matches!(cmp(&filter.value), Some(Ordering::Less | Ordering::Equal))
        }
        FilterOperator::Between => match filter.values.as_slice() {
            [low, high] => {
                matches!(cmp(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cmp(high), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        FilterOperator::In => filter
            .values
            .iter()
            .any(|v| cmp(v) == Some(Ordering::Equal)),
        FilterOperator::NotIn => !filter
            .values
            .iter()
            .any(|v| cmp(v) == Some(Ordering::Equal)),
        FilterOperator::Contains => {
            text_test(value, &filter.value, case_sensitive, |h, n| h.contains(n))
        }
        FilterOperator::NotContains => {
            !text_test(value, &filter.value, case_sensitive, |h, n| h.contains(n))
        }
        FilterOperator::StartsWith => {
            text_test(value, &filter.value, case_sensitive, |h, n| h.starts_with(n))
        }
        FilterOperator::EndsWith => {
            text_test(value, &filter.value, case_sensitive, |h, n| h.ends_with(n))
        }
        FilterOperator::Unsupported(name) => {
            log::debug!("filter operator '{}' is not supported; row excluded", name);
            false
        }
    }
}

/// `None` when exactly one side is null.
fn ordering(value: &Value, operand: &Value, kind: ColumnKind, case_sensitive: bool) -> Option<Ordering> {
    match (value.is_null(), operand.is_null()) {
        (true, true) => Some(Ordering::Equal),
        (false, false) => Some(compare::compare(value, operand, kind, case_sensitive)),
        _ => None,
    }
}

fn text_test(
    value: &Value,
    needle: &Value,
    case_sensitive: bool,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    if value.is_null() {
        return false;
    }
    let (hay, needle) = (value.to_string(), needle.to_string());
    if case_sensitive {
        test(&hay, &needle)
    } else {
        test(&compare::fold(&hay), &compare::fold(&needle))
    }
}

/// Trimmed search text, or `None` when it is too short to apply.
fn effective_search(search: &str, ctx: &FilterContext<'_>) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() || trimmed.chars().count() < ctx.min_search_length {
        return None;
    }
    Some(if ctx.case_sensitive {
        trimmed.to_string()
    } else {
        compare::fold(trimmed)
    })
}

fn search_columns<'a>(ctx: &FilterContext<'a>) -> Vec<&'a Column> {
    if ctx.search_fields.is_empty() {
        ctx.columns
            .iter()
            .filter(|c| c.filterable && c.visible)
            .collect()
    } else {
        ctx.columns
            .iter()
            .filter(|c| ctx.search_fields.contains(&c.id))
            .collect()
    }
}

fn row_matches_search(row: &Row, query: &str, columns: &[&Column], ctx: &FilterContext<'_>) -> bool {
    columns.iter().any(|column| {
        if row.value(&column.id).is_null() {
            return false;
        }
        let text = compare::format_cell(column, row.record(), ctx.hooks);
        if ctx.case_sensitive {
            text.contains(query)
        } else {
            compare::fold(&text).contains(query)
        }
    })
}
