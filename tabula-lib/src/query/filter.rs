//! Filter state: column-scoped filters plus a global search string.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;

/// Comparison applied by a column filter.
///
/// Operator names round-trip through their camelCase text form (see
/// [`FilterOperator::as_str`]). Names that are not recognised become
/// [`FilterOperator::Unsupported`], which never matches a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Inclusive range; needs exactly two `values`.
    Between,
    /// Matches any of `values`.
    In,
    /// Matches none of `values`.
    NotIn,
    IsNull,
    IsNotNull,
    /// An operator name this engine does not know.
    Unsupported(String),
}

impl FilterOperator {
    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "notEquals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notContains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::GreaterOrEqual => "greaterOrEqual",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::LessOrEqual => "lessOrEqual",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
            FilterOperator::Unsupported(name) => name,
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(name: &str) -> Self {
        match name {
            "equals" | "eq" => FilterOperator::Equals,
            "notEquals" | "ne" => FilterOperator::NotEquals,
            "contains" => FilterOperator::Contains,
            "notContains" => FilterOperator::NotContains,
            "startsWith" => FilterOperator::StartsWith,
            "endsWith" => FilterOperator::EndsWith,
            "greaterThan" | "gt" => FilterOperator::GreaterThan,
            "greaterOrEqual" | "gte" => FilterOperator::GreaterOrEqual,
            "lessThan" | "lt" => FilterOperator::LessThan,
            "lessOrEqual" | "lte" => FilterOperator::LessOrEqual,
            "between" => FilterOperator::Between,
            "in" => FilterOperator::In,
            "notIn" => FilterOperator::NotIn,
            "isNull" => FilterOperator::IsNull,
            "isNotNull" => FilterOperator::IsNotNull,
            other => FilterOperator::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        FilterOperator::from(name.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

/// A filter scoped to one column.
///
/// # Example
///
/// ```
/// use tabula_lib::query::ColumnFilter;
///
/// let adults = ColumnFilter::ge("age", 18i64);
/// let named = ColumnFilter::contains("name", "ann");
/// let band = ColumnFilter::between("age", 20i64, 30i64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    /// The column the filter applies to.
    #[serde(rename = "column")]
    pub column_id: String,
    /// The comparison.
    pub operator: FilterOperator,
    /// Operand for single-value operators.
    #[serde(default)]
    pub value: Value,
    /// Operands for `Between`, `In` and `NotIn`.
    #[serde(default)]
    pub values: Vec<Value>,
}

impl ColumnFilter {
    /// Creates a filter with a single operand.
    pub fn new(
        column_id: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            operator,
            value: value.into(),
            values: Vec::new(),
        }
    }

    /// Creates an equality filter.
    pub fn eq(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::Equals, value)
    }

    /// Creates a not-equal filter.
    pub fn ne(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::NotEquals, value)
    }

    /// Creates a greater-than filter.
    pub fn gt(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::GreaterThan, value)
    }

    /// Creates a greater-than-or-equal filter.
    pub fn ge(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::GreaterOrEqual, value)
    }

    /// Creates a less-than filter.
    pub fn lt(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::LessThan, value)
    }

    /// Creates a less-than-or-equal filter.
    pub fn le(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOperator::LessOrEqual, value)
    }

    /// Creates a substring filter.
    pub fn contains(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column_id, FilterOperator::Contains, value.into())
    }

    /// Creates a prefix filter.
    pub fn starts_with(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column_id, FilterOperator::StartsWith, value.into())
    }

    /// Creates a suffix filter.
    pub fn ends_with(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column_id, FilterOperator::EndsWith, value.into())
    }

    /// Creates an inclusive range filter.
    pub fn between(
        column_id: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            operator: FilterOperator::Between,
            value: Value::Null,
            values: vec![low.into(), high.into()],
        }
    }

    /// Creates a membership filter.
    pub fn one_of<V: Into<Value>>(
        column_id: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            operator: FilterOperator::In,
            value: Value::Null,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an is-null filter.
    pub fn is_null(column_id: impl Into<String>) -> Self {
        Self::new(column_id, FilterOperator::IsNull, Value::Null)
    }

    /// Creates an is-not-null filter.
    pub fn is_not_null(column_id: impl Into<String>) -> Self {
        Self::new(column_id, FilterOperator::IsNotNull, Value::Null)
    }
}

/// Column filters plus the global free-text search.
///
/// At most one filter exists per column. An empty list with an empty search
/// is the identity filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    filters: Vec<ColumnFilter>,
    search: String,
}

impl FilterState {
    /// Creates an identity filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the column filters in insertion order.
    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    /// Returns the global search string.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns the filter for a column, if any.
    pub fn get(&self, column_id: &str) -> Option<&ColumnFilter> {
        self.filters.iter().find(|f| f.column_id == column_id)
    }

    /// Returns `true` if no filter and no search is active.
    pub fn is_identity(&self) -> bool {
        self.filters.is_empty() && self.search.is_empty()
    }

    /// Adds a filter, replacing any existing filter for the same column in place.
    pub fn upsert(&mut self, filter: ColumnFilter) {
        match self.filters.iter_mut().find(|f| f.column_id == filter.column_id) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
    }

    /// Replaces all column filters; later entries win for a repeated column.
    pub fn set_filters(&mut self, filters: impl IntoIterator<Item = ColumnFilter>) {
        self.filters.clear();
        for filter in filters {
            self.upsert(filter);
        }
    }

    /// Removes the filter for a column. Returns `true` if one was removed.
    pub fn remove(&mut self, column_id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.column_id != column_id);
        self.filters.len() != before
    }

    /// Removes all column filters, keeping the search string.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Sets the global search string.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }
}
