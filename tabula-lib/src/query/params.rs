//! Remote request parameters and their query-string / JSON-body forms.

use std::collections::BTreeMap;

use serde_json::json;
use url::Url;

use super::ColumnFilter;
use super::FilterState;
use super::PaginationState;
use super::SortKey;
use super::SortState;
use crate::error::RemoteError;

/// The state a server-mode grid sends to its endpoint.
///
/// `page` is 1-based on the wire. Static `params` are merged into both the
/// query string and the body; they never override the grid's own keys.
///
/// # Wire shape
///
/// ```text
/// page, pageSize, sortBy, sortOrder,
/// multiSort: [{ column, direction, priority }],
/// search,
/// filters: [{ column, operator, value, values }]
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteRequest {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub sort: Vec<SortKey>,
    pub search: String,
    pub filters: Vec<ColumnFilter>,
    pub params: BTreeMap<String, serde_json::Value>,
}

impl RemoteRequest {
    /// Builds a request from the grid's current state.
    pub fn from_state(
        sort: &SortState,
        filter: &FilterState,
        pagination: &PaginationState,
        params: &BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            page: pagination.page_index() + 1,
            page_size: pagination.page_size(),
            sort: sort.keys().to_vec(),
            search: filter.search().to_string(),
            filters: filter.filters().to_vec(),
            params: params.clone(),
        }
    }

    /// Returns the JSON body for non-GET requests.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        for (key, value) in &self.params {
            body.insert(key.clone(), value.clone());
        }

        body.insert("page".into(), json!(self.page));
        body.insert("pageSize".into(), json!(self.page_size));
        if let Some(first) = self.sort.first() {
            body.insert("sortBy".into(), json!(first.column_id));
            body.insert("sortOrder".into(), json!(first.direction.as_str()));
        }
        if self.sort.len() > 1 {
            body.insert("multiSort".into(), multi_sort_json(&self.sort));
        }
        body.insert("search".into(), json!(self.search));
        body.insert("filters".into(), filters_json(&self.filters));

        serde_json::Value::Object(body)
    }

    /// Returns the query-string pairs for GET requests.
    ///
    /// `multiSort` and `filters` are JSON-encoded. Empty search and filter
    /// lists are omitted.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];

        if let Some(first) = self.sort.first() {
            pairs.push(("sortBy".to_string(), first.column_id.clone()));
            pairs.push(("sortOrder".to_string(), first.direction.as_str().to_string()));
        }
        if self.sort.len() > 1 {
            pairs.push((
                "multiSort".to_string(),
                multi_sort_json(&self.sort).to_string(),
            ));
        }
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        if !self.filters.is_empty() {
            pairs.push(("filters".to_string(), filters_json(&self.filters).to_string()));
        }

        for (key, value) in &self.params {
            if pairs.iter().any(|(k, _)| k == key) {
                continue;
            }
            pairs.push((key.clone(), param_to_string(value)));
        }

        pairs
    }

    /// Appends the query-string pairs to `base`.
    pub fn to_url(&self, base: &str) -> Result<Url, RemoteError> {
        let mut url =
            Url::parse(base).map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.query_pairs_mut().extend_pairs(self.to_query_pairs());
        Ok(url)
    }
}

fn multi_sort_json(keys: &[SortKey]) -> serde_json::Value {
    keys.iter()
        .enumerate()
        .map(|(priority, key)| {
            json!({
                "column": key.column_id,
                "direction": key.direction.as_str(),
                "priority": priority,
            })
        })
        .collect()
}

fn filters_json(filters: &[ColumnFilter]) -> serde_json::Value {
    filters
        .iter()
        .map(|f| {
            let mut obj = json!({
                "column": f.column_id,
                "operator": f.operator.as_str(),
                "value": f.value.to_json(),
            });
            if !f.values.is_empty() {
                obj["values"] = f.values.iter().map(|v| v.to_json()).collect();
            }
            obj
        })
        .collect()
}

/// Strings go through as-is; everything else as compact JSON.
fn param_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
