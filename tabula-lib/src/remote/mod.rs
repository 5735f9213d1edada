//! Server-mode data sources.
//!
//! A [`DataSource`] turns a [`RemoteRequest`] into a raw JSON response; a
//! [`Transformer`] turns that response into a [`RemotePage`] of records plus
//! the server-side total.

mod http;

pub use http::HttpDataSource;
pub use http::HttpDataSourceBuilder;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::Record;
pub use crate::query::RemoteRequest;

/// A remote endpoint returning one page of rows.
///
/// The grid treats the endpoint as opaque: it sends sort, filter and
/// pagination state and trusts the returned order, membership and total.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the page described by `request`.
    async fn fetch(&self, request: &RemoteRequest) -> Result<serde_json::Value, RemoteError>;
}

/// One page of remote rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemotePage {
    pub data: Vec<Record>,
    /// Total matching rows on the server, across all pages.
    pub total: usize,
}

/// Maps a raw response to a [`RemotePage`].
pub type Transformer =
    Arc<dyn Fn(&serde_json::Value) -> Result<RemotePage, RemoteError> + Send + Sync>;

/// Returns the transformer that reads rows at `data_path` and the total at
/// `total_path`.
///
/// Paths are dot-separated (`"result.items"`). A response that is itself an
/// array is taken as the rows. A missing or non-numeric total falls back to
/// the number of rows.
pub fn path_transformer(data_path: impl Into<String>, total_path: impl Into<String>) -> Transformer {
    let data_path = data_path.into();
    let total_path = total_path.into();
    Arc::new(move |body: &serde_json::Value| -> Result<RemotePage, RemoteError> {
        let data = match body {
            serde_json::Value::Array(_) => body,
            _ => lookup(body, &data_path).ok_or_else(|| {
                RemoteError::parse_with_body(
                    format!("no rows at path '{}'", data_path),
                    body.to_string(),
                )
            })?,
        };

        let items = data.as_array().ok_or_else(|| {
            RemoteError::parse(format!("value at '{}' is not an array", data_path))
        })?;

        let data = items
            .iter()
            .cloned()
            .map(Record::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RemoteError::parse(e.to_string()))?;

        let total = lookup(body, &total_path)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(data.len());

        Ok(RemotePage { data, total })
    })
}

/// Follows a dot-separated path into a JSON value.
fn lookup<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        serde_json::Value::Object(map) => map.get(segment),
        serde_json::Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
