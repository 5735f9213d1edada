//! Server-mode reloads.
//!
//! A reload has two halves. [`DataGrid::begin_reload`] snapshots the query
//! into a [`PendingReload`] and hands out a ticket; the caller awaits
//! [`PendingReload::fetch`] and passes the result to
//! [`DataGrid::complete_reload`]. Tickets increase monotonically and only the
//! newest one is applied, so a slow response for an old query can never
//! overwrite a newer one. [`DataGrid::reload`] chains both halves.

use std::sync::Arc;

use chrono::Utc;

use super::DataGrid;
use super::RowSet;
use crate::error::GridError;
use crate::error::RemoteError;
use crate::event::GridEvent;
use crate::remote::DataSource;
use crate::remote::RemoteRequest;

/// Sequence number of one reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReloadTicket(u64);

impl ReloadTicket {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A fetch prepared by [`DataGrid::begin_reload`].
///
/// It owns everything the fetch needs, so it can be awaited while the grid
/// stays usable.
pub struct PendingReload {
    ticket: ReloadTicket,
    request: RemoteRequest,
    source: Arc<dyn DataSource>,
}

impl PendingReload {
    pub fn ticket(&self) -> ReloadTicket {
        self.ticket
    }

    /// The request that will be sent.
    pub fn request(&self) -> &RemoteRequest {
        &self.request
    }

    /// Performs the fetch.
    pub async fn fetch(&self) -> Result<serde_json::Value, RemoteError> {
        self.source.fetch(&self.request).await
    }
}

impl std::fmt::Debug for PendingReload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReload")
            .field("ticket", &self.ticket)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl DataGrid {
    /// Fetches the current page from the data source and applies it.
    ///
    /// Remote failures do not surface here: they are recorded in
    /// [`load_state`](Self::load_state), published as `data:error` and passed
    /// to the error callback, and the previous rows stay in place.
    pub async fn reload(&mut self) -> Result<(), GridError> {
        let Some(pending) = self.begin_reload()? else {
            return Ok(());
        };
        let result = pending.fetch().await;
        self.complete_reload(pending.ticket(), result)?;
        Ok(())
    }

    /// Starts a reload and marks the grid as loading.
    ///
    /// Returns `None`, after logging a warning, in client mode or when no data
    /// source is configured.
    pub fn begin_reload(&mut self) -> Result<Option<PendingReload>, GridError> {
        self.ensure_alive()?;
        if !self.is_server() {
            log::warn!("reload is only available in server mode");
            return Ok(None);
        }
        let Some(source) = self.source.clone() else {
            log::warn!("reload: no data source or endpoint url configured");
            return Ok(None);
        };

        self.reload_seq += 1;
        let ticket = ReloadTicket(self.reload_seq);
        let request = RemoteRequest::from_state(
            &self.sort,
            &self.filter,
            &self.pagination,
            &self.options.config.server.params,
        );
        log::debug!(
            "reload #{}: page {} size {}",
            ticket.0,
            request.page,
            request.page_size
        );

        self.load.loading = true;
        self.finish();
        Ok(Some(PendingReload {
            ticket,
            request,
            source,
        }))
    }

    /// Applies the outcome of a fetch.
    ///
    /// Returns `Ok(false)` and changes nothing when `ticket` is not the most
    /// recent one.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<serde_json::Value, RemoteError>,
    ) -> Result<bool, GridError> {
        self.ensure_alive()?;
        if ticket.0 != self.reload_seq {
            log::debug!(
                "discarding stale reload #{} (latest #{})",
                ticket.0,
                self.reload_seq
            );
            return Ok(false);
        }

        self.load.loading = false;
        match result.and_then(|body| self.load_page(&body)) {
            Ok((page_total, rows)) => {
                self.load.error = None;
                self.load.last_loaded_at = Some(Utc::now());
                self.needs_reload = false;
                self.server_total = page_total;
                self.replace_rows(rows);
            }
            Err(e) => {
                log::warn!("reload #{} failed: {}", ticket.0, e);
                self.load.error = Some(e.to_string());
                self.publish(GridEvent::DataError {
                    message: e.to_string(),
                });
                if let Some(callback) = self.options.on_error.clone() {
                    callback(&e);
                }
                self.finish();
            }
        }
        Ok(true)
    }

    fn load_page(&self, body: &serde_json::Value) -> Result<(usize, RowSet), RemoteError> {
        let page = (self.transformer)(body)?;
        let total = page.total;
        let rows = self
            .build_rows(page.data)
            .map_err(|e| RemoteError::parse(e.to_string()))?;
        Ok((total, rows))
    }
}
