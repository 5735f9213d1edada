//! Grid events and the per-instance event bus.

use std::fmt;

use crate::model::RowId;
use crate::query::FilterState;
use crate::query::SortState;

/// Snapshot of the derived counters carried by [`GridEvent::StateChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSummary {
    /// Rows after filtering (client) or the server total (server).
    pub total_rows: usize,
    /// Rows on the current page.
    pub visible_rows: usize,
    pub page_index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub selected_count: usize,
    pub loading: bool,
}

/// An event published by a [`DataGrid`](crate::DataGrid).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The grid finished construction.
    Init,
    /// The row collection was replaced or edited.
    DataChange { total: usize },
    /// A full data set was loaded, locally or from the remote source.
    DataLoad { rows: usize, total: usize },
    /// A remote fetch failed. The previous rows stay in place.
    DataError { message: String },
    /// The pipeline ran.
    StateChange(StateSummary),
    SortChange(SortState),
    FilterChange(FilterState),
    SearchChange { query: String },
    PageChange { page_index: usize, page_size: usize },
    SelectionChange {
        selected_count: usize,
        all_selected: bool,
        partially_selected: bool,
    },
    /// One row's selection flipped.
    RowSelect { id: RowId, selected: bool },
    /// A column was shown or hidden. `None` when the whole column set changed.
    ColumnVisibility {
        column_id: Option<String>,
        visible: bool,
    },
    /// The grid was destroyed. Always the last event.
    Destroy,
}

/// Discriminant of [`GridEvent`], used to subscribe to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Init,
    DataChange,
    DataLoad,
    DataError,
    StateChange,
    SortChange,
    FilterChange,
    SearchChange,
    PageChange,
    SelectionChange,
    RowSelect,
    ColumnVisibility,
    Destroy,
}

impl EventKind {
    /// Returns the event name, e.g. `"state:change"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Init => "init",
            EventKind::DataChange => "data:change",
            EventKind::DataLoad => "data:load",
            EventKind::DataError => "data:error",
            EventKind::StateChange => "state:change",
            EventKind::SortChange => "sort:change",
            EventKind::FilterChange => "filter:change",
            EventKind::SearchChange => "search:change",
            EventKind::PageChange => "page:change",
            EventKind::SelectionChange => "selection:change",
            EventKind::RowSelect => "row:select",
            EventKind::ColumnVisibility => "column:visibility",
            EventKind::Destroy => "destroy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GridEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::Init => EventKind::Init,
            GridEvent::DataChange { .. } => EventKind::DataChange,
            GridEvent::DataLoad { .. } => EventKind::DataLoad,
            GridEvent::DataError { .. } => EventKind::DataError,
            GridEvent::StateChange(_) => EventKind::StateChange,
            GridEvent::SortChange(_) => EventKind::SortChange,
            GridEvent::FilterChange(_) => EventKind::FilterChange,
            GridEvent::SearchChange { .. } => EventKind::SearchChange,
            GridEvent::PageChange { .. } => EventKind::PageChange,
            GridEvent::SelectionChange { .. } => EventKind::SelectionChange,
            GridEvent::RowSelect { .. } => EventKind::RowSelect,
            GridEvent::ColumnVisibility { .. } => EventKind::ColumnVisibility,
            GridEvent::Destroy => EventKind::Destroy,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Event handler.
pub type EventHandler = Box<dyn FnMut(&GridEvent) + Send>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: EventHandler,
}

/// Synchronous publish/subscribe hub owned by one grid.
///
/// Handlers run in subscription order on the thread that mutates the grid.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to one kind of event.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent) + Send + 'static,
    {
        self.add(Some(kind), Box::new(handler))
    }

    /// Subscribes to every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent) + Send + 'static,
    {
        self.add(None, Box::new(handler))
    }

    fn add(&mut self, kind: Option<EventKind>, handler: EventHandler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    /// Removes a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Delivers an event to every matching handler.
    pub fn publish(&mut self, event: &GridEvent) {
        let kind = event.kind();
        log::trace!("event {}", kind);
        for sub in &mut self.subscriptions {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(event);
            }
        }
    }

    /// Removes every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
