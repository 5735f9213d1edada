//! Virtual scrolling: which rows a viewport needs to render.

use std::any::Any;
use std::ops::Range;
use std::sync::Arc;
use std::sync::RwLock;

use super::Plugin;
use crate::DataGrid;
use crate::event::EventKind;
use crate::event::GridEvent;
use crate::event::SubscriptionId;
use crate::options::VirtualScrollOptions;

/// The rows to render for one scroll position.
///
/// `first..=last` indexes into the grid's visible rows. The window is empty
/// when there are no rows or the row height is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtualWindow {
    first: usize,
    last: usize,
    total: usize,
    row_height: f64,
    empty: bool,
}

impl VirtualWindow {
    /// Computes the window.
    ///
    /// ```text
    /// first = max(0, floor(scroll_offset / row_height) - overscan)
    /// last  = min(total - 1, first + ceil(viewport_height / row_height) + 2 * overscan)
    /// ```
    pub fn compute(
        total: usize,
        row_height: f64,
        viewport_height: f64,
        scroll_offset: f64,
        overscan: usize,
    ) -> Self {
        if total == 0 || row_height <= 0.0 || !row_height.is_finite() {
            return Self {
                total,
                row_height,
                empty: true,
                ..Self::default()
            };
        }

        let top_row = (scroll_offset.max(0.0) / row_height).floor() as usize;
        let first = top_row.saturating_sub(overscan).min(total - 1);
        let in_view = (viewport_height.max(0.0) / row_height).ceil() as usize;
        let last = first
            .saturating_add(in_view)
            .saturating_add(overscan.saturating_mul(2))
            .min(total - 1);

        Self {
            first,
            last,
            total,
            row_height,
            empty: false,
        }
    }

    /// Index of the first rendered row.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the last rendered row (inclusive).
    pub fn last(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Rendered indices as a half-open range.
    pub fn range(&self) -> Range<usize> {
        if self.empty {
            0..0
        } else {
            self.first..self.last + 1
        }
    }

    /// Height of all rows together.
    pub fn total_height(&self) -> f64 {
        if self.row_height > 0.0 {
            self.total as f64 * self.row_height
        } else {
            0.0
        }
    }

    /// Height of the spacer above the first rendered row.
    pub fn offset_top(&self) -> f64 {
        if self.empty {
            0.0
        } else {
            self.first as f64 * self.row_height
        }
    }
}

#[derive(Debug)]
struct ScrollInner {
    row_height: f64,
    overscan: usize,
    viewport_height: f64,
    scroll_offset: f64,
    total_rows: usize,
    subscription: Option<SubscriptionId>,
}

impl ScrollInner {
    fn max_offset(&self) -> f64 {
        (self.total_rows as f64 * self.row_height - self.viewport_height).max(0.0)
    }

    fn clamp_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_offset());
    }
}

/// Plugin tracking the grid's visible rows for a scrolling viewport.
///
/// The handle is cheap to clone. Keep one clone and install the other; the
/// installed copy follows `state:change` events and the kept one reads the
/// current window.
///
/// # Example
///
/// ```
/// use tabula_lib::plugin::VirtualScroll;
///
/// let scroll = VirtualScroll::new(30.0, 2);
/// scroll.set_viewport_height(300.0);
/// scroll.scroll_to_index(40);
/// let window = scroll.window();
/// ```
#[derive(Debug, Clone)]
pub struct VirtualScroll {
    inner: Arc<RwLock<ScrollInner>>,
}

impl VirtualScroll {
    /// Registry name of the plugin.
    pub const NAME: &'static str = "virtual-scroll";

    pub fn new(row_height: f64, overscan: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ScrollInner {
                row_height,
                overscan,
                viewport_height: 0.0,
                scroll_offset: 0.0,
                total_rows: 0,
                subscription: None,
            })),
        }
    }

    pub fn from_options(options: &VirtualScrollOptions) -> Self {
        Self::new(options.row_height, options.overscan)
    }

    fn read<T>(&self, f: impl FnOnce(&ScrollInner) -> T) -> T {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut ScrollInner) -> T) -> T {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Sets the viewport height and re-clamps the scroll offset.
    pub fn set_viewport_height(&self, height: f64) {
        self.write(|s| {
            s.viewport_height = height.max(0.0);
            s.clamp_offset();
        });
    }

    /// Scrolls to a pixel offset, clamped to the scrollable range.
    pub fn scroll_to(&self, offset: f64) {
        self.write(|s| {
            s.scroll_offset = offset;
            s.clamp_offset();
        });
    }

    /// Scrolls so that row `index` is at the top of the viewport.
    pub fn scroll_to_index(&self, index: usize) {
        self.write(|s| {
            s.scroll_offset = index as f64 * s.row_height;
            s.clamp_offset();
        });
    }

    pub fn scroll_offset(&self) -> f64 {
        self.read(|s| s.scroll_offset)
    }

    /// Number of rows being virtualized.
    pub fn total_rows(&self) -> usize {
        self.read(|s| s.total_rows)
    }

    /// Returns the window for the current scroll position.
    pub fn window(&self) -> VirtualWindow {
        self.read(|s| {
            VirtualWindow::compute(
                s.total_rows,
                s.row_height,
                s.viewport_height,
                s.scroll_offset,
                s.overscan,
            )
        })
    }

    fn set_total_rows(&self, total: usize) {
        self.write(|s| {
            s.total_rows = total;
            s.clamp_offset();
        });
    }
}

impl Plugin for VirtualScroll {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn install(&mut self, grid: &mut DataGrid) {
        self.set_total_rows(grid.visible_rows().len());

        let handle = self.clone();
        let id = grid
            .events_mut()
            .subscribe(EventKind::StateChange, move |event| {
                if let GridEvent::StateChange(summary) = event {
                    handle.set_total_rows(summary.visible_rows);
                }
            });
        self.write(|s| s.subscription = Some(id));
    }

    fn uninstall(&mut self, grid: &mut DataGrid) {
        if let Some(id) = self.write(|s| s.subscription.take()) {
            grid.events_mut().unsubscribe(id);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
