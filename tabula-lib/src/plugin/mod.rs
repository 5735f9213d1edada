//! Plugin extension point.
//!
//! Plugins are installed into one grid instance with
//! [`DataGrid::use_plugin`](crate::DataGrid::use_plugin). There is no global
//! registry: each grid owns its [`PluginRegistry`].

mod export;
mod virtual_scroll;

pub use export::*;
pub use virtual_scroll::*;

use std::any::Any;

use crate::DataGrid;

/// A grid extension.
///
/// `install` runs once, when the plugin is added. `uninstall` runs when the
/// plugin is removed or the grid is destroyed; it should undo whatever
/// `install` registered (typically event subscriptions).
pub trait Plugin: Any + Send {
    /// Unique name within one grid.
    fn name(&self) -> &str;

    /// Hooks the plugin into `grid`.
    fn install(&mut self, grid: &mut DataGrid);

    /// Unhooks the plugin from `grid`.
    fn uninstall(&mut self, _grid: &mut DataGrid) {}

    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Installed plugins of one grid, in installation order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a plugin named `name` is installed.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Returns the installed plugin named `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Returns the names of installed plugins.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub(crate) fn insert(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Box<dyn Plugin>> {
        let position = self.plugins.iter().position(|p| p.name() == name)?;
        Some(self.plugins.remove(position))
    }

    /// Removes every plugin, most recently installed first.
    pub(crate) fn drain(&mut self) -> Vec<Box<dyn Plugin>> {
        let mut plugins = std::mem::take(&mut self.plugins);
        plugins.reverse();
        plugins
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
