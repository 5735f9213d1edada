//! Per-instance plugin installation.

use super::DataGrid;
use crate::error::GridError;
use crate::plugin::Plugin;
use crate::plugin::PluginRegistry;

impl DataGrid {
    /// Installs `plugin` into this grid.
    ///
    /// Returns `Ok(false)` without calling `install` when a plugin with the
    /// same name is already installed.
    pub fn use_plugin<P: Plugin>(&mut self, plugin: P) -> Result<bool, GridError> {
        self.ensure_alive()?;
        if self.plugins.contains(plugin.name()) {
            log::warn!("plugin '{}' is already installed", plugin.name());
            return Ok(false);
        }

        let mut plugin: Box<dyn Plugin> = Box::new(plugin);
        plugin.install(self);
        log::debug!("installed plugin '{}'", plugin.name());
        self.plugins.insert(plugin);
        Ok(true)
    }

    /// Uninstalls the plugin named `name`. Returns `Ok(false)` if none is
    /// installed under that name.
    pub fn remove_plugin(&mut self, name: &str) -> Result<bool, GridError> {
        self.ensure_alive()?;
        match self.plugins.remove(name) {
            Some(mut plugin) => {
                plugin.uninstall(self);
                log::debug!("removed plugin '{}'", name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the installed plugin named `name` as its concrete type.
    pub fn plugin<T: Plugin>(&self, name: &str) -> Option<&T> {
        self.plugins.get(name)?.as_any().downcast_ref::<T>()
    }

    /// Returns the plugin registry of this grid.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }
}
