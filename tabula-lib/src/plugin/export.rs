//! CSV and JSON export of grid rows.

use std::any::Any;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Plugin;
use crate::DataGrid;
use crate::engine::compare;
use crate::error::ExportError;
use crate::model::Column;
use crate::model::Row;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Which rows to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// The current page.
    #[default]
    Visible,
    /// Every row passing the filters, in sorted order.
    Filtered,
    /// Selected rows present in the grid, in row order.
    Selected,
}

/// Plugin exporting rows with their formatted cell values.
///
/// Only visible columns are exported, with custom formatters applied. CSV
/// output starts with a header of column titles; JSON output is an array of
/// objects keyed by column id.
///
/// # Example
///
/// ```ignore
/// let exporter = Exporter::new();
/// grid.use_plugin(exporter.clone())?;
/// let csv = exporter.export(&grid, ExportFormat::Csv, ExportScope::Filtered)?;
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    delimiter: u8,
    include_header: bool,
    // Shared by clones; identifies this exporter in a grid's registry.
    handle: Arc<()>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Registry name of the plugin.
    pub const NAME: &'static str = "export";

    /// Creates a comma-separated exporter with a header row.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
            handle: Arc::new(()),
        }
    }

    /// Sets the CSV field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Omits the CSV header row.
    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    /// Returns `true` if this exporter (or a clone) is installed in `grid`.
    pub fn is_installed_in(&self, grid: &DataGrid) -> bool {
        grid.plugin::<Exporter>(Self::NAME)
            .is_some_and(|installed| Arc::ptr_eq(&installed.handle, &self.handle))
    }

    /// Exports `scope` rows of `grid` as `format`.
    ///
    /// Fails with [`ExportError::Detached`] unless this exporter (or a clone)
    /// is installed in `grid`.
    pub fn export(
        &self,
        grid: &DataGrid,
        format: ExportFormat,
        scope: ExportScope,
    ) -> Result<String, ExportError> {
        if !self.is_installed_in(grid) {
            return Err(ExportError::Detached(Self::NAME.to_string()));
        }

        let rows = match scope {
            ExportScope::Visible => grid.visible_rows(),
            ExportScope::Filtered => grid.sorted_rows(),
            ExportScope::Selected => grid.selected_rows(),
        };
        let columns = grid.visible_columns();

        log::debug!("exporting {} rows as {:?}", rows.len(), format);
        match format {
            ExportFormat::Csv => self.to_csv(grid, &columns, &rows),
            ExportFormat::Json => to_json(grid, &columns, &rows),
        }
    }

    fn to_csv(&self, grid: &DataGrid, columns: &[&Column], rows: &[&Row]) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        if self.include_header {
            writer.write_record(columns.iter().map(|c| c.title.as_str()))?;
        }
        for row in rows {
            writer.write_record(
                columns
                    .iter()
                    .map(|c| compare::format_cell(c, row.record(), grid.hooks())),
            )?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn to_json(grid: &DataGrid, columns: &[&Column], rows: &[&Row]) -> Result<String, ExportError> {
    let items: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let object = columns
                .iter()
                .map(|c| {
                    let text = compare::format_cell(c, row.record(), grid.hooks());
                    (c.id.clone(), serde_json::Value::String(text))
                })
                .collect::<serde_json::Map<_, _>>();
            serde_json::Value::Object(object)
        })
        .collect();

    Ok(serde_json::to_string(&items)?)
}

impl Plugin for Exporter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn install(&mut self, _grid: &mut DataGrid) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}
