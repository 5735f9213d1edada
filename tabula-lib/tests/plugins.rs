//! Integration tests for the plugin registry and the shipped plugins.

use std::any::Any;
use std::sync::Arc;
use std::sync::Mutex;

use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TestLogger;
use tabula_lib::DataGrid;
use tabula_lib::error::ExportError;
use tabula_lib::event::EventKind;
use tabula_lib::event::SubscriptionId;
use tabula_lib::model::Column;
use tabula_lib::model::ColumnKind;
use tabula_lib::model::Formatter;
use tabula_lib::model::Record;
use tabula_lib::model::RowId;
use tabula_lib::model::Value;
use tabula_lib::options::GridOptions;
use tabula_lib::options::PaginationOptions;
use tabula_lib::options::VirtualScrollOptions;
use tabula_lib::plugin::ExportFormat;
use tabula_lib::plugin::ExportScope;
use tabula_lib::plugin::Exporter;
use tabula_lib::plugin::Plugin;
use tabula_lib::plugin::VirtualScroll;
use tabula_lib::query::ColumnFilter;
use tabula_lib::query::Direction;

fn products() -> Vec<Record> {
    [
        (1, "Widget", 2.5),
        (2, "Gadget, large", 10.0),
        (3, "Doohickey", 7.25),
        (4, "Sprocket", 1.0),
    ]
    .into_iter()
    .map(|(id, name, price)| {
        Record::new()
            .set("id", id as i64)
            .set("name", name)
            .set("price", price)
            .set("sku", format!("SKU-{}", id))
    })
    .collect()
}

fn options() -> GridOptions {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let money: Formatter = Arc::new(|value: &Value, _: &Record| match value.as_f64() {
        Some(n) => format!("${:.2}", n),
        None => String::new(),
    });

    GridOptions::new(vec![
        Column::new("id", "ID").kind(ColumnKind::Number),
        Column::new("name", "Name"),
        Column::new("price", "Price").kind(ColumnKind::Number),
        Column::new("sku", "SKU").hidden(),
    ])
    .with_data(products())
    .with_formatter("price", money)
}

// =============================================================================
// Registry
// =============================================================================

/// Records its lifecycle calls into a shared log.
struct Probe {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    subscription: Option<SubscriptionId>,
}

impl Probe {
    fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            subscription: None,
        }
    }
}

impl Plugin for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn install(&mut self, grid: &mut DataGrid) {
        self.log.lock().unwrap().push(format!("install {}", self.name));
        let log = Arc::clone(&self.log);
        let name = self.name;
        self.subscription = Some(grid.events_mut().subscribe(EventKind::SortChange, move |_| {
            log.lock().unwrap().push(format!("sort seen by {}", name));
        }));
    }

    fn uninstall(&mut self, grid: &mut DataGrid) {
        self.log.lock().unwrap().push(format!("uninstall {}", self.name));
        if let Some(id) = self.subscription.take() {
            grid.events_mut().unsubscribe(id);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_plugin_installed_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut grid = DataGrid::new(options()).unwrap();

    assert!(grid.use_plugin(Probe::new("probe", &log)).unwrap());
    assert!(!grid.use_plugin(Probe::new("probe", &log)).unwrap());
    assert_eq!(grid.plugins().names(), vec!["probe"]);

    grid.sort("id", None).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["install probe".to_string(), "sort seen by probe".to_string()]
    );
}

#[test]
fn test_remove_plugin_runs_uninstall() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut grid = DataGrid::new(options()).unwrap();
    grid.use_plugin(Probe::new("probe", &log)).unwrap();

    assert!(grid.remove_plugin("probe").unwrap());
    assert!(!grid.remove_plugin("probe").unwrap());
    grid.sort("id", None).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["install probe".to_string(), "uninstall probe".to_string()]
    );
    assert!(grid.plugins().is_empty());
}

#[test]
fn test_destroy_uninstalls_in_reverse_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut grid = DataGrid::new(options()).unwrap();
    grid.use_plugin(Probe::new("first", &log)).unwrap();
    grid.use_plugin(Probe::new("second", &log)).unwrap();

    grid.destroy();

    assert_eq!(
        log.lock().unwrap()[2..],
        ["uninstall second".to_string(), "uninstall first".to_string()]
    );
    assert!(grid.use_plugin(Probe::new("third", &log)).unwrap_err().is_destroyed());
}

#[test]
fn test_plugin_downcast() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut grid = DataGrid::new(options()).unwrap();
    grid.use_plugin(Probe::new("probe", &log)).unwrap();

    assert!(grid.plugin::<Probe>("probe").is_some());
    assert!(grid.plugin::<Exporter>("probe").is_none());
    assert!(grid.plugin::<Probe>("missing").is_none());
}

// =============================================================================
// Virtual scroll
// =============================================================================

#[test]
fn test_virtual_scroll_from_options() {
    let rows: Vec<Record> = (0..500i64).map(|i| Record::new().set("id", i)).collect();
    let mut grid = DataGrid::new(
        GridOptions::new(vec![Column::new("id", "ID").kind(ColumnKind::Number)])
            .with_data(rows)
            .with_pagination(PaginationOptions {
                enabled: false,
                ..PaginationOptions::default()
            })
            .with_virtual_scroll(VirtualScrollOptions {
                enabled: true,
                row_height: 20.0,
                overscan: 2,
            }),
    )
    .unwrap();

    let scroll = grid
        .plugin::<VirtualScroll>(VirtualScroll::NAME)
        .unwrap()
        .clone();
    assert_eq!(scroll.total_rows(), 500);

    scroll.set_viewport_height(200.0);
    scroll.scroll_to_index(100);
    let window = scroll.window();
    assert_eq!(window.first(), 98);
    assert_eq!(window.last(), 98 + 10 + 4);
    assert_eq!(window.total_height(), 10_000.0);

    // The window follows the visible row count.
    grid.add_filter(ColumnFilter::lt("id", 50i64)).unwrap();
    assert_eq!(scroll.total_rows(), 50);
    assert_eq!(scroll.scroll_offset(), 800.0);
    assert_eq!(scroll.window().last(), 49);
}

#[test]
fn test_virtual_scroll_stops_tracking_after_removal() {
    let mut grid = DataGrid::new(options()).unwrap();
    let scroll = VirtualScroll::new(30.0, 1);
    grid.use_plugin(scroll.clone()).unwrap();
    assert_eq!(scroll.total_rows(), 4);

    grid.remove_plugin(VirtualScroll::NAME).unwrap();
    grid.delete_row(&RowId::from(1)).unwrap();
    assert_eq!(scroll.total_rows(), 4);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_csv_visible_rows() {
    let mut grid = DataGrid::new(options()).unwrap();
    let exporter = Exporter::new();
    grid.use_plugin(exporter.clone()).unwrap();
    grid.sort("price", Some(Direction::Desc)).unwrap();

    let csv = exporter
        .export(&grid, ExportFormat::Csv, ExportScope::Visible)
        .unwrap();
    assert_eq!(
        csv,
        "ID,Name,Price\n\
         2,\"Gadget, large\",$10.00\n\
         3,Doohickey,$7.25\n\
         1,Widget,$2.50\n\
         4,Sprocket,$1.00\n"
    );
}

#[test]
fn test_export_scopes() {
    let mut grid = DataGrid::new(options().with_pagination(PaginationOptions {
        page_size: 2,
        page_size_options: Vec::new(),
        ..PaginationOptions::default()
    }))
    .unwrap();
    let exporter = Exporter::new().delimiter(b';').without_header();
    grid.use_plugin(exporter.clone()).unwrap();
    grid.select_row(&RowId::from(4)).unwrap();

    let visible = exporter
        .export(&grid, ExportFormat::Csv, ExportScope::Visible)
        .unwrap();
    assert_eq!(visible.lines().count(), 2);

    let filtered = exporter
        .export(&grid, ExportFormat::Csv, ExportScope::Filtered)
        .unwrap();
    assert_eq!(filtered.lines().count(), 4);

    let selected = exporter
        .export(&grid, ExportFormat::Csv, ExportScope::Selected)
        .unwrap();
    assert_eq!(selected, "4;Sprocket;$1.00\n");
}

#[test]
fn test_export_json() {
    let mut grid = DataGrid::new(options()).unwrap();
    let exporter = Exporter::new();
    grid.use_plugin(exporter.clone()).unwrap();
    grid.add_filter(ColumnFilter::eq("id", 3i64)).unwrap();

    let json = exporter
        .export(&grid, ExportFormat::Json, ExportScope::Filtered)
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([{ "id": "3", "name": "Doohickey", "price": "$7.25" }])
    );
}

#[test]
fn test_export_requires_installation() {
    let grid = DataGrid::new(options()).unwrap();
    let exporter = Exporter::new();

    let err = exporter
        .export(&grid, ExportFormat::Csv, ExportScope::Visible)
        .unwrap_err();
    assert!(matches!(err, ExportError::Detached(_)));
}

#[test]
fn test_export_is_bound_to_its_grid() {
    let mut home = DataGrid::new(options()).unwrap();
    let other = DataGrid::new(options()).unwrap();
    let exporter = Exporter::new();
    home.use_plugin(exporter.clone()).unwrap();

    assert!(exporter.is_installed_in(&home));
    assert!(!exporter.is_installed_in(&other));
    let err = exporter
        .export(&other, ExportFormat::Csv, ExportScope::Visible)
        .unwrap_err();
    assert!(matches!(err, ExportError::Detached(_)));

    // A separate exporter installed in `other` does not unlock this one.
    let mut other = other;
    other.use_plugin(Exporter::new()).unwrap();
    assert!(!exporter.is_installed_in(&other));

    home.remove_plugin(Exporter::NAME).unwrap();
    assert!(!exporter.is_installed_in(&home));
}
