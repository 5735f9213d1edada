//! Integration tests for state preservation across grid instances.

use std::sync::Arc;

use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TestLogger;
use tabula_lib::DataGrid;
use tabula_lib::model::Column;
use tabula_lib::model::ColumnKind;
use tabula_lib::model::Record;
use tabula_lib::model::RowId;
use tabula_lib::options::GridOptions;
use tabula_lib::query::ColumnFilter;
use tabula_lib::query::Direction;
use tabula_lib::store::MemoryStore;
use tabula_lib::store::PersistedState;
use tabula_lib::store::SqliteStore;
use tabula_lib::store::StateStore;

fn records() -> Vec<Record> {
    (1..=40i64)
        .map(|i| {
            Record::new()
                .set("id", i)
                .set("score", (i * 7) % 13)
                .set("group", if i % 3 == 0 { "x" } else { "y" })
        })
        .collect()
}

fn options(store: Arc<dyn StateStore>) -> GridOptions {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    GridOptions::new(vec![
        Column::new("id", "ID").kind(ColumnKind::Number),
        Column::new("score", "Score").kind(ColumnKind::Number),
        Column::new("group", "Group"),
    ])
    .with_data(records())
    .with_page_size(10)
    .with_preserve_state("scores", store)
}

fn visible_ids(grid: &DataGrid) -> Vec<String> {
    grid.visible_rows()
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

fn customise(grid: &mut DataGrid) {
    grid.add_filter(ColumnFilter::eq("group", "y")).unwrap();
    grid.sort("score", Some(Direction::Desc)).unwrap();
    grid.go_to_page(1).unwrap();
    grid.select_row(&RowId::from(2)).unwrap();
    grid.hide_column("group").unwrap();
}

fn assert_restored(original: &DataGrid, restored: &DataGrid) {
    assert_eq!(visible_ids(restored), visible_ids(original));
    assert_eq!(restored.sort_state(), original.sort_state());
    assert_eq!(restored.filter_state(), original.filter_state());
    assert_eq!(restored.pagination().page_index(), 1);
    assert!(restored.selection_state().is_selected(&RowId::from(2)));
    assert_eq!(restored.visible_columns().len(), 2);
}

#[test]
fn test_restore_from_memory_store() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

    let mut original = DataGrid::new(options(Arc::clone(&store))).unwrap();
    customise(&mut original);

    let restored = DataGrid::new(options(Arc::clone(&store))).unwrap();
    assert_restored(&original, &restored);
}

#[test]
fn test_restore_from_sqlite_store() {
    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    let mut original = DataGrid::new(options(Arc::clone(&store))).unwrap();
    customise(&mut original);

    let snapshot = PersistedState::load(store.as_ref(), "scores")
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.version, PersistedState::VERSION);
    assert_eq!(snapshot.page_index, 1);
    assert_eq!(snapshot.selected, vec![RowId::from(2)]);

    let restored = DataGrid::new(options(Arc::clone(&store))).unwrap();
    assert_restored(&original, &restored);
}

#[test]
fn test_restore_from_file_backed_sqlite() {
    let path = std::env::temp_dir().join(format!("tabula-state-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let store: Arc<dyn StateStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let mut grid = DataGrid::new(options(store)).unwrap();
        grid.sort("id", Some(Direction::Desc)).unwrap();
    }

    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::open(&path).unwrap());
    let grid = DataGrid::new(options(store)).unwrap();
    assert_eq!(visible_ids(&grid)[0], "40");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_unreadable_snapshot_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    store.set_bytes("scores", vec![0xff, 0x01]).unwrap();

    let grid = DataGrid::new(options(store.clone())).unwrap();
    assert!(grid.sort_state().is_empty());
    assert_eq!(grid.visible_rows().len(), 10);
}

#[test]
fn test_future_snapshot_version_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    PersistedState {
        version: PersistedState::VERSION + 1,
        page_index: 3,
        page_size: 10,
        ..PersistedState::default()
    }
    .save(store.as_ref(), "scores")
    .unwrap();

    let grid = DataGrid::new(options(store.clone())).unwrap();
    assert_eq!(grid.pagination().page_index(), 0);
}

#[test]
fn test_nothing_written_without_preservation() {
    let store = Arc::new(MemoryStore::new());
    let mut options = options(store.clone());
    options.config.preserve_state = false;

    let mut grid = DataGrid::new(options).unwrap();
    grid.sort("id", None).unwrap();
    assert!(store.is_empty());
}
