//! Integration tests for the client-mode pipeline: filter, sort, paginate and
//! selection working together through the public `DataGrid` API.

use std::sync::Arc;
use std::sync::Mutex;

use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TestLogger;
use tabula_lib::DataGrid;
use tabula_lib::PartialState;
use tabula_lib::engine::AggregateFunction;
use tabula_lib::engine::AggregateSpec;
use tabula_lib::error::GridError;
use tabula_lib::event::EventKind;
use tabula_lib::model::Column;
use tabula_lib::model::ColumnKind;
use tabula_lib::model::Record;
use tabula_lib::model::RowId;
use tabula_lib::model::Value;
use tabula_lib::options::FilteringOptions;
use tabula_lib::options::GridOptions;
use tabula_lib::options::SortingOptions;
use tabula_lib::query::ColumnFilter;
use tabula_lib::query::Direction;
use tabula_lib::query::SortKey;

fn init_logger() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn people() -> Vec<Record> {
    [
        (1, "Alice", "eng", 34),
        (2, "bob", "ops", 28),
        (3, "Carol", "eng", 45),
        (4, "dave", "sales", 28),
        (5, "Eve", "eng", 23),
        (6, "Frank", "ops", 51),
        (7, "grace", "sales", 34),
    ]
    .into_iter()
    .map(|(id, name, team, age)| {
        Record::new()
            .set("id", id as i64)
            .set("name", name)
            .set("team", team)
            .set("age", age as i64)
    })
    .collect()
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("id", "ID").kind(ColumnKind::Number),
        Column::new("name", "Name").kind(ColumnKind::Text),
        Column::new("team", "Team"),
        Column::new("age", "Age").kind(ColumnKind::Number),
    ]
}

fn ids(rows: Vec<&tabula_lib::model::Row>) -> Vec<i64> {
    rows.iter()
        .map(|r| r.record().get_i64("id").unwrap().unwrap())
        .collect()
}

fn grid_with(options: GridOptions) -> DataGrid {
    init_logger();
    DataGrid::new(options).unwrap()
}

fn grid() -> DataGrid {
    grid_with(GridOptions::new(columns()).with_data(people()))
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_pipeline_order() {
    let mut grid = grid_with(GridOptions::new(columns()).with_data(people()).with_page_size(10));
    grid.add_filter(ColumnFilter::eq("team", "eng")).unwrap();
    grid.sort("age", Some(Direction::Desc)).unwrap();
    grid.set_page_size(10).unwrap();

    assert_eq!(ids(grid.filtered_rows()), vec![1, 3, 5]);
    assert_eq!(ids(grid.sorted_rows()), vec![3, 1, 5]);
    assert_eq!(ids(grid.visible_rows()), vec![3, 1, 5]);
    assert_eq!(grid.pagination().total_rows(), 3);
}

#[test]
fn test_page_navigation_does_not_change_order() {
    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .with_pagination(tabula_lib::options::PaginationOptions {
                page_size: 3,
                page_size_options: Vec::new(),
                ..Default::default()
            }),
    );
    grid.sort("name", Some(Direction::Asc)).unwrap();
    let sorted = ids(grid.sorted_rows());

    let mut paged = Vec::new();
    for page in 0..grid.pagination().total_pages() {
        grid.go_to_page(page as i64).unwrap();
        paged.extend(ids(grid.visible_rows()));
    }

    assert_eq!(paged, sorted);
    assert_eq!(ids(grid.sorted_rows()), sorted);
    // Case-insensitive text ordering.
    assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_sort_is_stable() {
    let mut grid = grid();
    grid.sort("age", Some(Direction::Asc)).unwrap();
    // 28 appears for ids 2 and 4, 34 for ids 1 and 7.
    assert_eq!(ids(grid.sorted_rows()), vec![5, 2, 4, 1, 7, 3, 6]);

    grid.sort("team", Some(Direction::Asc)).unwrap();
    assert_eq!(ids(grid.sorted_rows()), vec![1, 3, 5, 2, 6, 4, 7]);
}

#[test]
fn test_sort_cycle_restores_original_order() {
    let mut grid = grid_with(
        GridOptions::new(vec![Column::new("age", "Age").kind(ColumnKind::Number)])
            .with_row_id_field("age")
            .with_data(vec![
                Record::new().set("age", 30i64),
                Record::new().set("age", 10i64),
                Record::new().set("age", 20i64),
            ]),
    );
    let ages = |grid: &DataGrid| {
        grid.visible_rows()
            .iter()
            .map(|r| r.record().get_i64("age").unwrap().unwrap())
            .collect::<Vec<_>>()
    };

    grid.sort("age", None).unwrap();
    assert_eq!(ages(&grid), vec![10, 20, 30]);
    grid.sort("age", None).unwrap();
    assert_eq!(ages(&grid), vec![30, 20, 10]);
    grid.sort("age", None).unwrap();
    assert_eq!(ages(&grid), vec![30, 10, 20]);
}

#[test]
fn test_multi_sort_tie_break() {
    let mut grid = grid_with(
        GridOptions::new(vec![Column::new("a", "A"), Column::new("b", "B")])
            .with_row_id(|record| RowId::from_value(record.value("key")))
            .with_sorting(SortingOptions {
                multi_sort: true,
                ..SortingOptions::default()
            })
            .with_data(vec![
                Record::new().set("key", "first").set("a", 1i64).set("b", 2i64),
                Record::new().set("key", "second").set("a", 1i64).set("b", 1i64),
            ]),
    );

    grid.multi_sort(vec![SortKey::asc("a"), SortKey::asc("b")])
        .unwrap();
    let keys: Vec<&str> = grid.visible_rows().iter().map(|r| r.id().as_str()).collect();
    assert_eq!(keys, vec!["second", "first"]);
}

#[test]
fn test_custom_hooks() {
    let by_length: tabula_lib::model::Comparator = Arc::new(|a: &Value, b: &Value| {
        let len = |v: &Value| v.as_str().map(str::len).unwrap_or(0);
        len(a).cmp(&len(b))
    });
    let shout: tabula_lib::model::Formatter =
        Arc::new(|value: &Value, _: &Record| value.to_string().to_uppercase());
    let even_only: tabula_lib::model::FilterFn =
        Arc::new(|value: &Value, _: &ColumnFilter, _: &Record| {
            value.as_f64().map(|n| n as i64 % 2 == 0).unwrap_or(false)
        });

    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .with_comparator("name", by_length)
            .with_formatter("team", shout)
            .with_filter_fn("id", even_only),
    );

    grid.sort("name", Some(Direction::Asc)).unwrap();
    assert_eq!(ids(grid.sorted_rows())[..2], [2, 5]);

    grid.add_filter(ColumnFilter::eq("id", 0i64)).unwrap();
    assert_eq!(ids(grid.filtered_rows()), vec![2, 4, 6]);

    // Search runs over formatted text.
    grid.search("SALES").unwrap();
    assert_eq!(ids(grid.filtered_rows()), vec![4]);
}

#[test]
fn test_search_fields_and_min_length() {
    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .with_filtering(FilteringOptions {
                search_fields: vec!["name".to_string()],
                min_search_length: 2,
                ..FilteringOptions::default()
            }),
    );

    grid.search("e").unwrap();
    assert_eq!(grid.filtered_rows().len(), 7);

    // "ops" is a team, not a name.
    grid.search("ops").unwrap();
    assert!(grid.filtered_rows().is_empty());

    grid.search("AL").unwrap();
    assert_eq!(ids(grid.filtered_rows()), vec![1]);
}

// =============================================================================
// Guards
// =============================================================================

#[test]
fn test_disabled_features_do_not_change_state() {
    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .with_sorting(SortingOptions {
                enabled: false,
                ..SortingOptions::default()
            })
            .with_filtering(FilteringOptions {
                enabled: false,
                ..FilteringOptions::default()
            }),
    );
    let before = grid.get_state().unwrap();

    grid.sort("age", Some(Direction::Asc)).unwrap();
    grid.add_filter(ColumnFilter::gt("age", 30i64)).unwrap();
    grid.filter(vec![ColumnFilter::eq("team", "eng")]).unwrap();
    grid.search("alice").unwrap();

    assert_eq!(grid.get_state().unwrap(), before);
}

#[test]
fn test_unsortable_and_unfilterable_columns() {
    let mut grid = grid_with(
        GridOptions::new(vec![
            Column::new("id", "ID").kind(ColumnKind::Number),
            Column::new("name", "Name").not_sortable().not_filterable(),
        ])
        .with_data(people()),
    );

    grid.sort("name", Some(Direction::Asc)).unwrap();
    grid.add_filter(ColumnFilter::contains("name", "a")).unwrap();

    assert!(grid.sort_state().is_empty());
    assert!(grid.filter_state().is_identity());
    assert_eq!(ids(grid.visible_rows()), vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_unknown_operator_matches_nothing() {
    let mut grid = grid();
    grid.add_filter(ColumnFilter::new("age", "roughly".into(), 30i64))
        .unwrap();
    assert!(grid.filtered_rows().is_empty());
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_selection_survives_sort_and_filter() {
    let mut grid = grid();
    grid.select_row(&RowId::from(3)).unwrap();

    grid.sort("age", Some(Direction::Desc)).unwrap();
    grid.add_filter(ColumnFilter::eq("team", "eng")).unwrap();
    assert!(grid.selection_state().is_selected(&RowId::from(3)));

    // Filtered out but still selected.
    grid.add_filter(ColumnFilter::eq("team", "ops")).unwrap();
    assert!(grid.selection_state().is_selected(&RowId::from(3)));
    assert_eq!(grid.selection_state().selected_count(), 1);
    assert!(!grid.selection_state().partially_selected());
}

#[test]
fn test_delete_selected_row() {
    let mut grid = grid_with(
        GridOptions::new(columns()).with_data(
            [1i64, 2, 5]
                .into_iter()
                .map(|id| Record::new().set("id", id))
                .collect(),
        ),
    );
    grid.select_row(&RowId::from(1)).unwrap();
    grid.select_row(&RowId::from(5)).unwrap();
    assert!(grid.selection_state().partially_selected());

    grid.delete_row(&RowId::from(5)).unwrap();
    assert_eq!(ids(grid.selected_rows()), vec![1]);
    assert!(!grid.selection_state().is_selected(&RowId::from(5)));
    assert!(grid.selection_state().partially_selected());

    grid.select_row(&RowId::from(2)).unwrap();
    assert!(grid.selection_state().all_selected());
    grid.delete_row(&RowId::from(2)).unwrap();
    assert!(grid.selection_state().all_selected());
}

#[test]
fn test_set_data_prunes_missing_selection() {
    let mut grid = grid();
    grid.select_row(&RowId::from(1)).unwrap();
    grid.select_row(&RowId::from(2)).unwrap();

    grid.set_data(people().into_iter().skip(1).collect()).unwrap();
    assert_eq!(ids(grid.selected_rows()), vec![2]);
    assert_eq!(grid.selection_state().selected_count(), 1);
}

// =============================================================================
// Empty data, events, errors
// =============================================================================

#[test]
fn test_empty_dataset() {
    let mut grid = grid();
    grid.set_data(Vec::new()).unwrap();

    assert_eq!(grid.pagination().total_rows(), 0);
    assert_eq!(grid.pagination().total_pages(), 0);
    assert!(grid.visible_rows().is_empty());

    grid.select_all().unwrap();
    assert_eq!(grid.selection_state().selected_count(), 0);
    assert!(!grid.selection_state().all_selected());
}

#[test]
fn test_events_in_order() {
    let mut grid = grid_with(GridOptions::new(columns()).with_data(people()).with_page_size(2));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    grid.events_mut().subscribe_all(move |event| {
        sink.lock().unwrap().push(event.kind().as_str());
    });

    grid.go_to_page(2).unwrap();
    grid.add_filter(ColumnFilter::eq("team", "eng")).unwrap();
    grid.select_row(&RowId::from(1)).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "page:change",
            "state:change",
            "filter:change",
            "page:change",
            "state:change",
            "row:select",
            "selection:change",
            "state:change",
        ]
    );
}

#[test]
fn test_subscribe_by_kind_and_unsubscribe() {
    let mut grid = grid();
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let id = grid
        .events_mut()
        .subscribe(EventKind::SortChange, move |_| *sink.lock().unwrap() += 1);

    grid.sort("age", None).unwrap();
    grid.go_to_page(0).unwrap();
    assert!(grid.events_mut().unsubscribe(id));
    grid.sort("age", None).unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn test_data_change_callback() {
    let totals = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&totals);
    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .on_data_change(move |rows| sink.lock().unwrap().push(rows.len())),
    );

    grid.add_row(Record::new().set("id", 8i64)).unwrap();
    grid.set_data(Vec::new()).unwrap();
    assert_eq!(*totals.lock().unwrap(), vec![8, 0]);
}

#[test]
fn test_duplicate_ids_rejected_at_construction() {
    init_logger();
    let err = DataGrid::new(GridOptions::new(columns()).with_data(vec![
        Record::new().set("id", 1i64),
        Record::new().set("id", 1i64),
    ]))
    .unwrap_err();
    assert!(matches!(err, GridError::DuplicateRowId { id } if id == RowId::from(1)));
}

#[test]
fn test_destroyed_grid_errors() {
    let mut grid = grid();
    let destroyed = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&destroyed);
    grid.events_mut()
        .subscribe(EventKind::Destroy, move |_| *sink.lock().unwrap() += 1);

    grid.destroy();
    grid.destroy();

    assert!(grid.is_destroyed());
    assert_eq!(*destroyed.lock().unwrap(), 1);
    assert!(grid.events_mut().is_empty());
    assert!(grid.sort("age", None).unwrap_err().is_destroyed());
    assert!(grid.set_data(people()).unwrap_err().is_destroyed());
    assert!(grid.get_state().unwrap_err().is_destroyed());
}

// =============================================================================
// State and aggregates
// =============================================================================

#[test]
fn test_set_state_of_get_state_is_idempotent() {
    let mut grid = grid_with(GridOptions::new(columns()).with_data(people()).with_page_size(10));
    grid.sort("age", Some(Direction::Desc)).unwrap();
    grid.search("e").unwrap();
    grid.select_row(&RowId::from(3)).unwrap();
    grid.hide_column("team").unwrap();

    let before = grid.get_state().unwrap();
    grid.set_state(before.clone()).unwrap();
    assert_eq!(grid.get_state().unwrap(), before);
}

#[test]
fn test_partial_state_and_reset() {
    let mut grid = grid_with(
        GridOptions::new(columns())
            .with_data(people())
            .with_sorting(SortingOptions {
                default_sort: vec![SortKey::desc("id")],
                ..SortingOptions::default()
            }),
    );
    assert_eq!(ids(grid.visible_rows())[0], 7);

    grid.set_state(PartialState {
        sort: Some(tabula_lib::query::SortState::single("age", Direction::Asc)),
        column_visibility: Some(vec![("name".to_string(), false)]),
        ..PartialState::default()
    })
    .unwrap();
    assert_eq!(ids(grid.visible_rows())[0], 5);
    assert_eq!(grid.visible_columns().len(), 3);

    grid.add_filter(ColumnFilter::eq("team", "ops")).unwrap();
    grid.select_row(&RowId::from(2)).unwrap();
    grid.reset_state().unwrap();

    assert_eq!(grid.sort_state().keys(), &[SortKey::desc("id")]);
    assert!(grid.filter_state().is_identity());
    assert_eq!(grid.selection_state().selected_count(), 0);
    assert_eq!(grid.visible_columns().len(), 4);
    assert_eq!(grid.rows().len(), 7);
}

#[test]
fn test_aggregate_over_filtered_rows() {
    let mut grid = grid();
    grid.add_filter(ColumnFilter::eq("team", "eng")).unwrap();

    let result = grid
        .aggregate(&[
            AggregateSpec::new("age", AggregateFunction::Count),
            AggregateSpec::new("age", AggregateFunction::Sum),
            AggregateSpec::new("age", AggregateFunction::Max).label("oldest"),
        ])
        .unwrap();

    assert_eq!(result["age_count"], Value::Int(3));
    assert_eq!(result["age_sum"], Value::Float(102.0));
    assert_eq!(result["oldest"], Value::Float(45.0));
}
