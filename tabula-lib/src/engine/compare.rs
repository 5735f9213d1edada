//! Kind-aware value comparison and display formatting.
//!
//! Both the filter and the sort engine go through here so that `5 < 10`
//! holds for number columns and `"apple" == "Apple"` for text columns,
//! whatever shape the caller's data arrived in.

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use crate::model::Column;
use crate::model::ColumnHooks;
use crate::model::ColumnKind;
use crate::model::Record;
use crate::model::Value;

/// Compares two non-null values as `kind`.
///
/// Values that cannot be read as the requested kind fall back to text
/// comparison. `Auto` tries number, then date, then boolean, then text.
pub fn compare(a: &Value, b: &Value, kind: ColumnKind, case_sensitive: bool) -> Ordering {
    match kind {
        ColumnKind::Number => compare_numbers(a, b),
        ColumnKind::Date => compare_dates(a, b),
        ColumnKind::Boolean => compare_bools(a, b),
        ColumnKind::Text => None,
        ColumnKind::Auto => compare_numbers(a, b)
            .or_else(|| compare_dates(a, b))
            .or_else(|| compare_bools(a, b)),
    }
    .unwrap_or_else(|| compare_text(a, b, case_sensitive))
}

/// Picks one concrete kind for a set of cells.
///
/// The first of number, date and boolean that every non-null cell reads as
/// wins; otherwise text. Sorting an `Auto` column under a single kind keeps
/// the order total when numeric and non-numeric strings are mixed.
pub fn resolve_kind<'a>(values: impl Iterator<Item = &'a Value> + Clone) -> ColumnKind {
    let mut cells = values.filter(|v| !v.is_null());
    if cells.clone().next().is_none() {
        return ColumnKind::Text;
    }
    if cells.clone().all(|v| v.as_f64().is_some()) {
        ColumnKind::Number
    } else if cells.clone().all(|v| parse_date(v).is_some()) {
        ColumnKind::Date
    } else if cells.all(|v| v.as_bool().is_some()) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    let (a, b) = (a.as_f64()?, b.as_f64()?);
    Some(a.total_cmp(&b))
}

fn compare_dates(a: &Value, b: &Value) -> Option<Ordering> {
    Some(parse_date(a)?.cmp(&parse_date(b)?))
}

fn compare_bools(a: &Value, b: &Value) -> Option<Ordering> {
    Some(a.as_bool()?.cmp(&b.as_bool()?))
}

fn compare_text(a: &Value, b: &Value, case_sensitive: bool) -> Ordering {
    if case_sensitive {
        a.to_string().cmp(&b.to_string())
    } else {
        fold(&a.to_string()).cmp(&fold(&b.to_string()))
    }
}

/// Lowercases text for case-insensitive matching.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Reads a value as a UTC timestamp.
///
/// Accepts date-time values, RFC 3339 strings and plain `YYYY-MM-DD` dates
/// (taken as midnight UTC).
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

/// Returns the display text of a value for a column kind.
pub fn format(value: &Value, kind: ColumnKind) -> String {
    match (kind, value) {
        (_, Value::Null) => String::new(),
        (ColumnKind::Date, v) => match parse_date(v) {
            Some(dt) => dt.to_rfc3339(),
            None => v.to_string(),
        },
        (ColumnKind::Boolean, v) => match v.as_bool() {
            Some(b) => b.to_string(),
            None => v.to_string(),
        },
        (_, v) => v.to_string(),
    }
}

/// Returns the display text of a record's cell, using the column's custom
/// formatter when one is registered.
pub fn format_cell(column: &Column, record: &Record, hooks: &ColumnHooks) -> String {
    let value = record.value(&column.id);
    match hooks.formatter(&column.id) {
        Some(formatter) => formatter(value, record),
        None => format(value, column.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_kind_is_numeric() {
        let ten = Value::from("10");
        let five = Value::from(5i64);
        assert_eq!(compare(&five, &ten, ColumnKind::Number, false), Ordering::Less);
        // Text comparison would put "10" first.
        assert_eq!(compare(&five, &ten, ColumnKind::Text, false), Ordering::Greater);
    }

    #[test]
    fn test_auto_infers() {
        assert_eq!(
            compare(&Value::from(2.5), &Value::from(10i64), ColumnKind::Auto, false),
            Ordering::Less
        );
        assert_eq!(
            compare(
                &Value::from("2024-01-02"),
                &Value::from("2023-12-31T23:00:00Z"),
                ColumnKind::Auto,
                false
            ),
            Ordering::Greater
        );
        assert_eq!(
            compare(&Value::from("apple"), &Value::from("Banana"), ColumnKind::Auto, false),
            Ordering::Less
        );
    }

    #[test]
    fn test_resolve_kind() {
        let numbers = [Value::from("3"), Value::Null, Value::from(10i64)];
        assert_eq!(resolve_kind(numbers.iter()), ColumnKind::Number);

        let mixed = [Value::from("3"), Value::from("1a"), Value::from("10")];
        assert_eq!(resolve_kind(mixed.iter()), ColumnKind::Text);

        let dates = [Value::from("2024-01-02"), Value::from("2023-12-31T23:00:00Z")];
        assert_eq!(resolve_kind(dates.iter()), ColumnKind::Date);

        let flags = [Value::from(true), Value::from("false")];
        assert_eq!(resolve_kind(flags.iter()), ColumnKind::Boolean);

        assert_eq!(resolve_kind([Value::Null].iter()), ColumnKind::Text);
    }

    #[test]
    fn test_case_sensitivity() {
        let a = Value::from("apple");
        let b = Value::from("Apple");
        assert_eq!(compare(&a, &b, ColumnKind::Text, false), Ordering::Equal);
        assert_ne!(compare(&a, &b, ColumnKind::Text, true), Ordering::Equal);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(&Value::Null, ColumnKind::Text), "");
        assert_eq!(format(&Value::from("true"), ColumnKind::Boolean), "true");
        assert_eq!(
            format(&Value::from("2024-03-01"), ColumnKind::Date),
            "2024-03-01T00:00:00+00:00"
        );
    }
}
