//! Sort state: an ordered list of column keys.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the wire name, `"asc"` or `"desc"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    /// Applies this direction to an ascending ordering.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// One `(column, direction)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub column_id: String,
    pub direction: Direction,
}

impl SortKey {
    /// Creates an ascending key.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: Direction::Asc,
        }
    }

    /// Creates a descending key.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: Direction::Desc,
        }
    }
}

/// Ordering of the grid.
///
/// Empty means no ordering; one key is a single-column sort; several keys are
/// applied in order as successive tie-breaks.
///
/// # Example
///
/// ```
/// use tabula_lib::query::{SortKey, SortState};
///
/// let order = SortState::from_keys([SortKey::desc("age"), SortKey::asc("name")]);
/// assert_eq!(order.keys().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    /// No ordering.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single-column ordering.
    pub fn single(column_id: impl Into<String>, direction: Direction) -> Self {
        Self {
            keys: vec![SortKey {
                column_id: column_id.into(),
                direction,
            }],
        }
    }

    /// An ordering made of several keys.
    pub fn from_keys(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Returns the keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if there is no ordering.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the direction of a column if it is part of the ordering.
    pub fn direction_of(&self, column_id: &str) -> Option<Direction> {
        self.keys
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    /// Next state of the three-step header cycle for `column_id`:
    /// asc, then desc, then no ordering. Any other prior state restarts at asc.
    pub fn cycled(&self, column_id: &str) -> SortState {
        match self.keys.as_slice() {
            [only] if only.column_id == column_id => match only.direction {
                Direction::Asc => SortState::single(column_id, Direction::Desc),
                Direction::Desc => SortState::none(),
            },
            _ => SortState::single(column_id, Direction::Asc),
        }
    }
}
