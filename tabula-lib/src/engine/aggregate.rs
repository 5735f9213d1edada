//! Column aggregates over the filtered, sorted rows.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;
use crate::model::Value;

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    /// Number of rows, regardless of the column's values.
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }
}

/// One aggregate to compute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSpec {
    #[serde(rename = "column")]
    pub column_id: String,
    pub function: AggregateFunction,
    /// Result key; defaults to `<column>_<function>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AggregateSpec {
    pub fn new(column_id: impl Into<String>, function: AggregateFunction) -> Self {
        Self {
            column_id: column_id.into(),
            function,
            label: None,
        }
    }

    /// Sets the result key.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the result key.
    pub fn alias(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}_{}", self.column_id, self.function.as_str()),
        }
    }
}

/// Computes `specs` over the rows at `indices`.
///
/// Non-numeric cells are skipped by sum/avg/min/max. `avg` of nothing is 0;
/// `min` and `max` of nothing are omitted from the result.
pub fn compute(rows: &[Row], indices: &[usize], specs: &[AggregateSpec]) -> BTreeMap<String, Value> {
    let mut results = BTreeMap::new();

    for spec in specs {
        let numbers = || {
            indices
                .iter()
                .filter_map(|&i| rows[i].value(&spec.column_id).as_f64())
        };

        let value = match spec.function {
            AggregateFunction::Count => Some(Value::Int(indices.len() as i64)),
            AggregateFunction::Sum => Some(Value::Float(numbers().sum())),
            AggregateFunction::Avg => {
                let (sum, count) = numbers().fold((0.0, 0usize), |(s, c), n| (s + n, c + 1));
                Some(Value::Float(if count > 0 { sum / count as f64 } else { 0.0 }))
            }
            AggregateFunction::Min => numbers().reduce(f64::min).map(Value::Float),
            AggregateFunction::Max => numbers().reduce(f64::max).map(Value::Float),
        };

        if let Some(value) = value {
            results.insert(spec.alias(), value);
        }
    }

    results
}
