//! JSON serialization of tables
//!
//! [`normalize`] maps one cell to a JSON primitive; [`serialize_rows`]
//! applies it column by column and assembles row objects in table order.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde_json::{Number, Value};

use crate::table::Table;
use crate::types::{Cell, Row};

/// Convert one cell into a JSON-safe value
pub fn normalize(cell: &Cell) -> Value {
    match cell {
        Cell::Missing => Value::Null,
        Cell::Text(text) => Value::String(text.clone()),
        Cell::Integer(i) => Value::Number((*i).into()),
        Cell::Float(f) => float_value(*f),
        Cell::Timestamp(ts) => Value::String(isoformat(ts)),
        Cell::Duration(d) => total_seconds(d).map(float_value).unwrap_or(Value::Null),
    }
}

/// Serialize every row of the table, keeping row and column order
pub fn serialize_rows(table: &Table) -> Vec<Row> {
    let columns: Vec<(&str, Vec<Value>)> = table
        .columns()
        .iter()
        .map(|column| {
            let values = column.cells.iter().map(normalize).collect();
            (column.name.as_str(), values)
        })
        .collect();

    let mut rows: Vec<Row> = (0..table.row_count())
        .map(|_| Row::with_capacity(columns.len()))
        .collect();

    for (name, values) in columns {
        for (row, value) in rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
    }

    rows
}

/// ISO 8601 without offset; fractional digits only when present
pub fn isoformat(ts: &NaiveDateTime) -> String {
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else if nanos % 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.9f").to_string()
    }
}

/// Total elapsed seconds, `None` when the span overflows nanosecond precision
pub fn total_seconds(duration: &TimeDelta) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|nanos| nanos as f64 / 1_000_000_000.0)
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
