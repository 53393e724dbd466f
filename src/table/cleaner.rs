//! Column cleaning
//!
//! Pure transformation applied to every freshly parsed table:
//! 1. rows whose every cell is missing are removed
//! 2. [`DROPPED_COLUMNS`] are removed when present
//! 3. [`TIMESTAMP_COLUMNS`] and [`DURATION_COLUMN`] are coerced
//! 4. [`NUMERIC_COLUMNS`] are coerced
//!
//! Coercion never fails: values that do not parse become missing.
//!
//! `No of Wires` and `No of Wire Types` appear in both the drop list and the
//! numeric list. Dropping runs first, so they are never coerced.

use super::{parse, Column, Table};
use crate::types::{Cell, ColumnKind};

pub const DROPPED_COLUMNS: &[&str] = &[
    "No of Sleeves",
    "No of Seal Applicators",
    "No of Seals",
    "No of Tools",
    "No of Terminals",
    "No of Stripping Lengths",
    "No of Cross Sections",
    "No of Wire Types",
    "No of Wires",
    "Order No.",
    "Remark",
];

pub const TIMESTAMP_COLUMNS: &[&str] = &["Time Stamp", "Insert Time", "Update Time"];

pub const DURATION_COLUMN: &str = "Duration";

pub const NUMERIC_COLUMNS: &[&str] = &[
    "Produced Parts",
    "Waste",
    "No of Wires",
    "No of Wire Types",
    "No of Cross Sections",
    "No of Stripping Lengths",
    "No of Terminals",
    "No of Tools",
    "No of Seals",
    "No of Seal Applicators",
    "No of Sleeves",
];

/// Clean a raw table
pub fn clean(table: Table) -> Table {
    let keep_rows = non_empty_rows(&table);
    let removed = table.row_count() - keep_rows.iter().filter(|keep| **keep).count();
    if removed > 0 {
        tracing::debug!(removed, "Removed empty rows");
    }

    let columns = table
        .into_columns()
        .into_iter()
        .filter(|column| !DROPPED_COLUMNS.contains(&column.name.as_str()))
        .map(|column| retain_rows(column, &keep_rows))
        .map(coerce_column)
        .collect();

    Table::new(columns)
}

// A row survives when at least one of its cells, in any column, is present
fn non_empty_rows(table: &Table) -> Vec<bool> {
    let mut keep = vec![false; table.row_count()];
    for column in table.columns() {
        for (flag, cell) in keep.iter_mut().zip(&column.cells) {
            *flag |= !cell.is_missing();
        }
    }
    keep
}

fn retain_rows(mut column: Column, keep_rows: &[bool]) -> Column {
    let mut keep = keep_rows.iter();
    column.cells.retain(|_| keep.next().copied().unwrap_or(false));
    column
}

fn coerce_column(column: Column) -> Column {
    let name = column.name.as_str();
    if TIMESTAMP_COLUMNS.contains(&name) {
        coerce_with(column, ColumnKind::Timestamp, parse::coerce_timestamp)
    } else if name == DURATION_COLUMN {
        coerce_with(column, ColumnKind::Duration, parse::coerce_duration)
    } else if NUMERIC_COLUMNS.contains(&name) {
        coerce_numeric_column(column)
    } else {
        column
    }
}

fn coerce_with(column: Column, kind: ColumnKind, coerce: fn(&Cell) -> Cell) -> Column {
    let cells = column.cells.iter().map(coerce).collect();
    Column::new(column.name, kind, cells)
}

// Integer only while every value is an integer and none is missing, else float
fn coerce_numeric_column(column: Column) -> Column {
    let cells: Vec<Cell> = column.cells.iter().map(parse::coerce_numeric).collect();

    let all_integer = cells.iter().all(|c| matches!(c, Cell::Integer(_)));
    if all_integer {
        return Column::new(column.name, ColumnKind::Integer, cells);
    }

    let cells = cells
        .into_iter()
        .map(|cell| match cell {
            Cell::Integer(i) => Cell::Float(i as f64),
            other => other,
        })
        .collect();
    Column::new(column.name, ColumnKind::Float, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn raw(name: &str, values: &[&str]) -> Column {
        Column::infer(name, values.iter().map(|v| parse::raw_cell(v)).collect())
    }

    #[test]
    fn test_drops_fixed_columns_and_ignores_absent_ones() {
        let table = Table::new(vec![
            raw("Machine", &["M1"]),
            raw("Remark", &["ok"]),
            raw("No of Wires", &["3"]),
        ]);

        let cleaned = clean(table);
        assert_eq!(cleaned.column_names(), vec!["Machine"]);
    }

    #[test]
    fn test_removes_fully_empty_rows_only() {
        let table = Table::new(vec![
            raw("Machine", &["M1", "", "M3"]),
            raw("Remark", &["", "", "late"]),
        ]);

        let cleaned = clean(table);
        assert_eq!(cleaned.row_count(), 2);
        let machine = cleaned.column("Machine").unwrap();
        assert_eq!(machine.cells[0], Cell::Text("M1".to_string()));
        assert_eq!(machine.cells[1], Cell::Text("M3".to_string()));
    }

    #[test]
    fn test_row_with_only_dropped_values_survives() {
        // Emptiness is judged before dropping columns
        let table = Table::new(vec![
            raw("Machine", &["M1", ""]),
            raw("Remark", &["", "only a remark"]),
        ]);

        let cleaned = clean(table);
        assert_eq!(cleaned.row_count(), 2);
        assert_eq!(cleaned.column("Machine").unwrap().cells[1], Cell::Missing);
    }

    #[test]
    fn test_coerces_timestamps() {
        let table = Table::new(vec![raw(
            "Time Stamp",
            &["2024-01-01 10:00:00", "garbage", ""],
        )]);

        let cleaned = clean(table);
        let column = cleaned.column("Time Stamp").unwrap();
        assert_eq!(column.kind, ColumnKind::Timestamp);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(column.cells, vec![Cell::Timestamp(expected), Cell::Missing]);
    }

    #[test]
    fn test_coerces_duration() {
        let table = Table::new(vec![raw("Duration", &["00:02:00", "later"])]);

        let cleaned = clean(table);
        let column = cleaned.column("Duration").unwrap();
        assert_eq!(column.kind, ColumnKind::Duration);
        assert_eq!(
            column.cells,
            vec![Cell::Duration(TimeDelta::seconds(120)), Cell::Missing]
        );
    }

    #[test]
    fn test_coerces_numeric_columns() {
        let table = Table::new(vec![
            raw("Produced Parts", &["100", "200"]),
            raw("Waste", &["1", "n.a."]),
        ]);

        let cleaned = clean(table);
        let produced = cleaned.column("Produced Parts").unwrap();
        assert_eq!(produced.kind, ColumnKind::Integer);
        assert_eq!(produced.cells, vec![Cell::Integer(100), Cell::Integer(200)]);

        let waste = cleaned.column("Waste").unwrap();
        assert_eq!(waste.kind, ColumnKind::Float);
        assert_eq!(waste.cells, vec![Cell::Float(1.0), Cell::Missing]);
    }

    #[test]
    fn test_leaves_other_columns_untouched() {
        let table = Table::new(vec![raw("Operator", &["Anna", "2024-01-01"])]);

        let cleaned = clean(table);
        let column = cleaned.column("Operator").unwrap();
        assert_eq!(column.kind, ColumnKind::Text);
        assert_eq!(column.cells[1], Cell::Text("2024-01-01".to_string()));
    }
}
