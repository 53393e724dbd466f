//! In-memory table
//!
//! A table is a list of equally long columns. It is built once by the
//! loader, cleaned, and never mutated afterwards.

use crate::types::{Cell, ColumnKind};

pub mod cleaner;
pub mod loader;
pub mod parse;

pub use cleaner::clean;
pub use loader::{load_table, LoadedTable, TextEncoding};

/// A named, typed column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Build a column from raw text cells, inferring its kind
    ///
    /// Mirrors what a CSV reader does for columns nobody asked to coerce:
    /// integers stay integers only while no value is missing, any other
    /// all-numeric column becomes float, anything else stays text.
    pub fn infer(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let mut present = cells.iter().filter(|c| !c.is_missing()).peekable();
        if present.peek().is_none() {
            return Self::new(name, ColumnKind::Unknown, cells);
        }

        let mut all_int = true;
        let mut all_num = true;
        for cell in present {
            let Cell::Text(text) = cell else {
                all_int = false;
                all_num = false;
                break;
            };
            if parse::parse_integer(text).is_none() {
                all_int = false;
                if parse::parse_float(text).is_none() {
                    all_num = false;
                    break;
                }
            }
        }

        let has_missing = cells.iter().any(Cell::is_missing);
        if all_int && !has_missing {
            let cells = cells
                .into_iter()
                .map(|c| parse::coerce_numeric(&c))
                .collect();
            Self::new(name, ColumnKind::Integer, cells)
        } else if all_num {
            let cells = cells
                .into_iter()
                .map(|c| match parse::coerce_numeric(&c) {
                    Cell::Integer(i) => Cell::Float(i as f64),
                    other => other,
                })
                .collect();
            Self::new(name, ColumnKind::Float, cells)
        } else {
            Self::new(name, ColumnKind::Text, cells)
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Ordered collection of columns sharing one row index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create a table, padding short columns with missing cells
    pub fn new(mut columns: Vec<Column>) -> Self {
        let row_count = columns.iter().map(Column::len).max().unwrap_or(0);
        for column in &mut columns {
            column.cells.resize(row_count, Cell::Missing);
        }
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_infer_integer_column() {
        let col = Column::infer("Shift", text(&["1", "2", "3"]));
        assert_eq!(col.kind, ColumnKind::Integer);
        assert_eq!(col.cells[1], Cell::Integer(2));
    }

    #[test]
    fn test_infer_integer_with_missing_becomes_float() {
        let col = Column::infer("Shift", text(&["1", "", "3"]));
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.cells[0], Cell::Float(1.0));
        assert_eq!(col.cells[1], Cell::Missing);
    }

    #[test]
    fn test_infer_text_column() {
        let col = Column::infer("Machine", text(&["M1", "2", ""]));
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.cells[1], Cell::Text("2".to_string()));
    }

    #[test]
    fn test_infer_all_missing() {
        let col = Column::infer("Empty", text(&["", ""]));
        assert_eq!(col.kind, ColumnKind::Unknown);
    }

    #[test]
    fn test_table_pads_short_columns() {
        let table = Table::new(vec![
            Column::new("a", ColumnKind::Integer, vec![Cell::Integer(1), Cell::Integer(2)]),
            Column::new("b", ColumnKind::Integer, vec![Cell::Integer(3)]),
        ]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap().cells[1], Cell::Missing);
    }
}
