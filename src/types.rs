//! Core types for csvserve

use chrono::{NaiveDateTime, TimeDelta};

/// A single value of the loaded table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
    /// Absent or unparsable value, served as JSON `null`
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Timestamp,
    Duration,
    /// Every cell is missing, so nothing could be inferred
    Unknown,
}

/// One row of the served output, keyed by column name in table order
pub type Row = serde_json::Map<String, serde_json::Value>;
