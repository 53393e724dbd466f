//! CSV loading with encoding trial
//!
//! The file is read once and decoded with each encoding of
//! [`TextEncoding::ATTEMPT_ORDER`] until one of them yields a parsable
//! table. Malformed lines are skipped rather than failing the load.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Serialize, Serializer};

use super::{clean, parse, Column, Table};
use crate::types::Cell;
use crate::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encodings tried when decoding the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Iso8859_1,
    Windows1252,
}

impl TextEncoding {
    pub const ATTEMPT_ORDER: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Iso8859_1,
        TextEncoding::Windows1252,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Iso8859_1 => "iso-8859-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    /// Decode raw bytes
    ///
    /// Only UTF-8 can fail; the single-byte encodings map every byte.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        let decoded = match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
            }
            // Latin-1 maps every byte to the code point of the same value
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(encoding_rs::mem::decode_latin1(bytes))
            }
            TextEncoding::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes),
        };
        decoded.ok_or_else(|| Error::Decode(self.label().to_string()))
    }
}

impl Serialize for TextEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cleaned table together with how it was read
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub encoding: TextEncoding,
    /// Lines dropped because they could not be parsed or had extra fields
    pub skipped_lines: usize,
}

/// Load and clean the CSV file at `path`
pub fn load_table(path: impl AsRef<Path>) -> Result<LoadedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let loaded = load_bytes(&bytes)?;
    tracing::info!(
        path = %path.display(),
        encoding = %loaded.encoding,
        rows = loaded.table.row_count(),
        columns = loaded.table.column_count(),
        skipped_lines = loaded.skipped_lines,
        "Loaded data file"
    );
    Ok(loaded)
}

/// Decode and parse in-memory file contents, then clean the result
pub fn load_bytes(bytes: &[u8]) -> Result<LoadedTable> {
    for encoding in TextEncoding::ATTEMPT_ORDER {
        let attempt = encoding
            .decode(bytes)
            .and_then(|text| parse_csv(&text));

        match attempt {
            Ok((raw, skipped_lines)) => {
                if skipped_lines > 0 {
                    tracing::warn!(%encoding, skipped_lines, "Skipped malformed lines");
                }
                return Ok(LoadedTable {
                    table: clean(raw),
                    encoding,
                    skipped_lines,
                });
            }
            Err(err) => {
                tracing::warn!(%encoding, error = %err, "Failed to read file with encoding");
            }
        }
    }

    let attempted = TextEncoding::ATTEMPT_ORDER
        .iter()
        .map(TextEncoding::label)
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::UnreadableEncoding { attempted })
}

/// Parse comma-delimited text with a header row into a raw, type-inferred table
///
/// Returns the table and the number of skipped lines.
pub fn parse_csv(text: &str) -> Result<(Table, usize)> {
    let text = skip_initial_space(text);
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let names = column_names(&headers);
    if names.is_empty() {
        return Err(Error::NoColumns);
    }

    let width = names.len();
    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); width];
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(line = index + 2, error = %err, "Skipping unparsable line");
                skipped += 1;
                continue;
            }
        };

        if record.len() > width {
            tracing::debug!(
                line = record.position().map(|p| p.line()).unwrap_or_default(),
                expected = width,
                found = record.len(),
                "Skipping line with too many fields"
            );
            skipped += 1;
            continue;
        }

        for (idx, cells) in columns.iter_mut().enumerate() {
            let cell = record
                .get(idx)
                .map(parse::raw_cell)
                .unwrap_or(Cell::Missing);
            cells.push(cell);
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();

    Ok((Table::new(columns), skipped))
}

// Drop spaces at the start of every field, before quote handling, so
// `a, "b, c"` reads `b, c` as one quoted field
fn skip_initial_space(text: &str) -> Cow<'_, str> {
    if !text.contains(' ') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut field_start = true;
    let mut quoted_field = false;
    let mut in_quotes = false;
    for ch in text.chars() {
        if field_start {
            if ch == ' ' {
                continue;
            }
            field_start = false;
            quoted_field = ch == '"';
        }
        match ch {
            '"' if quoted_field => in_quotes = !in_quotes,
            ',' | '\n' if !in_quotes => field_start = true,
            _ => {}
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

// Empty headers become `Unnamed: <idx>`, repeated ones get `.1`, `.2`, ... suffixes
fn column_names(headers: &StringRecord) -> Vec<String> {
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Vec::new();
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }

    names
}
