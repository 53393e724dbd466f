//! Cell-level parsers
//!
//! Every coercion here is total: input that does not parse becomes
//! [`Cell::Missing`] instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::types::Cell;

/// Field values read as missing, the usual CSV reader NA set
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    // Month first, then day first for values that cannot be month first
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Whether a raw field denotes a missing value
pub fn is_na_token(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// Turn a raw field into a text cell or the missing marker
pub fn raw_cell(raw: &str) -> Cell {
    if is_na_token(raw) {
        Cell::Missing
    } else {
        Cell::Text(raw.to_string())
    }
}

pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Coerce a cell to a number; anything unparsable becomes missing
pub fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Integer(i) => Cell::Integer(*i),
        Cell::Float(f) if f.is_nan() => Cell::Missing,
        Cell::Float(f) => Cell::Float(*f),
        Cell::Text(text) => {
            if let Some(i) = parse_integer(text) {
                Cell::Integer(i)
            } else {
                match parse_float(text) {
                    Some(f) if !f.is_nan() => Cell::Float(f),
                    _ => Cell::Missing,
                }
            }
        }
        Cell::Timestamp(_) | Cell::Duration(_) | Cell::Missing => Cell::Missing,
    }
}

/// Parse a timestamp in one of the accepted layouts
///
/// RFC 3339 values carrying an offset are converted to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Coerce a cell to a timestamp; integers are nanoseconds since the epoch
pub fn coerce_timestamp(cell: &Cell) -> Cell {
    let parsed = match cell {
        Cell::Timestamp(ts) => Some(*ts),
        Cell::Text(text) => parse_timestamp(text),
        Cell::Integer(nanos) => timestamp_from_nanos(*nanos),
        Cell::Float(f) if f.is_finite() => timestamp_from_nanos(*f as i64),
        Cell::Float(_) | Cell::Duration(_) | Cell::Missing => None,
    };
    parsed.map(Cell::Timestamp).unwrap_or(Cell::Missing)
}

fn timestamp_from_nanos(nanos: i64) -> Option<NaiveDateTime> {
    let secs = nanos.div_euclid(NANOS_PER_SEC);
    let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(secs, subsec).map(|dt| dt.naive_utc())
}

/// Parse a duration
///
/// Accepted forms:
/// - clock: `01:02:03`, `00:00:01.5`, `2 days 01:02:03`, `-00:00:05`,
///   `-1 days +23:59:55` (the leading sign binds to the day count)
/// - units: `90s`, `1.5 h`, `1h 30min`, `3 days`
/// - ISO 8601: `P1DT2H3M4.5S`
/// - a bare number, read as nanoseconds
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, body) = split_sign(text.trim())?;
    if body.is_empty() {
        return None;
    }

    let nanos = if body.starts_with(['P', 'p']) {
        apply_sign(negative, parse_iso_duration(&body[1..])?)?
    } else if body.contains(':') {
        parse_clock_duration(body, negative)?
    } else if let Ok(bare) = body.parse::<i64>() {
        apply_sign(negative, bare)?
    } else {
        apply_sign(negative, parse_unit_duration(body)?)?
    };

    Some(TimeDelta::nanoseconds(nanos))
}

/// Coerce a cell to a duration; numbers are nanoseconds
pub fn coerce_duration(cell: &Cell) -> Cell {
    let parsed = match cell {
        Cell::Duration(d) => Some(*d),
        Cell::Text(text) => parse_duration(text),
        Cell::Integer(nanos) => Some(TimeDelta::nanoseconds(*nanos)),
        Cell::Float(f) if f.is_finite() => Some(TimeDelta::nanoseconds(f.round() as i64)),
        Cell::Float(_) | Cell::Timestamp(_) | Cell::Missing => None,
    };
    parsed.map(Cell::Duration).unwrap_or(Cell::Missing)
}

fn split_sign(text: &str) -> Option<(bool, &str)> {
    Some(match *text.as_bytes().first()? {
        b'-' => (true, text[1..].trim_start()),
        b'+' => (false, text[1..].trim_start()),
        _ => (false, text),
    })
}

fn apply_sign(negative: bool, nanos: i64) -> Option<i64> {
    if negative {
        nanos.checked_neg()
    } else {
        Some(nanos)
    }
}

// `[D day[s][,] ][+|-]HH:MM:SS[.fffffffff]`
//
// With a day count, `negative` belongs to the days and the clock carries
// its own sign. Without one, `negative` applies to the clock.
fn parse_clock_duration(text: &str, negative: bool) -> Option<i64> {
    let (days, clock_negative, clock) = match text.find("day") {
        Some(pos) => {
            let days: i64 = text[..pos].trim().parse().ok()?;
            let rest = text[pos + 3..].trim_start_matches('s');
            let (clock_negative, clock) = split_sign(rest.trim_start_matches(',').trim())?;
            (apply_sign(negative, days)?, clock_negative, clock)
        }
        None => (0, negative, text),
    };

    let mut parts = clock.split(':');
    let (hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    if hours < 0 || minutes < 0 || minutes >= 60 {
        return None;
    }
    let seconds = scaled_nanos(seconds.trim(), NANOS_PER_SEC)?;
    if !(0..60 * NANOS_PER_SEC).contains(&seconds) {
        return None;
    }

    let clock = hours
        .checked_mul(3_600 * NANOS_PER_SEC)?
        .checked_add(minutes * 60 * NANOS_PER_SEC)?
        .checked_add(seconds)?;
    days.checked_mul(86_400 * NANOS_PER_SEC)?
        .checked_add(apply_sign(clock_negative, clock)?)
}

// One or more `<number><unit>` pairs, whitespace between them optional
fn parse_unit_duration(text: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut rest = text.trim();
    if rest.is_empty() {
        return None;
    }

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        if number.is_empty() {
            return None;
        }
        rest = rest[number_end..].trim_start();

        let unit_end = rest
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(rest.len());
        let unit = unit_nanos(&rest[..unit_end])?;
        rest = rest[unit_end..].trim_start_matches([' ', ',']);

        total = total.checked_add(scaled_nanos(number, unit)?)?;
    }

    Some(total)
}

// `nDTnHnMnS`, the leading `P` already removed
fn parse_iso_duration(text: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut in_time = false;
    let mut number_start = 0;
    let mut seen_component = false;

    for (idx, c) in text.char_indices() {
        match c.to_ascii_uppercase() {
            'T' if !in_time && number_start == idx => {
                in_time = true;
                number_start = idx + 1;
            }
            designator @ ('W' | 'D' | 'H' | 'M' | 'S') => {
                let unit = match (designator, in_time) {
                    ('W', false) => 7 * 86_400 * NANOS_PER_SEC,
                    ('D', false) => 86_400 * NANOS_PER_SEC,
                    ('H', true) => 3_600 * NANOS_PER_SEC,
                    ('M', true) => 60 * NANOS_PER_SEC,
                    ('S', true) => NANOS_PER_SEC,
                    _ => return None,
                };
                total = total.checked_add(scaled_nanos(&text[number_start..idx], unit)?)?;
                number_start = idx + 1;
                seen_component = true;
            }
            d if d.is_ascii_digit() || d == '.' => {}
            _ => return None,
        }
    }

    (seen_component && number_start == text.len()).then_some(total)
}

fn unit_nanos(unit: &str) -> Option<i64> {
    let nanos = match unit.to_ascii_lowercase().as_str() {
        "ns" | "nanos" | "nanosecond" | "nanoseconds" => 1,
        "us" | "µs" | "micros" | "microsecond" | "microseconds" => 1_000,
        "ms" | "millis" | "millisecond" | "milliseconds" => 1_000_000,
        "s" | "sec" | "secs" | "second" | "seconds" => NANOS_PER_SEC,
        "m" | "min" | "mins" | "minute" | "minutes" | "t" => 60 * NANOS_PER_SEC,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600 * NANOS_PER_SEC,
        "d" | "day" | "days" => 86_400 * NANOS_PER_SEC,
        "w" | "week" | "weeks" => 7 * 86_400 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

/// `number * unit` in nanoseconds, keeping integer parts exact
fn scaled_nanos(number: &str, unit: i64) -> Option<i64> {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let frac = if frac_part.is_empty() {
        0
    } else {
        let fraction: f64 = format!("0.{frac_part}").parse().ok()?;
        (fraction * unit as f64).round() as i64
    };

    whole.checked_mul(unit)?.checked_add(frac)
}
