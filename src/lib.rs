//! csvserve - serve a cleaned CSV production log as a JSON API
//!
//! The data file is read once at startup:
//! - decoded by trying UTF-8, Latin-1, ISO-8859-1 and Windows-1252 in turn
//! - cleaned (fixed columns dropped, timestamp/duration/numeric columns coerced)
//! - held read-only in the HTTP application state
//!
//! `GET /api/data` returns the rows as an array of JSON objects.

pub mod api;
pub mod config;
pub mod error;
pub mod serialize;
pub mod table;
pub mod types;

pub use error::{Error, Result};
