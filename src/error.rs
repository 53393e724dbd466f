//! Error types for csvserve

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File is unreadable under all attempted encodings ({attempted})")]
    UnreadableEncoding { attempted: String },

    #[error("Cannot decode file as {0}")]
    Decode(String),

    #[error("No columns to parse from file")]
    NoColumns,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
