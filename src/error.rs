use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which of the mandatory `start` / `_uuid` headers a header row lacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSentinel {
    Start,
    Uuid,
    Both,
}

impl fmt::Display for MissingSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingSentinel::Start => write!(f, "start not found"),
            MissingSentinel::Uuid => write!(f, "uuid not found"),
            MissingSentinel::Both => write!(f, "start and uuid not found"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("cell {position} is not a string: {value}")]
    Type { position: usize, value: String },

    #[error("cannot transliterate {ch:?} in {text:?}")]
    Transliteration { text: String, ch: char },

    #[error("{0}")]
    MissingSentinel(MissingSentinel),

    #[error("failed to save schema of table {table}: {reason}")]
    Persistence { table: String, reason: String },

    #[error("no schema stored for table {0}")]
    NotFound(String),

    #[error("stored schema of table {table} is corrupt: {reason}")]
    Corruption { table: String, reason: String },

    #[error("header {header:?} of table {table} is not present in the sheet")]
    MissingHeader { table: String, header: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("statement failed: {0}")]
    Statement(String),

    #[error("spreadsheet error: {0}")]
    Sheet(String),

    #[error("console input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<postgres::Error> for Error {
    fn from(e: postgres::Error) -> Self {
        if e.is_closed() {
            Error::Connection(e.to_string())
        } else {
            Error::Statement(e.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Sheet(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Sheet(e.to_string())
    }
}
