//! All fatal error types for the reslint crate.
//!
//! These abort a run: broken input files, broken configuration, unreadable
//! schema or dictionary resources. Rule violations are never errors; they are
//! [`crate::report::ReportItem`]s.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("invalid resource family: {0}")]
    InvalidFamily(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("dictionary error: {0}")]
    Dictionary(String),
}

impl Error {
    /// Creates a new parse error for the given file and 1-based line.
    pub fn parse_error(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }
}
