//! Error types for the x937-export library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling and encoding a cash letter.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing the CSV batch manifest.
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error reading or writing JSON configuration or state.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// One or more transactions cannot be exported; no file was produced.
    #[error("Export validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The MICR line could not be decoded.
    #[error("MICR parsing error ({field}): {message}")]
    MicrParse { field: &'static str, message: String },

    /// A single transaction failed while its item records were built.
    #[error("Transaction {id}: {source}")]
    Transaction {
        id: u64,
        #[source]
        source: Box<Error>,
    },

    /// A field value does not fit its declared width or kind.
    #[error("Cannot encode {record}.{field}: {message}")]
    Encoding {
        record: &'static str,
        field: &'static str,
        message: String,
    },

    /// Counter state could not be read or written.
    #[error("State store error: {0}")]
    StateStore(String),

    /// The image capability failed to produce TIFF data.
    #[error("Image error: {0}")]
    Image(String),

    /// The deposit slip template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid destination format specified.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// General parsing error.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Error {
    /// Shorthand for an encoding failure on a named record field.
    pub fn encoding(record: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Error::Encoding {
            record,
            field,
            message: message.into(),
        }
    }

    /// Messages suitable for showing to an operator, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
