//! Error handling for bedshift
//!
//! Provides error types for every layer of the tool:
//! - G-Code errors (coordinate parsing, empty toolpaths)
//! - Connection errors (print-server communication)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Represents errors raised while parsing or scanning a G-Code document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// An `X`/`Y` token on a motion line has a suffix that is not a number
    #[error("Malformed coordinate '{token}' at line {line_number}")]
    MalformedCoordinate {
        /// 1-based line number in the source document.
        line_number: usize,
        /// The offending token, verbatim.
        token: String,
    },

    /// The document contains no motion commands, so there is no path to show
    #[error("Document contains no motion commands")]
    EmptyPath,
}

/// Connection error type
///
/// Represents errors related to communication with the print server.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// The print-server URL could not be used
    #[error("Invalid print server URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {reason}")]
    Http {
        /// The reason for the HTTP failure.
        reason: String,
    },

    /// The server answered the upload with an unexpected status
    #[error("Upload of {file_name} rejected with status {status}: {body}")]
    UploadRejected {
        /// The remote file name that was sent.
        file_name: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A printer API call returned an error
    #[error("Printer call {method} failed: {reason}")]
    RpcFailed {
        /// The API method that was invoked.
        method: String,
        /// The reason for the failure.
        reason: String,
    },
}

/// Main error type for bedshift
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
