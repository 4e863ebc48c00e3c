//! Error types for the host server client
//!
//! This module defines all error types that can occur while talking to the
//! database host server, from framing problems in the byte stream up to
//! structured server-reported failures.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::reply::Sqlca;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the host server client
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Framing Errors (fatal, the connection is unusable afterwards)
    // =========================================================================
    /// General framing error in a message
    #[error("framing error: {0}")]
    Framing(String),

    /// Reply carried an unexpected req/rep id
    #[error("unexpected reply id: expected {expected:#06x}, got {actual:#06x}")]
    UnexpectedReply { expected: u16, actual: u16 },

    /// Reply correlation id does not match the outstanding request
    #[error("correlation mismatch: expected {expected}, got {actual}")]
    CorrelationMismatch { expected: u32, actual: u32 },

    /// Malformed run-length record in a compressed reply
    #[error("malformed RLE run: {0}")]
    MalformedRun(String),

    /// Message declares a length beyond the configured limit
    #[error("message too large: {length} bytes (limit {max})")]
    MessageTooLarge { length: usize, max: usize },

    // =========================================================================
    // Buffer Errors
    // =========================================================================
    /// Buffer underflow - not enough data to read
    #[error("buffer underflow: need {needed} bytes but only {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    /// Buffer overflow - not enough space to write
    #[error("buffer overflow: need {needed} bytes but only {available} available")]
    BufferOverflow { needed: usize, available: usize },

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// Server reported an error (negative return code)
    #[error("{0}")]
    Server(Box<ServerError>),

    // =========================================================================
    // Application Errors (raised before any bytes are sent)
    // =========================================================================
    /// A required attribute was not supplied
    #[error("{operation}: missing required attribute {attribute}")]
    MissingAttribute {
        operation: &'static str,
        attribute: &'static str,
    },

    /// An attribute combination is not allowed
    #[error("{operation}: invalid attributes: {reason}")]
    InvalidAttribute {
        operation: &'static str,
        reason: String,
    },

    // =========================================================================
    // Data Errors
    // =========================================================================
    /// Text could not be converted to or from the wire encoding
    #[error("data conversion error: {0}")]
    DataConversionError(String),

    // =========================================================================
    // Connection Errors
    // =========================================================================
    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection closed unexpectedly or unusable after a fatal error
    #[error("connection closed unexpectedly")]
    ConnectionClosed,

    /// Connection timeout
    #[error("connection timeout after {0:?}")]
    ConnectionTimeout(std::time::Duration),

    /// Invalid connection string
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// TLS setup failed
    #[error("TLS error: {0}")]
    Tls(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failure reported by the server in a reply template
///
/// Produced when the reply's return code class is non-zero and the return
/// code is negative. Whatever message and SQLCA information the reply carried
/// is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerError {
    /// Return code class from the reply template
    pub rc_class: u16,
    /// Return code from the reply template
    pub return_code: i32,
    /// Message id (e.g. `SQL0204`)
    pub message_id: Option<String>,
    /// First-level message text
    pub message_text: Option<String>,
    /// Second-level message text
    pub second_level_text: Option<String>,
    /// SQL communications area, if the reply carried one
    pub sqlca: Option<Sqlca>,
}

impl ServerError {
    /// SQLCODE from the attached SQLCA, if any
    pub fn sqlcode(&self) -> Option<i32> {
        self.sqlca.as_ref().map(|s| s.sqlcode)
    }

    /// SQLSTATE from the attached SQLCA, if any
    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlca.as_ref().map(|s| s.sqlstate.as_str())
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "server error (class {}, rc {})",
            self.rc_class, self.return_code
        )?;
        if let Some(id) = &self.message_id {
            write!(f, " {}", id)?;
        }
        if let Some(text) = &self.message_text {
            write!(f, ": {}", text)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a framing error
    pub fn framing(message: impl Into<String>) -> Self {
        Error::Framing(message.into())
    }

    /// Create a missing attribute error
    pub fn missing(operation: &'static str, attribute: &'static str) -> Self {
        Error::MissingAttribute {
            operation,
            attribute,
        }
    }

    /// Create an invalid attribute error
    pub fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            operation,
            reason: reason.into(),
        }
    }

    /// Check if this error means the byte stream can no longer be trusted
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Error::Framing(_)
                | Error::UnexpectedReply { .. }
                | Error::CorrelationMismatch { .. }
                | Error::MalformedRun(_)
                | Error::MessageTooLarge { .. }
                | Error::BufferUnderflow { .. }
        )
    }

    /// Check if this is a server-reported error
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }

    /// Get the server error details, if this is one
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Error::Server(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this error was raised before anything was sent
    pub fn is_application_error(&self) -> bool {
        matches!(
            self,
            Error::MissingAttribute { .. } | Error::InvalidAttribute { .. }
        )
    }

    /// Check if this is a connection-related error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::ConnectionClosed | Error::ConnectionTimeout(_) | Error::Io(_)
        )
    }

    /// Check if this error leaves the connection unusable
    pub fn is_fatal(&self) -> bool {
        self.is_framing() || self.is_connection_error()
    }

    /// Check if this error is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::ConnectionTimeout(_) | Error::ConnectionClosed)
    }
}

impl From<ServerError> for Error {
    fn from(e: ServerError) -> Self {
        Error::Server(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err: Error = ServerError {
            rc_class: 2,
            return_code: -509,
            message_id: Some("SQL0204".to_string()),
            message_text: Some("T1 in MYLIB type *FILE not found.".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(
            err.to_string(),
            "server error (class 2, rc -509) SQL0204: T1 in MYLIB type *FILE not found."
        );
    }

    #[test]
    fn test_is_framing() {
        assert!(Error::framing("bad length").is_framing());
        assert!(Error::MalformedRun("zero count".to_string()).is_framing());
        assert!(Error::UnexpectedReply {
            expected: 0x2800,
            actual: 0x1234
        }
        .is_framing());
        assert!(!Error::missing("prepare", "statement text").is_framing());
        assert!(!Error::from(ServerError::default()).is_framing());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "x")).is_connection_error());
        assert!(!Error::framing("x").is_connection_error());
    }

    #[test]
    fn test_server_error_accessors() {
        let err: Error = ServerError {
            rc_class: 2,
            return_code: -204,
            ..Default::default()
        }
        .into();
        assert!(err.is_server_error());
        assert!(!err.is_fatal());
        assert_eq!(err.server_error().map(|e| e.return_code), Some(-204));
        assert_eq!(err.server_error().and_then(|e| e.sqlcode()), None);
    }

    #[test]
    fn test_application_error() {
        let err = Error::missing("change descriptor", "descriptor handle");
        assert!(err.is_application_error());
        assert_eq!(
            err.to_string(),
            "change descriptor: missing required attribute descriptor handle"
        );
    }
}
