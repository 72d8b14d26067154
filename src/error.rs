//! Error types for socket channels.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use socket_channels::{Client, ClientOptions, Result};
//!
//! fn example() -> Result<()> {
//!     let client = Client::open("localhost", 9000, ClientOptions::default())?;
//!     client.send("chat", &"hello")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Usage | [`Error::InvalidArgument`], [`Error::AlreadyOpen`], [`Error::NotConnected`] |
//! | Codec | [`Error::Encode`], [`Error::Decode`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::WebSocket`] |
//! | External | [`Error::Io`] |
//!
//! Usage errors fail fast. Malformed input from the network never surfaces
//! as an [`Error`] to application code; the dispatcher recovers it locally.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::client::Status;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Invalid argument supplied to the API.
    ///
    /// Returned when host or port is missing at construction, or when a
    /// channel name is empty.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Client is already opening or open.
    ///
    /// Returned by `start()` when the status is not `Disconnected`.
    #[error("Client already open (status: {status})")]
    AlreadyOpen {
        /// Status observed when the call was made.
        status: Status,
    },

    /// Client is not connected.
    ///
    /// Returned by `close()` when the status is already `Disconnected`.
    #[error("Client is not connected")]
    NotConnected,

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Payload could not be serialized into an envelope.
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Inbound text is not a valid envelope.
    ///
    /// Only produced by [`Envelope::decode`](crate::protocol::Envelope::decode);
    /// the dispatcher never propagates it.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport could not be opened or written to.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Transport handle was already torn down.
    #[error("Connection closed")]
    ConnectionClosed,

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an already open error.
    #[inline]
    pub fn already_open(status: Status) -> Self {
        Self::AlreadyOpen { status }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error reports misuse of the API.
    #[inline]
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::AlreadyOpen { .. } | Self::NotConnected
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::invalid_argument("host is required");
        assert_eq!(err.to_string(), "Invalid argument: host is required");
    }

    #[test]
    fn test_already_open_display() {
        let err = Error::already_open(Status::Connecting);
        assert_eq!(err.to_string(), "Client already open (status: connecting)");
    }

    #[test]
    fn test_is_usage_error() {
        assert!(Error::invalid_argument("x").is_usage_error());
        assert!(Error::already_open(Status::Connected).is_usage_error());
        assert!(Error::NotConnected.is_usage_error());
        assert!(!Error::ConnectionClosed.is_usage_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("x").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::from(WsError::ConnectionClosed).is_connection_error());
        assert!(!Error::NotConnected.is_connection_error());
        assert!(!Error::decode("bad").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
