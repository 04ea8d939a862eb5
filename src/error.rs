//! Error types for the protoo transport.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use protoo_transport::{Result, WebSocketTransport};
//!
//! fn send_join(transport: &WebSocketTransport) -> Result<String> {
//!     transport.send_message(r#"{"request":true,"method":"join"}"#)
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::InvalidUrl`], [`Error::Tls`] |
//! | Connection | [`Error::Connection`], [`Error::TransportClosed`] |
//! | External | [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

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
///
/// Socket failures that happen on the worker task are not represented
/// here. They are converted into listener events ([`on_fail`],
/// [`on_disconnected`], [`on_close`]) and never reach caller threads.
///
/// [`on_fail`]: crate::TransportListener::on_fail
/// [`on_disconnected`]: crate::TransportListener::on_disconnected
/// [`on_close`]: crate::TransportListener::on_close
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The signalling server URL is not a valid `ws://` or `wss://` URL.
    #[error("Invalid transport URL `{url}`: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Description of what is wrong with it.
        message: String,
    },

    /// Building the TLS client configuration failed.
    #[error("TLS configuration error: {message}")]
    Tls {
        /// Description of the TLS setup failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when a connection attempt cannot be carried out at all
    /// (as opposed to a transient socket failure, which is retried).
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The transport is closed or closing.
    ///
    /// Returned by [`send_message`] once [`close`] has been requested or
    /// the transport reached its terminal state.
    ///
    /// [`send_message`]: crate::WebSocketTransport::send_message
    /// [`close`]: crate::WebSocketTransport::close
    #[error("Transport closed")]
    TransportClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a TLS configuration error.
    #[inline]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls {
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
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::TransportClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error signals misuse of a closed transport.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::TransportClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("handshake refused");
        assert_eq!(err.to_string(), "Connection failed: handshake refused");
    }

    #[test]
    fn test_invalid_url_display() {
        let err = Error::invalid_url("http://host", "scheme must be ws or wss");
        assert_eq!(
            err.to_string(),
            "Invalid transport URL `http://host`: scheme must be ws or wss"
        );
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::TransportClosed.is_connection_error());
        assert!(!Error::tls("test").is_connection_error());
    }

    #[test]
    fn test_is_closed() {
        assert!(Error::TransportClosed.is_closed());
        assert!(!Error::connection("test").is_closed());
    }
}
