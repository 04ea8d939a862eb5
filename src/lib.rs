//! protoo-transport - Resilient reconnecting WebSocket signalling transport.
//!
//! This library keeps a persistent, message-oriented connection to a
//! protoo signalling server alive across transient network failures
//! without losing session continuity. It is the transport underneath a
//! media-session client: the signalling protocol itself (request
//! correlation, notifications) and the media engine are external
//! collaborators; payloads pass through as opaque text.
//!
//! # Architecture
//!
//! - One [`WebSocketTransport`] per session, one worker task per
//!   transport: the worker exclusively owns the socket, the lifecycle
//!   state and the retry counter, so no locks guard them.
//! - Callers interact through non-blocking operations that enqueue work
//!   for the worker; only [`close`] awaits the teardown ack.
//! - Failures inside the retry budget surface as informational listener
//!   events; exhausting the budget escalates to a single terminal
//!   [`on_close`].
//!
//! # Quick Start
//!
//! ```no_run
//! use protoo_transport::{Result, TransportListener, TransportOptions, WebSocketTransport};
//!
//! struct Signalling;
//!
//! impl TransportListener for Signalling {
//!     fn on_open(&mut self) {
//!         println!("connected");
//!     }
//!
//!     fn on_message(&mut self, payload: &str) {
//!         println!("<- {payload}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let transport = WebSocketTransport::new(
//!         "wss://demo.example.org:4443/?roomId=abc&peerId=1",
//!         TransportOptions::new(),
//!     )?;
//!
//!     transport.connect(Signalling);
//!     transport.send_message(r#"{"request":true,"method":"join"}"#)?;
//!     transport.close().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`transport`] | Transport handle, listener contract, retry policy |
//!
//! [`close`]: WebSocketTransport::close
//! [`on_close`]: TransportListener::on_close

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Resilient WebSocket transport layer.
///
/// Connection lifecycle, listener contract, retry policy and the
/// trust-all TLS opt-in.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Transport types
pub use transport::{
    RetryPolicy, RetryStrategy, TransportListener, TransportOptions, TransportState,
    WebSocketTransport,
};
