//! Resilient WebSocket transport layer.
//!
//! This module keeps a signalling session alive across transient
//! network failures: it owns the live socket, serializes all access to
//! it through one worker task, and applies exponential backoff between
//! reconnect attempts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                           ┌──────────────────┐
//! │ Signalling layer │                           │ Signalling server│
//! │                  │   WebSocket (protoo)      │                  │
//! │ WebSocketTransport◄─────────────────────────►│ protoo endpoint  │
//! │  → worker task   │   retry w/ backoff        │                  │
//! └──────────────────┘                           └──────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! 1. `WebSocketTransport::new` - validate the server URL
//! 2. `connect(listener)` - spawn the worker, start connecting
//! 3. `on_open` / `on_message` - the session is live
//! 4. `on_fail` / `on_disconnected` - transient failure, retry pending
//! 5. `close()` / `on_close` - terminal; the instance is inert
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Transport handle, worker task, state machine |
//! | `listener` | Event contract implemented by the signalling layer |
//! | `options` | Builder-style transport configuration |
//! | `retry` | Exponential backoff scheduling |
//! | `tls` | Trust-all TLS opt-in for self-signed demo servers |

// ============================================================================
// Submodules
// ============================================================================

/// Transport handle, worker task and state machine.
pub mod connection;

/// Event contract between transport and signalling layer.
pub mod listener;

/// Transport configuration options.
pub mod options;

/// Exponential backoff scheduling.
pub mod retry;

/// Trust-all TLS configuration (explicit opt-in only).
mod tls;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{TransportState, WebSocketTransport};
pub use listener::TransportListener;
pub use options::TransportOptions;
pub use retry::{RetryPolicy, RetryStrategy};
