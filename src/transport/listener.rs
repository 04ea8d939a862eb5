//! Listener contract between the transport and the signalling layer.

// ============================================================================
// TransportListener
// ============================================================================

/// Events delivered by the transport to the signalling layer.
///
/// A listener is bound once per [`connect`] call and moved onto the
/// worker task; all callbacks are invoked from that single task, so no
/// two events are ever delivered concurrently and ordering follows the
/// order generated by the underlying socket.
///
/// # Firing Discipline
///
/// - [`on_open`]: the socket is usable. Fires exactly once per
///   successful connection and resets the retry counter.
/// - [`on_fail`]: an established connection was lost; a retry has been
///   scheduled.
/// - [`on_disconnected`]: a connection attempt failed before ever
///   reaching open this session; a retry has been scheduled.
/// - [`on_close`]: terminal. Retries exhausted, the server closed the
///   session, or [`close`] was called. Delivered at most once per
///   transport instance; no event follows it.
/// - [`on_message`]: inbound text frame while open. Payloads are opaque
///   to the transport.
///
/// All methods default to no-ops so consumers only implement the events
/// they care about.
///
/// [`connect`]: crate::WebSocketTransport::connect
/// [`close`]: crate::WebSocketTransport::close
/// [`on_open`]: TransportListener::on_open
/// [`on_fail`]: TransportListener::on_fail
/// [`on_disconnected`]: TransportListener::on_disconnected
/// [`on_close`]: TransportListener::on_close
/// [`on_message`]: TransportListener::on_message
pub trait TransportListener: Send {
    /// The socket is open and usable.
    fn on_open(&mut self) {}

    /// An established connection was lost; reconnecting.
    fn on_fail(&mut self) {}

    /// A connection attempt failed before opening; reconnecting.
    fn on_disconnected(&mut self) {}

    /// Terminal close; no further events will be delivered.
    fn on_close(&mut self) {}

    /// An inbound text payload arrived while open.
    fn on_message(&mut self, payload: &str) {
        let _ = payload;
    }
}

// ============================================================================
// Tests
// ============================================================================
