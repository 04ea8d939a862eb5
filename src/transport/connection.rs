//! Reconnecting WebSocket transport and its worker task.
//!
//! This module owns the connection lifecycle: connect → open →
//! (fail → retry)* → close. A single spawned worker task exclusively
//! owns the socket stream, the [`TransportState`], the
//! [`RetryStrategy`] and the listener, so all state mutation is
//! single-tasked and lock-free by construction.
//!
//! # Worker Model
//!
//! Public operations ([`connect`], [`send_message`], [`close`]) never
//! touch the socket directly. They enqueue [`Command`]s onto an
//! unbounded channel; the worker interleaves those commands with socket
//! events through `tokio::select!`. Listener events are therefore
//! delivered strictly in the order the socket produced them, never
//! concurrently.
//!
//! Only [`close`] awaits anything: a oneshot ack the worker fires after
//! releasing the socket, bounded by [`CLOSE_TIMEOUT`].
//!
//! [`connect`]: WebSocketTransport::connect
//! [`send_message`]: WebSocketTransport::send_message
//! [`close`]: WebSocketTransport::close
//! [`RetryStrategy`]: super::retry::RetryStrategy

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::listener::TransportListener;
use super::options::TransportOptions;
use super::retry::RetryStrategy;
use super::tls::insecure_client_config;

// ============================================================================
// Constants
// ============================================================================

/// Subprotocol announced in the WebSocket handshake.
const SUBPROTOCOL: &str = "protoo";

/// Close reason sent with the graceful close frame (code 1000).
const CLOSE_REASON: &str = "bye";

/// Upper bound on how long `close()` waits for the worker to release
/// the socket. Keeps a caller from hanging if teardown never acks.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

/// A connected WebSocket stream (plain or TLS).
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// TransportState
// ============================================================================

/// Lifecycle state of a transport instance.
///
/// Exactly one per transport; mutated only on the worker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Created, `connect()` not yet called.
    Idle,
    /// A connection attempt is in flight or a retry is pending.
    Connecting,
    /// The socket is open and usable.
    Open,
    /// An explicit close is being carried out.
    Closing,
    /// Terminal. No further transitions or listener events.
    Closed,
}

// ============================================================================
// Command
// ============================================================================

/// Commands enqueued by callers for the worker task.
enum Command {
    /// Transmit a text payload if a live socket exists; dropped otherwise.
    Send(String),
    /// Tear the socket down and ack once released.
    Close { ack: oneshot::Sender<()> },
}

// ============================================================================
// Worker Outcomes
// ============================================================================

/// Why an open socket stopped being driven.
enum SocketOutcome {
    /// Transient socket failure; retry may follow.
    Failed,
    /// The server closed the session; terminal.
    RemoteClosed,
    /// A local close was requested (or the handle was dropped); the ack
    /// is `None` when there is no `close()` caller to release.
    LocalClose(Option<oneshot::Sender<()>>),
}

/// How a backoff wait ended.
enum BackoffOutcome {
    /// The delay elapsed; attempt the reconnect.
    Elapsed,
    /// A close arrived during the wait; the pending retry is abandoned.
    Close(Option<oneshot::Sender<()>>),
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// Resilient reconnecting WebSocket transport for protoo signalling.
///
/// A single-session object: one `connect()`, at most one live socket at
/// any time, one terminal close. All public operations are safe to call
/// from any task; they merely enqueue work for the worker.
///
/// # Example
///
/// ```ignore
/// use protoo_transport::{TransportListener, TransportOptions, WebSocketTransport};
///
/// struct Signalling;
/// impl TransportListener for Signalling {
///     fn on_message(&mut self, payload: &str) {
///         println!("<- {payload}");
///     }
/// }
///
/// let transport = WebSocketTransport::new(
///     "wss://demo.example.org:4443/?roomId=abc&peerId=1",
///     TransportOptions::new(),
/// )?;
/// transport.connect(Signalling);
/// transport.send_message(r#"{"request":true,"method":"join"}"#)?;
/// transport.close().await;
/// ```
pub struct WebSocketTransport {
    /// Validated signalling server URL (`ws://` or `wss://`).
    url: String,

    /// Retry and TLS configuration.
    options: TransportOptions,

    /// Terminal flag, shared with the worker. Set by `close()` and by
    /// the worker on exhaustion or remote close.
    closed: Arc<AtomicBool>,

    /// Command channel to the worker; populated by `connect()`.
    command_tx: Mutex<Option<mpsc::UnboundedSender<Command>>>,
}

impl WebSocketTransport {
    /// Creates a transport for the given signalling server URL.
    ///
    /// Does not connect. The URL must use the `ws` or `wss` scheme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL does not parse or uses
    /// another scheme.
    pub fn new(url: impl Into<String>, options: TransportOptions) -> Result<Self> {
        let url = url.into();
        let parsed = Url::parse(&url).map_err(|e| Error::invalid_url(&url, e.to_string()))?;

        match parsed.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(Error::invalid_url(
                    &url,
                    format!("scheme `{other}` is not ws or wss"),
                ));
            }
        }

        Ok(Self {
            url,
            options,
            closed: Arc::new(AtomicBool::new(false)),
            command_tx: Mutex::new(None),
        })
    }

    /// Binds the listener and starts connecting.
    ///
    /// Spawns the worker task and returns immediately; must be called
    /// within a Tokio runtime. The listener is moved onto the worker
    /// for the lifetime of the session.
    ///
    /// This is a single-session object: a second call is ignored with a
    /// warning, as is a call after [`close`].
    ///
    /// [`close`]: WebSocketTransport::close
    pub fn connect<L>(&self, listener: L)
    where
        L: TransportListener + 'static,
    {
        let mut guard = self.command_tx.lock();

        if guard.is_some() {
            warn!("connect() called more than once; ignored");
            return;
        }
        if self.closed.load(Ordering::SeqCst) {
            warn!("connect() on a closed transport; ignored");
            return;
        }
        if self.options.danger_accept_invalid_certs {
            warn!("TLS certificate verification disabled; demo use only");
        }

        debug!(url = %self.url, "connect()");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        *guard = Some(command_tx);

        tokio::spawn(run_worker(
            self.url.clone(),
            self.options.clone(),
            Box::new(listener),
            command_rx,
            Arc::clone(&self.closed),
        ));
    }

    /// Posts a text payload for transmission.
    ///
    /// Returns the exact payload that was (or would have been)
    /// transmitted so callers can log and correlate it. If no live
    /// socket exists when the worker dequeues the send (mid-reconnect,
    /// or `connect()` not yet called), the payload is dropped silently
    /// rather than buffered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportClosed`] if the transport is closed or
    /// closing; nothing is transmitted in that case.
    pub fn send_message(&self, payload: impl Into<String>) -> Result<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::TransportClosed);
        }

        let payload = payload.into();
        if let Some(command_tx) = self.command_tx.lock().as_ref() {
            // A send error means the worker already tore down; the
            // payload is dropped, matching the no-socket case.
            let _ = command_tx.send(Command::Send(payload.clone()));
        } else {
            debug!("send_message() before connect(); payload dropped");
        }

        Ok(payload)
    }

    /// Closes the transport.
    ///
    /// Idempotent and terminal: the first call requests teardown and
    /// awaits the worker's ack (bounded by 5 s); later calls return
    /// immediately. Cancels any pending reconnect. Never fails.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        debug!("close()");

        let command_tx = self.command_tx.lock().as_ref().cloned();
        let Some(command_tx) = command_tx else {
            // connect() was never called; nothing to release.
            return;
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if command_tx.send(Command::Close { ack: ack_tx }).is_err() {
            // Worker already finished (exhausted retries or remote close).
            return;
        }

        match timeout(CLOSE_TIMEOUT, ack_rx).await {
            Ok(_) => {}
            Err(_) => {
                warn!(
                    timeout_ms = CLOSE_TIMEOUT.as_millis() as u64,
                    "close() timed out waiting for socket teardown"
                );
            }
        }
    }

    /// Returns `true` once the transport is closed or closing.
    ///
    /// Non-blocking; reflects the terminal state.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Logs and applies a lifecycle state transition.
fn transition(state: &mut TransportState, next: TransportState) {
    trace!(from = ?state, to = ?next, "state transition");
    *state = next;
}

/// The worker task: owns the socket, the state machine, the retry
/// strategy and the listener for one session.
async fn run_worker(
    url: String,
    options: TransportOptions,
    mut listener: Box<dyn TransportListener>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    closed: Arc<AtomicBool>,
) {
    let mut state = TransportState::Connecting;
    let mut retry = RetryStrategy::new(options.retry.clone());
    // Set on the first successful open and never cleared by later
    // failures: once a session has been open, failures report on_fail
    // instead of on_disconnected.
    let mut ever_connected = false;
    let mut close_ack: Option<oneshot::Sender<()>> = None;

    loop {
        debug!(attempt = retry.attempt(), "connecting");
        let connect_result = connect_once(&url, &options).await;

        if closed.load(Ordering::SeqCst) {
            // close() raced the in-flight attempt; release the socket
            // without emitting session events for it.
            transition(&mut state, TransportState::Closing);
            if let Ok(mut ws) = connect_result {
                send_goodbye(&mut ws).await;
            }
            break;
        }

        match connect_result {
            Ok(ws) => {
                transition(&mut state, TransportState::Open);
                ever_connected = true;
                retry.reset();
                debug!("socket open");
                listener.on_open();

                match drive_socket(ws, &mut command_rx, listener.as_mut()).await {
                    SocketOutcome::Failed => {}
                    SocketOutcome::RemoteClosed => {
                        debug!("closed by server");
                        break;
                    }
                    SocketOutcome::LocalClose(ack) => {
                        transition(&mut state, TransportState::Closing);
                        close_ack = ack;
                        break;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "connection attempt failed");
            }
        }

        // Transient failure: consult the backoff scheduler.
        transition(&mut state, TransportState::Connecting);
        match retry.next_delay() {
            Some(delay) => {
                retry.mark_attempted();
                if ever_connected {
                    listener.on_fail();
                } else {
                    listener.on_disconnected();
                }
                debug!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = retry.attempt(),
                    "reconnect scheduled"
                );

                match wait_backoff(delay, &mut command_rx).await {
                    BackoffOutcome::Elapsed => {}
                    BackoffOutcome::Close(ack) => {
                        transition(&mut state, TransportState::Closing);
                        close_ack = ack;
                        break;
                    }
                }
            }
            None => {
                error!(
                    retries = retry.attempt(),
                    "retry budget exhausted; giving up"
                );
                break;
            }
        }
    }

    // Terminal teardown: exactly one on_close, then release waiters.
    closed.store(true, Ordering::SeqCst);
    transition(&mut state, TransportState::Closed);
    listener.on_close();
    debug!(state = ?state, "transport closed");

    command_rx.close();
    while let Ok(command) = command_rx.try_recv() {
        if let Command::Close { ack } = command {
            let _ = ack.send(());
        }
    }
    if let Some(ack) = close_ack {
        let _ = ack.send(());
    }
}

/// Performs one connection attempt: handshake with the protoo
/// subprotocol header and the configured TLS policy.
async fn connect_once(url: &str, options: &TransportOptions) -> Result<WsStream> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

    let connector = if options.danger_accept_invalid_certs {
        Some(Connector::Rustls(insecure_client_config()?))
    } else {
        None
    };

    let (stream, response) = connect_async_tls_with_config(request, None, false, connector).await?;
    debug!(status = %response.status(), "websocket handshake complete");

    Ok(stream)
}

/// Drives an open socket until it fails, the server closes it, or a
/// local close is requested.
async fn drive_socket(
    ws: WsStream,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    listener: &mut dyn TransportListener,
) -> SocketOutcome {
    let (mut writer, mut reader) = ws.split();

    loop {
        tokio::select! {
            message = reader.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "message received");
                        listener.on_message(text.as_str());
                    }

                    // Binary frames are accepted at the protocol level
                    // but not surfaced to the listener.
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "ignoring binary frame");
                    }

                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "close frame from server");
                        return SocketOutcome::RemoteClosed;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "socket failure");
                        return SocketOutcome::Failed;
                    }

                    None => {
                        debug!("socket stream ended");
                        return SocketOutcome::RemoteClosed;
                    }

                    // Ping/Pong are handled by tungstenite.
                    _ => {}
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(Command::Send(payload)) => {
                        if let Err(e) = writer.send(Message::Text(payload.into())).await {
                            warn!(error = %e, "send failed");
                            return SocketOutcome::Failed;
                        }
                        trace!("payload sent");
                    }

                    Some(Command::Close { ack }) => {
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: CLOSE_REASON.into(),
                        };
                        if let Err(e) = writer.send(Message::Close(Some(frame))).await {
                            debug!(error = %e, "close frame not delivered");
                        }
                        return SocketOutcome::LocalClose(Some(ack));
                    }

                    None => {
                        // Handle dropped without close(); tear down.
                        debug!("transport handle dropped");
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: CLOSE_REASON.into(),
                        };
                        let _ = writer.send(Message::Close(Some(frame))).await;
                        return SocketOutcome::LocalClose(None);
                    }
                }
            }
        }
    }
}

/// Waits out a backoff delay while still serving commands. Sends are
/// dropped (no live socket); a close abandons the pending retry.
async fn wait_backoff(
    delay: Duration,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> BackoffOutcome {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return BackoffOutcome::Elapsed,

            command = command_rx.recv() => {
                match command {
                    Some(Command::Send(_)) => {
                        debug!("dropping send while disconnected");
                    }
                    Some(Command::Close { ack }) => {
                        return BackoffOutcome::Close(Some(ack));
                    }
                    None => {
                        return BackoffOutcome::Close(None);
                    }
                }
            }
        }
    }
}

/// Gracefully releases a socket that opened after close() was already
/// requested.
async fn send_goodbye(ws: &mut WsStream) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: CLOSE_REASON.into(),
    };
    if let Err(e) = ws.close(Some(frame)).await {
        debug!(error = %e, "goodbye close failed");
    }
}

// ============================================================================
// Tests
// ============================================================================
