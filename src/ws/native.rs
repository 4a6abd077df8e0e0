//! Native WebSocket client: `tokio-tungstenite`.
//!
//! - Background tokio task owns the single connection
//! - Connection lifecycle driven by [`ConnectionMachine`]
//! - Fixed-delay (or opt-in backoff) reconnection, unlimited
//! - Pending retry cancelled on disconnect
//! - Stream-based event delivery to consumer, in arrival order

use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::{decode_signal, ConnectionMachine, ConnectionState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Disconnect,
}

// ─── How a connected session ended ───────────────────────────────────────────

enum DisconnectReason {
    UserRequested,
    Dropped { code: Option<u16>, reason: String },
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: WsConfig,
    event_tx: mpsc::UnboundedSender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    machine: ConnectionMachine,
    ready_state: Arc<AtomicU8>,
}

impl TaskState {
    fn emit(&self, event: WsEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Mirror the machine's state to the shared flag and tell the consumer.
    fn publish(&self) {
        let state = self.machine.state();
        let previous = ConnectionState::from(self.ready_state.swap(state as u8, Ordering::SeqCst));
        if previous != state {
            tracing::debug!("Connection state {:?} -> {:?}", previous, state);
            self.emit(WsEvent::StateChanged(state));
        }
    }

    fn teardown(&mut self) {
        self.machine.teardown();
        self.publish();
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native WebSocket client for the live signal stream.
///
/// Uses a background tokio task for connection management.
/// The public API communicates with it via mpsc channels.
pub struct WsClient {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<WsEvent>>>,
    event_tx: mpsc::UnboundedSender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU8>,
}

impl WsClient {
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(Some(event_rx)),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU8::new(ConnectionState::Disconnected as u8)),
        }
    }

    /// Connect to the WebSocket server.
    ///
    /// Spawns a background tokio task that owns the connection and its
    /// reconnection. Calling this while a task is already running is a no-op.
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if let Some(handle) = &self.task_handle {
            if !handle.is_finished() {
                tracing::debug!("WebSocket task already running, skipping connect");
                return Ok(());
            }
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        self.cmd_tx = Some(cmd_tx);

        let state = TaskState {
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            machine: ConnectionMachine::from_config(&self.config),
            ready_state: Arc::clone(&self.ready_state),
        };

        self.task_handle = Some(tokio::spawn(run_task(state)));
        Ok(())
    }

    /// Tear down: close the active connection, cancel any pending retry, and
    /// wait for the background task to finish.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(mut handle) = self.task_handle.take() {
            if tokio::time::timeout(Duration::from_secs(5), &mut handle)
                .await
                .is_err()
            {
                tracing::warn!("WebSocket task did not stop in time, aborting");
                handle.abort();
            }
        }

        self.mark_disconnected();
        Ok(())
    }

    /// Force the shared state to `Disconnected`, telling the consumer if the
    /// task did not get to it (it was aborted mid-connection).
    fn mark_disconnected(&self) {
        let previous = ConnectionState::from(
            self.ready_state
                .swap(ConnectionState::Disconnected as u8, Ordering::SeqCst),
        );
        if previous != ConnectionState::Disconnected {
            let _ = self
                .event_tx
                .send(WsEvent::StateChanged(ConnectionState::Disconnected));
        }
    }

    /// Whether the stream is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Move the event receiver out, e.g. to consume it on another task.
    ///
    /// Returns `None` if it was already taken; [`Self::events`] then ends
    /// immediately.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<WsEvent>> {
        self.event_rx.get_mut().take()
    }

    /// Get a stream of events from the WebSocket connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                let event = guard.as_mut()?.recv().await?;
                drop(guard);
                Some((event, rx))
            },
        ))
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Begin attempt ─────────────────────────────────────────────
        if let Err(e) = state.machine.connect() {
            tracing::warn!("Connection attempt refused: {}", e);
            return;
        }
        state.publish();
        tracing::info!("Connecting to {}", state.config.url);

        // ── 2. Open (cancellable) ────────────────────────────────────────
        let timeout = Duration::from_millis(state.config.connect_timeout_ms);
        let attempt = tokio::select! {
            res = attempt_connect(&state.config.url, timeout) => res,
            _ = state.cmd_rx.recv() => {
                tracing::info!("Disconnect requested while connecting");
                state.teardown();
                return;
            }
        };

        // ── 3. Connected loop / failure ──────────────────────────────────
        match attempt {
            Ok((sink, stream)) => {
                state.machine.opened();
                state.publish();
                tracing::info!("WebSocket connected");

                match run_connected(&mut state, sink, stream).await {
                    DisconnectReason::UserRequested => {
                        state.teardown();
                        return;
                    }
                    DisconnectReason::Dropped { code, reason } => {
                        tracing::info!("WebSocket closed: code={:?}, reason={}", code, reason);
                        state.emit(WsEvent::Disconnected { code, reason });
                    }
                }
            }
            Err(e) => {
                tracing::error!("WebSocket connection failed: {}", e);
                state.emit(WsEvent::Disconnected {
                    code: None,
                    reason: e.to_string(),
                });
            }
        }

        // ── 4. Schedule the retry ────────────────────────────────────────
        let delay = state.machine.dropped();
        state.publish();
        let Some(delay) = delay else {
            tracing::info!("Reconnect disabled, stopping");
            return;
        };

        let attempt = state.machine.failures();
        tracing::info!("Reconnect attempt {} in {}ms", attempt, delay.as_millis());
        state.emit(WsEvent::RetryScheduled {
            attempt,
            delay_ms: delay.as_millis() as u64,
        });

        // ── 5. Wait (cancellable) ────────────────────────────────────────
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                state.machine.retry_fired();
            }
            _ = state.cmd_rx.recv() => {
                tracing::info!("Disconnect requested, cancelling pending reconnect");
                state.teardown();
                return;
            }
        }
    }
}

/// The inner connected loop. Runs until the connection breaks or the
/// consumer asks to disconnect.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match decode_signal(text_str) {
                            Ok(signal) => state.emit(WsEvent::Signal(signal)),
                            Err(e) => {
                                tracing::warn!(
                                    "Dropping malformed frame: {} (raw: {})",
                                    e,
                                    text_str
                                );
                                state.emit(WsEvent::DecodeError(e.to_string()));
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        return DisconnectReason::Dropped { code: Some(code), reason };
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        return DisconnectReason::Dropped { code: None, reason };
                    }
                    None => {
                        return DisconnectReason::Dropped {
                            code: None,
                            reason: "Stream ended".into(),
                        };
                    }
                }
            }

            // ── b) Command from public API (or client dropped) ───────────
            _ = state.cmd_rx.recv() => {
                let _ = sink.send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "Client disconnect".into(),
                }))).await;
                return DisconnectReason::UserRequested;
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection within `timeout`.
async fn attempt_connect(
    url: &str,
    timeout: Duration,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), WsError> {
    let (ws_stream, _) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| WsError::ConnectionFailed("Connection timeout".to_string()))?
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    Ok(ws_stream.split())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
