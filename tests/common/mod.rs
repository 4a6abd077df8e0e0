//! In-process signal backend for integration tests.
//!
//! Serves `GET /api/signals` with a canned snapshot and `/ws/signals` as a
//! stream whose frames are pushed by the test.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
enum Frame {
    Text(String),
    Close,
}

#[derive(Clone)]
struct MockState {
    snapshot: Arc<Mutex<(u16, String)>>,
    limits: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<(usize, u16)>>,
    snapshot_delay: Arc<Mutex<Duration>>,
    frames: broadcast::Sender<Frame>,
    opened: mpsc::UnboundedSender<()>,
}

pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    opened_rx: mpsc::UnboundedReceiver<()>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start a server answering the snapshot request with `status` and `body`.
    pub async fn start(status: u16, body: Value) -> Self {
        let (frames, _) = broadcast::channel(64);
        let (opened, opened_rx) = mpsc::unbounded_channel();
        let state = MockState {
            snapshot: Arc::new(Mutex::new((status, body.to_string()))),
            limits: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new((0, 200))),
            snapshot_delay: Arc::new(Mutex::new(Duration::ZERO)),
            frames,
            opened,
        };

        let app = Router::new()
            .route("/api/signals", get(signals_handler))
            .route("/ws/signals", get(ws_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            opened_rx,
            handle,
        }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws/signals", self.addr)
    }

    /// Wait until the next stream connection is accepted and listening.
    pub async fn wait_for_open(&mut self) {
        tokio::time::timeout(TEST_TIMEOUT, self.opened_rx.recv())
            .await
            .expect("timed out waiting for a stream connection")
            .expect("server stopped");
    }

    /// Whether another stream connection was accepted since the last wait.
    pub fn has_pending_open(&mut self) -> bool {
        self.opened_rx.try_recv().is_ok()
    }

    /// Push a raw text frame to every open stream connection.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.state.frames.send(Frame::Text(text.into()));
    }

    pub fn send_signal(&self, signal: Value) {
        self.send_text(signal.to_string());
    }

    /// Close every open stream connection with code 1001.
    pub fn close_streams(&self) {
        let _ = self.state.frames.send(Frame::Close);
    }

    /// Answer the next `count` snapshot requests with `status` before
    /// serving the configured snapshot again.
    pub fn fail_next(&self, count: usize, status: u16) {
        *self.state.failing.lock().unwrap() = (count, status);
    }

    /// Hold every snapshot response for `delay`.
    pub fn delay_snapshot(&self, delay: Duration) {
        *self.state.snapshot_delay.lock().unwrap() = delay;
    }

    /// Number of snapshot requests served so far.
    pub fn snapshot_requests(&self) -> usize {
        self.state.limits.lock().unwrap().len()
    }

    /// The `limit` query values seen by the snapshot endpoint.
    pub fn requested_limits(&self) -> Vec<String> {
        self.state.limits.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn signal_json(ts: &str, price: f64, z_score: f64, signal_type: &str) -> Value {
    json!({
        "symbol": "BTCUSDT",
        "price": price,
        "timestamp": ts,
        "z_score": z_score,
        "type": signal_type,
    })
}

async fn signals_handler(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let limit = params.get("limit").cloned().unwrap_or_default();
    state.limits.lock().unwrap().push(limit);

    let delay = *state.snapshot_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let failure = {
        let mut failing = state.failing.lock().unwrap();
        if failing.0 > 0 {
            failing.0 -= 1;
            Some(failing.1)
        } else {
            None
        }
    };
    let (status, body) = match failure {
        Some(status) => (status, json!({"detail": "unavailable"}).to_string()),
        None => state.snapshot.lock().unwrap().clone(),
    };
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<MockState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: MockState) {
    let (mut sender, mut receiver) = socket.split();
    let mut frames = state.frames.subscribe();
    let _ = state.opened.send(());

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(Frame::Text(text)) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        return;
                    }
                }
                Ok(Frame::Close) => {
                    let _ = sender
                        .send(Message::Close(Some(CloseFrame {
                            code: 1001,
                            reason: "going away".into(),
                        })))
                        .await;
                    return;
                }
                Err(_) => return,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => {}
            },
        }
    }
}
