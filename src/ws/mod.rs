//! WebSocket layer: connection state, events, frame decoding.
//!
//! The transport lives in `native.rs` (`ws-native` feature, `tokio-tungstenite`).
//! This module defines the transport-independent pieces: the connection
//! state machine, the events emitted to consumers, and how an inbound text
//! frame becomes a [`Signal`].

pub mod state;

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::signal::wire::SignalResponse;
use crate::domain::signal::Signal;
use crate::error::WsError;
use crate::network::{DEFAULT_RECONNECT_DELAY_MS, DEFAULT_WS_URL};
use crate::shared::Backoff;
use std::time::Duration;

pub use state::ConnectionMachine;

// ─── Connection state ────────────────────────────────────────────────────────

/// Live stream connection state. There is one per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    #[default]
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    /// `Connecting` or `Connected`.
    pub fn is_active(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected)
    }
}

impl From<u8> for ConnectionState {
    fn from(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}

// ─── Inbound frames ──────────────────────────────────────────────────────────

/// Decode one inbound text frame into a validated signal.
pub fn decode_signal(text: &str) -> Result<Signal, WsError> {
    let wire: SignalResponse =
        serde_json::from_str(text).map_err(|e| WsError::Decode(e.to_string()))?;
    Signal::try_from(wire).map_err(|e| WsError::Decode(e.to_string()))
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Connection state transition.
    StateChanged(ConnectionState),
    /// A decoded signal from the stream.
    Signal(Signal),
    /// A frame that could not be decoded; it was dropped.
    DecodeError(String),
    /// Connection lost or a connection attempt failed.
    Disconnected { code: Option<u16>, reason: String },
    /// A reconnect will be attempted after `delay_ms`.
    RetryScheduled { attempt: u32, delay_ms: u64 },
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// How long to wait before reopening a dropped stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconnectPolicy {
    /// Same delay after every drop, no retry ceiling.
    Fixed(Duration),
    /// Exponential delay, growing with consecutive failed attempts.
    Backoff(Backoff),
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed(Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS))
    }
}

impl ReconnectPolicy {
    /// Delay before the retry that follows `failures` consecutive drops (0-indexed).
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        match self {
            ReconnectPolicy::Fixed(d) => *d,
            ReconnectPolicy::Backoff(b) => b.delay_for_attempt(failures),
        }
    }
}

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    /// When false, a dropped stream stays down.
    pub reconnect: bool,
    pub reconnect_policy: ReconnectPolicy,
    pub connect_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            reconnect: true,
            reconnect_policy: ReconnectPolicy::default(),
            connect_timeout_ms: 30_000,
        }
    }
}
