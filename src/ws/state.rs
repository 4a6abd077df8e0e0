//! Connection state machine for the live stream.
//!
//! `Disconnected → Connecting → Connected → Disconnected → (retry) → Connecting → …`
//!
//! The transport drives it and publishes every state it returns. It holds no
//! timers; it only decides whether a retry is owed and with what delay.

use super::{ConnectionState, ReconnectPolicy, WsConfig};
use crate::error::WsError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    /// `None` disables reconnects.
    policy: Option<ReconnectPolicy>,
    retry_pending: bool,
    /// Consecutive drops since the last successful open.
    failures: u32,
    torn_down: bool,
}

impl ConnectionMachine {
    pub fn new(policy: Option<ReconnectPolicy>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            retry_pending: false,
            failures: 0,
            torn_down: false,
        }
    }

    pub fn from_config(config: &WsConfig) -> Self {
        Self::new(config.reconnect.then(|| config.reconnect_policy.clone()))
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_retry_pending(&self) -> bool {
        self.retry_pending
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Begin a connection attempt.
    ///
    /// Only allowed from `Disconnected` with no retry outstanding, so at most
    /// one attempt is ever active.
    pub fn connect(&mut self) -> Result<ConnectionState, WsError> {
        if self.torn_down {
            return Err(WsError::TornDown);
        }
        if self.state.is_active() || self.retry_pending {
            return Err(WsError::AlreadyActive);
        }
        self.state = ConnectionState::Connecting;
        Ok(self.state)
    }

    /// The transport acknowledged the open. Returns false if no attempt was in flight.
    pub fn opened(&mut self) -> bool {
        if self.state != ConnectionState::Connecting {
            tracing::warn!("Open acknowledged in state {:?}, ignoring", self.state);
            return false;
        }
        self.state = ConnectionState::Connected;
        self.failures = 0;
        true
    }

    /// The connection errored, closed, or failed to open.
    ///
    /// Always lands in `Disconnected`. Returns the delay of the single retry
    /// it schedules, or `None` if a retry is already pending, reconnects are
    /// disabled, or the machine was torn down.
    pub fn dropped(&mut self) -> Option<Duration> {
        self.state = ConnectionState::Disconnected;
        if self.torn_down || self.retry_pending {
            return None;
        }
        let delay = self.policy.as_ref()?.delay_for_attempt(self.failures);
        self.failures = self.failures.saturating_add(1);
        self.retry_pending = true;
        Some(delay)
    }

    /// The scheduled retry is due. Returns false if none was pending.
    pub fn retry_fired(&mut self) -> bool {
        std::mem::replace(&mut self.retry_pending, false)
    }

    /// Session end: drop any pending retry and refuse further attempts.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.retry_pending = false;
        self.state = ConnectionState::Disconnected;
    }
}
