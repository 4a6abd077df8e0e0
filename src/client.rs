//! High-level client: `MonitorClient` with nested sub-client accessors.
//!
//! This module keeps the builder, the shared configuration, and the
//! accessor methods. Each domain's HTTP calls live in `domain/<name>/client.rs`.

use crate::domain::signal::client::Signals;
use crate::error::SdkError;
use crate::http::{MonitorHttp, RetryPolicy};
use crate::network::{DEFAULT_API_URL, DEFAULT_HISTORY_LIMIT, DEFAULT_WS_URL};
use crate::ws::{ReconnectPolicy, WsConfig};

// Re-export sub-client types for convenience.
pub use crate::domain::signal::client::Signals as SignalsClient;

/// The primary entry point: REST access plus the stream configuration.
#[derive(Clone)]
pub struct MonitorClient {
    pub(crate) http: MonitorHttp,
    pub(crate) ws_config: WsConfig,
    pub(crate) history_limit: u32,
    pub(crate) bootstrap_retry: RetryPolicy,
}

impl MonitorClient {
    pub fn builder() -> MonitorClientBuilder {
        MonitorClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn signals(&self) -> Signals<'_> {
        Signals { client: self }
    }

    /// Number of signals requested by the bootstrap fetch.
    pub fn history_limit(&self) -> u32 {
        self.history_limit
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// WS config for creating a stream connection.
    ///
    /// The WS client is not embedded in `MonitorClient` because its lifetime
    /// belongs to the session that consumes it.
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a new native WS client from the current config.
    #[cfg(feature = "ws-native")]
    pub fn ws_native(&self) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(self.ws_config.clone())
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MonitorClientBuilder {
    base_url: String,
    ws_url: String,
    history_limit: u32,
    bootstrap_retry: RetryPolicy,
    reconnect: bool,
    reconnect_policy: ReconnectPolicy,
}

impl Default for MonitorClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            bootstrap_retry: RetryPolicy::None,
            reconnect: true,
            reconnect_policy: ReconnectPolicy::default(),
        }
    }
}

impl MonitorClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Retry policy for the bootstrap fetch. Defaults to no retries.
    pub fn bootstrap_retry(mut self, policy: RetryPolicy) -> Self {
        self.bootstrap_retry = policy;
        self
    }

    /// Whether a dropped stream is reopened. Defaults to true.
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.reconnect = enabled;
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }

    pub fn build(self) -> Result<MonitorClient, SdkError> {
        if self.history_limit == 0 {
            return Err(SdkError::Validation("history_limit must be positive".into()));
        }

        Ok(MonitorClient {
            http: MonitorHttp::new(&self.base_url)?,
            ws_config: WsConfig {
                url: self.ws_url,
                reconnect: self.reconnect,
                reconnect_policy: self.reconnect_policy,
                ..WsConfig::default()
            },
            history_limit: self.history_limit,
            bootstrap_retry: self.bootstrap_retry,
        })
    }
}
