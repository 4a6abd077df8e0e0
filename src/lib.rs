//! # Market Monitor
//!
//! Client core for a live market-signal dashboard: bootstrap the recent
//! anomaly signals over REST, keep them current from a WebSocket stream, and
//! fuse the price series with the signal overlay for charting.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Timestamps, domain models, chart fusion (always available)
//! 2. **HTTP API**: `MonitorHttp` with opt-in retry policies
//! 3. **WebSocket**: Connection state machine + `tokio-tungstenite` transport
//! 4. **High-Level Client**: `MonitorClient` with nested sub-clients
//! 5. **Dashboard**: `DashboardState` synchronizer and `MonitorSession`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market_monitor::prelude::*;
//!
//! let client = MonitorClient::builder()
//!     .base_url("http://localhost:8000")
//!     .ws_url("ws://localhost:8000/ws/signals")
//!     .build()?;
//!
//! let session = MonitorSession::start(&client).await?;
//! let state = session.state();
//! for row in state.read().await.chart_rows() {
//!     println!("{} {}", row.timestamp, row.price);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and helpers used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Endpoint defaults and sizing constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: connection state, events, reconnect policy.
pub mod ws;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `MonitorClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 5: Dashboard ───────────────────────────────────────────────────────

/// State synchronizer and session wiring.
pub mod dashboard;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Symbol, Timestamp};

    // Domain types
    pub use crate::domain::chart::{fuse, ChartRow, ChartRows};
    pub use crate::domain::price::{PricePoint, PriceSeries};
    pub use crate::domain::signal::{RecentSignals, Signal, SignalType, SignalValidationError};

    // Errors
    pub use crate::error::{HttpError, SdkError, WsError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{MonitorClient, MonitorClientBuilder, SignalsClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{ConnectionState, ReconnectPolicy, WsConfig, WsEvent};
    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::WsClient;

    // State containers
    pub use crate::dashboard::{Bootstrap, DashboardState};
    #[cfg(all(feature = "http", feature = "ws-native"))]
    pub use crate::dashboard::session::MonitorSession;
}
