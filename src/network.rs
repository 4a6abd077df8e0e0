//! Network URL constants and protocol sizes.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default WebSocket URL for the live signal stream.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws/signals";

/// Number of signals requested by the bootstrap fetch.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Capacity of the newest-first recent-signal list.
pub const RECENT_SIGNALS_CAPACITY: usize = 50;

/// Fixed delay before a dropped stream is reopened.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;
