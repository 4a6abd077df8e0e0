//! Wire types for signals (REST + WS).

use serde::{Deserialize, Serialize};

/// A signal as the backend sends it, on both the REST snapshot and the stream.
///
/// The REST response additionally carries the store's row `id`; the stream
/// payload does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
    pub z_score: f64,
    #[serde(rename = "type")]
    pub signal_type: String,
}
