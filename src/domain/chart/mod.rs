//! Chart domain: fusion of the price series with the signal overlay.
//!
//! The fused rows are what a time-series renderer consumes: one row per price
//! point, in series order, with overlay columns filled when a signal shares
//! the point's timestamp.

pub mod state;

use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::signal::{RecentSignals, Signal, SignalType};
use crate::shared::Timestamp;
use serde::{Deserialize, Serialize};

pub use state::ChartRows;

/// One renderable row: the price line value plus optional signal overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub timestamp: Timestamp,
    pub price: f64,
    #[serde(rename = "isSignal")]
    pub is_signal: bool,
    #[serde(rename = "signalType", default, skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<SignalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(rename = "spikePrice", default)]
    pub spike_price: Option<f64>,
    #[serde(rename = "dropPrice", default)]
    pub drop_price: Option<f64>,
}

impl ChartRow {
    /// Join a price point with the signal at the same timestamp, if any.
    pub fn new(point: &PricePoint, signal: Option<&Signal>) -> Self {
        match signal {
            Some(s) => Self {
                timestamp: point.timestamp,
                price: point.price,
                is_signal: true,
                signal_type: Some(s.signal_type),
                z_score: Some(s.z_score),
                spike_price: s.is_spike().then_some(s.price),
                drop_price: s.is_drop().then_some(s.price),
            },
            None => Self {
                timestamp: point.timestamp,
                price: point.price,
                is_signal: false,
                signal_type: None,
                z_score: None,
                spike_price: None,
                drop_price: None,
            },
        }
    }

    pub fn point(&self) -> PricePoint {
        PricePoint {
            timestamp: self.timestamp,
            price: self.price,
        }
    }
}

/// Fuse the price series with the recent-signal list.
///
/// Pure: output length and order equal the series; the same inputs always
/// produce the same rows.
pub fn fuse(prices: &PriceSeries, signals: &RecentSignals) -> Vec<ChartRow> {
    let index = signals.by_timestamp();
    prices
        .points()
        .iter()
        .map(|p| ChartRow::new(p, index.get(&p.timestamp).copied()))
        .collect()
}
