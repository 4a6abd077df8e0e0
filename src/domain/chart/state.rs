//! Incrementally maintained chart rows.

use super::{fuse, ChartRow};
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::signal::RecentSignals;
use crate::shared::Timestamp;
use std::collections::HashMap;

/// Fused rows kept current without a full rebuild per live update.
///
/// Always equal to [`fuse`] over the same series and signal list, provided
/// every series append goes through [`ChartRows::append`] and every signal
/// added to or evicted from the list is passed to [`ChartRows::refresh`].
#[derive(Debug, Clone, Default)]
pub struct ChartRows {
    rows: Vec<ChartRow>,
    positions: HashMap<Timestamp, Vec<usize>>,
}

impl ChartRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rebuild (used after a snapshot).
    pub fn rebuild(&mut self, prices: &PriceSeries, signals: &RecentSignals) {
        self.rows = fuse(prices, signals);
        self.positions.clear();
        for (idx, row) in self.rows.iter().enumerate() {
            self.positions.entry(row.timestamp).or_default().push(idx);
        }
    }

    /// Add the row for a point just appended to the series.
    pub fn append(&mut self, point: &PricePoint, signals: &RecentSignals) {
        let idx = self.rows.len();
        self.rows.push(ChartRow::new(point, signals.find(&point.timestamp)));
        self.positions.entry(point.timestamp).or_default().push(idx);
    }

    /// Re-derive the overlay of every row at `timestamp`.
    pub fn refresh(&mut self, timestamp: &Timestamp, signals: &RecentSignals) {
        let Some(indices) = self.positions.get(timestamp) else {
            return;
        };
        let signal = signals.find(timestamp);
        for &idx in indices {
            let point = self.rows[idx].point();
            self.rows[idx] = ChartRow::new(&point, signal);
        }
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
