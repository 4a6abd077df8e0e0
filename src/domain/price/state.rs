//! Price series state container: app-owned, SDK-provided update logic.

use super::PricePoint;

/// Canonical price series, oldest first.
///
/// Seeded once from the bootstrap snapshot and then extended by appending
/// live points. Live appends are not deduplicated: a repeated timestamp
/// yields two entries.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all points with an already chronological snapshot.
    pub fn apply_snapshot(&mut self, points: Vec<PricePoint>) {
        self.points = points;
    }

    /// Append a live point to the end of the series.
    pub fn push(&mut self, point: PricePoint) {
        if let Some(last) = self.points.last() {
            if point.timestamp < last.timestamp {
                tracing::warn!(
                    "Out-of-order price point {} appended after {}",
                    point.timestamp,
                    last.timestamp
                );
            }
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Whether timestamps are non-decreasing across the whole series.
    pub fn is_chronological(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
