//! Price domain: observed price points and the ordered price series.

pub mod state;

use crate::domain::signal::Signal;
use crate::shared::Timestamp;
use serde::{Deserialize, Serialize};

pub use state::PriceSeries;

/// A single observed price. Identified by its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

impl From<&Signal> for PricePoint {
    fn from(s: &Signal) -> Self {
        Self {
            timestamp: s.timestamp,
            price: s.price,
        }
    }
}
