//! History loader: one-shot bootstrap of the price series and signal list.

use crate::domain::price::PricePoint;
use crate::domain::signal::Signal;

/// Initial state derived from the signal snapshot.
///
/// The snapshot doubles as the price history: every signal contributes the
/// price observed at its instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bootstrap {
    /// Oldest first.
    pub prices: Vec<PricePoint>,
    /// Newest first, at most the requested capacity.
    pub signals: Vec<Signal>,
    /// Price of the most recent signal.
    pub current_price: Option<f64>,
}

impl Bootstrap {
    pub fn from_signals(mut signals: Vec<Signal>, capacity: usize) -> Self {
        // Stable: equal timestamps keep arrival order.
        signals.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let prices: Vec<PricePoint> = signals.iter().map(PricePoint::from).collect();
        let current_price = prices.last().map(|p| p.price);

        signals.reverse();
        signals.truncate(capacity);

        Self {
            prices,
            signals,
            current_price,
        }
    }
}

/// Fetch the signal snapshot and derive the initial state.
#[cfg(feature = "http")]
pub async fn load_history(
    client: &crate::client::MonitorClient,
) -> Result<Bootstrap, crate::error::SdkError> {
    let limit = client.history_limit();
    match client.signals().recent(limit).await {
        Ok(signals) => {
            tracing::info!("Loaded {} historical signal(s)", signals.len());
            Ok(Bootstrap::from_signals(
                signals,
                crate::network::RECENT_SIGNALS_CAPACITY,
            ))
        }
        Err(e) => {
            tracing::error!("Failed to fetch signals: {}", e);
            Err(e)
        }
    }
}
