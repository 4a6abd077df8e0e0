//! Dashboard state: the synchronizer between the bootstrap snapshot, the
//! live stream, and the fused chart rows.
//!
//! The app owns a [`DashboardState`] (or lets [`session::MonitorSession`] own
//! one). All mutation goes through `apply_*` methods taking `&mut self`, so a
//! reader never observes one collection updated and the other stale.

pub mod loader;
#[cfg(all(feature = "http", feature = "ws-native"))]
pub mod session;

use crate::domain::chart::{ChartRow, ChartRows};
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::signal::{RecentSignals, Signal};
use crate::error::SdkError;
use crate::ws::{ConnectionState, WsEvent};

pub use loader::Bootstrap;

#[derive(Debug, Clone)]
pub struct DashboardState {
    prices: PriceSeries,
    signals: RecentSignals,
    chart: ChartRows,
    current_price: Option<f64>,
    connection: ConnectionState,
    loading: bool,
    error: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    /// Empty state with the loading indicator on.
    pub fn new() -> Self {
        Self {
            prices: PriceSeries::new(),
            signals: RecentSignals::default(),
            chart: ChartRows::new(),
            current_price: None,
            connection: ConnectionState::Disconnected,
            loading: true,
            error: None,
        }
    }

    /// Seed from the bootstrap fetch, or record its failure.
    ///
    /// Ends the loading state. Only the first call has any effect.
    pub fn apply_bootstrap(&mut self, result: Result<Bootstrap, SdkError>) {
        if !self.loading {
            tracing::warn!("Bootstrap already applied, ignoring");
            return;
        }
        self.loading = false;

        match result {
            Ok(boot) => {
                self.prices.apply_snapshot(boot.prices);
                self.signals.replace(boot.signals);
                self.current_price = boot.current_price;
                self.chart.rebuild(&self.prices, &self.signals);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Merge one live signal into both collections and the fused rows.
    pub fn apply_signal(&mut self, signal: Signal) {
        let point = PricePoint::from(&signal);
        let timestamp = signal.timestamp;

        let evicted = self.signals.push(signal);
        self.prices.push(point);
        self.current_price = Some(point.price);

        self.chart.append(&point, &self.signals);
        self.chart.refresh(&timestamp, &self.signals);
        if let Some(old) = evicted {
            self.chart.refresh(&old.timestamp, &self.signals);
        }
    }

    /// Apply one stream event.
    pub fn apply_event(&mut self, event: WsEvent) {
        match event {
            WsEvent::Signal(signal) => self.apply_signal(signal),
            WsEvent::StateChanged(state) => self.connection = state,
            WsEvent::DecodeError(e) => tracing::debug!("Ignoring undecodable frame: {}", e),
            WsEvent::Disconnected { code, reason } => {
                tracing::debug!("Stream dropped (code={:?}): {}", code, reason)
            }
            WsEvent::RetryScheduled { attempt, delay_ms } => {
                tracing::debug!("Stream retry {} in {}ms", attempt, delay_ms)
            }
        }
    }

    // ── Read accessors ───────────────────────────────────────────────────

    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    pub fn signals(&self) -> &RecentSignals {
        &self.signals
    }

    pub fn chart_rows(&self) -> &[ChartRow] {
        self.chart.rows()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::fuse;
    use crate::domain::signal::SignalType;
    use crate::error::HttpError;
    use crate::shared::{Symbol, Timestamp};

    fn signal(ts: &str, price: f64, signal_type: SignalType) -> Signal {
        Signal {
            symbol: Symbol::from("BTCUSDT"),
            price,
            timestamp: Timestamp::parse(ts).unwrap(),
            z_score: if signal_type == SignalType::Spike { 2.5 } else { -2.5 },
            signal_type,
        }
    }

    fn seeded() -> DashboardState {
        let mut state = DashboardState::new();
        state.apply_bootstrap(Ok(Bootstrap::from_signals(
            vec![
                signal("2024-05-01T12:00:02Z", 90.0, SignalType::Drop),
                signal("2024-05-01T12:00:01Z", 100.0, SignalType::Spike),
            ],
            50,
        )));
        state
    }

    fn prices(state: &DashboardState) -> Vec<f64> {
        state.prices().points().iter().map(|p| p.price).collect()
    }

    fn listed(state: &DashboardState) -> Vec<f64> {
        state.signals().iter().map(|s| s.price).collect()
    }

    #[test]
    fn test_bootstrap_seeds_state() {
        let state = seeded();
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(prices(&state), [100.0, 90.0]);
        assert_eq!(listed(&state), [90.0, 100.0]);
        assert_eq!(state.current_price(), Some(90.0));
        assert_eq!(state.chart_rows().len(), 2);
        assert_eq!(state.chart_rows()[1].drop_price, Some(90.0));
    }

    #[test]
    fn test_live_signal_after_bootstrap() {
        let mut state = seeded();
        state.apply_signal(signal("2024-05-01T12:00:03Z", 95.0, SignalType::Spike));

        assert_eq!(prices(&state), [100.0, 90.0, 95.0]);
        assert_eq!(listed(&state), [95.0, 90.0, 100.0]);
        assert_eq!(state.current_price(), Some(95.0));

        let row = &state.chart_rows()[2];
        assert!(row.is_signal);
        assert_eq!(row.spike_price, Some(95.0));
        assert_eq!(row.drop_price, None);
    }

    #[test]
    fn test_failed_bootstrap_leaves_collections_empty() {
        let mut state = DashboardState::new();
        assert!(state.is_loading());
        state.apply_bootstrap(Err(HttpError::ServerError {
            status: 500,
            body: "boom".into(),
        }
        .into()));

        assert!(!state.is_loading());
        assert!(state.error().unwrap().contains("500"));
        assert!(state.prices().is_empty());
        assert!(state.signals().is_empty());
        assert!(state.chart_rows().is_empty());
        assert_eq!(state.current_price(), None);
    }

    #[test]
    fn test_bootstrap_applies_once() {
        let mut state = seeded();
        state.apply_bootstrap(Err(SdkError::Other("late".into())));
        assert!(state.error().is_none());
        assert_eq!(state.prices().len(), 2);
    }

    #[test]
    fn test_many_live_signals_bound_list_and_grow_series() {
        let mut state = seeded();
        for i in 0..60 {
            state.apply_signal(signal(
                &format!("2024-05-01T13:{:02}:00Z", i),
                1_000.0 + i as f64,
                SignalType::Spike,
            ));
        }
        assert_eq!(state.prices().len(), 62);
        assert!(state.prices().is_chronological());
        assert_eq!(state.signals().len(), 50);
        assert_eq!(state.signals().latest().unwrap().price, 1_059.0);
        assert_eq!(state.chart_rows(), fuse(state.prices(), state.signals()).as_slice());
        // Bootstrap rows lost their overlay once their signals were evicted.
        assert!(!state.chart_rows()[0].is_signal);
    }

    #[test]
    fn test_duplicate_live_timestamp_is_not_deduplicated() {
        let mut state = seeded();
        state.apply_signal(signal("2024-05-01T12:00:02+00:00", 91.0, SignalType::Spike));
        assert_eq!(state.prices().len(), 3);
        // Oldest listed signal at that instant keeps the overlay on both rows.
        assert_eq!(state.chart_rows()[1].signal_type, Some(SignalType::Drop));
        assert_eq!(state.chart_rows()[2].signal_type, Some(SignalType::Drop));
    }

    #[test]
    fn test_events_drive_connection_indicator() {
        let mut state = seeded();
        state.apply_event(WsEvent::StateChanged(ConnectionState::Connecting));
        assert!(!state.is_connected());
        state.apply_event(WsEvent::StateChanged(ConnectionState::Connected));
        assert!(state.is_connected());

        state.apply_event(WsEvent::DecodeError("bad".into()));
        assert_eq!(state.prices().len(), 2);
        assert!(state.is_connected());

        state.apply_event(WsEvent::Disconnected {
            code: Some(1006),
            reason: "gone".into(),
        });
        state.apply_event(WsEvent::StateChanged(ConnectionState::Disconnected));
        assert!(!state.is_connected());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_naive_bootstrap_timestamp_joins_offset_live_signal() {
        let mut state = DashboardState::new();
        state.apply_bootstrap(Ok(Bootstrap::default()));

        // Price observed via one representation, signal via the other.
        state.apply_signal(signal("2024-05-01T12:00:05.500000", 70.0, SignalType::Drop));
        let mut twin = signal("2024-05-01T12:00:05.5+00:00", 70.0, SignalType::Drop);
        twin.z_score = -3.0;
        state.apply_signal(twin);

        assert_eq!(state.chart_rows()[0].timestamp, state.chart_rows()[1].timestamp);
        assert_eq!(state.chart_rows()[0].z_score, Some(-2.5));
    }
}
