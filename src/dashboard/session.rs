//! Monitor session: wires the history loader and the live stream into one
//! shared [`DashboardState`].

use std::sync::Arc;

use async_lock::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::loader::load_history;
use super::DashboardState;
use crate::client::MonitorClient;
use crate::error::{SdkError, WsError};
use crate::ws::native::WsClient;
use crate::ws::WsEvent;

/// A running dashboard session.
///
/// [`Self::start`] opens the stream and returns at once, with the state still
/// loading. A background task then fetches the snapshot, seeds the state, and
/// applies stream events in arrival order. Signals that arrive while the
/// snapshot is in flight are held until it has been applied; connection
/// changes are applied as they come.
/// Readers get the state through [`Self::state`] and can wait on
/// [`Self::changes`], which ticks after every applied update.
pub struct MonitorSession {
    state: Arc<RwLock<DashboardState>>,
    ws: Option<WsClient>,
    pump: Option<JoinHandle<()>>,
    revision: watch::Receiver<u64>,
}

impl MonitorSession {
    pub async fn start(client: &MonitorClient) -> Result<Self, SdkError> {
        let state = Arc::new(RwLock::new(DashboardState::new()));
        let (revision_tx, revision) = watch::channel(0u64);

        let mut ws = client.ws_native();
        let events = ws
            .take_events()
            .ok_or_else(|| SdkError::Other("WS event receiver already taken".into()))?;
        ws.connect().await?;

        let pump = tokio::spawn(run_session(
            client.clone(),
            events,
            Arc::clone(&state),
            revision_tx,
        ));

        Ok(Self {
            state,
            ws: Some(ws),
            pump: Some(pump),
            revision,
        })
    }

    /// Shared handle to the synchronized state. Consumers only read it.
    pub fn state(&self) -> Arc<RwLock<DashboardState>> {
        Arc::clone(&self.state)
    }

    /// Receiver that changes after every applied update.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    /// End the session: close the stream, cancel any pending reconnect, and
    /// apply whatever events were already received.
    ///
    /// Waits for an in-flight snapshot fetch to finish first.
    pub async fn shutdown(mut self) -> Result<(), WsError> {
        // Dropping the client closes the event channel, so the pump drains and exits.
        if let Some(mut ws) = self.ws.take() {
            ws.disconnect().await?;
        }

        if let Some(pump) = self.pump.take() {
            let _ = pump.await;
        }
        tracing::info!("Monitor session closed");
        Ok(())
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

async fn run_session(
    client: MonitorClient,
    mut events: mpsc::UnboundedReceiver<WsEvent>,
    state: Arc<RwLock<DashboardState>>,
    revision: watch::Sender<u64>,
) {
    // Connection changes show up while the snapshot is in flight; signals
    // wait for it so they land after the seeded history.
    let load = load_history(&client);
    tokio::pin!(load);
    let mut held = Vec::new();
    let bootstrap = loop {
        tokio::select! {
            result = &mut load => break result,
            event = events.recv() => match event {
                Some(WsEvent::Signal(signal)) => held.push(signal),
                Some(event) => {
                    state.write().await.apply_event(event);
                    revision.send_modify(|r| *r += 1);
                }
                None => break (&mut load).await,
            },
        }
    };

    {
        let mut state = state.write().await;
        state.apply_bootstrap(bootstrap);
        if !held.is_empty() {
            tracing::debug!("Applying {} signal(s) received during bootstrap", held.len());
        }
        for signal in held {
            state.apply_signal(signal);
        }
    }
    revision.send_modify(|r| *r += 1);

    while let Some(event) = events.recv().await {
        state.write().await.apply_event(event);
        revision.send_modify(|r| *r += 1);
    }
}
