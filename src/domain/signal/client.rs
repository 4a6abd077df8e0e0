//! Signals sub-client: recent signal snapshot.

use crate::client::MonitorClient;
use crate::domain::signal::Signal;
use crate::error::SdkError;

pub struct Signals<'a> {
    pub(crate) client: &'a MonitorClient,
}

impl<'a> Signals<'a> {
    /// Fetch up to `limit` recent signals, in the order the server sent them.
    ///
    /// A non-success status or a body that does not decode into valid signals
    /// fails the whole call.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Signal>, SdkError> {
        let resp = self
            .client
            .http
            .get_signals(limit, self.client.bootstrap_retry.clone())
            .await?;

        let signals = resp
            .into_iter()
            .map(Signal::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(signals)
    }
}
