// SPDX-License-Identifier: MIT

//! Websocket-backed resource-offer driver.
//!
//! Stands in for the real resource-offer client's wire protocol: connects
//! to the master's offer stream over a websocket and reads offers/status
//! updates until told to stop or until the connection drops. Grounded on
//! the teacher's containerized-agent event bridge (`docker/ws.rs`), which
//! has the same "connect, loop-select on stream-vs-shutdown, log and
//! return" shape.

use crate::driver::{Driver, DriverError, DriverFactory};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::Notify;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connects to a Mesos-style resource-offer master's websocket endpoint.
pub struct WsOfferDriver {
    master_url: String,
    stop: Notify,
}

impl WsOfferDriver {
    pub fn new(master_url: impl Into<String>) -> Self {
        Self { master_url: master_url.into(), stop: Notify::new() }
    }
}

#[async_trait]
impl Driver for WsOfferDriver {
    async fn run(&self) -> Result<(), DriverError> {
        let (ws_stream, _) = connect_async(&self.master_url)
            .await
            .map_err(|e| DriverError::ConnectFailed(e.to_string()))?;
        tracing::info!(master_url = %self.master_url, "offer driver connected");

        let (_, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            tracing::debug!(bytes = text.len(), "offer stream message");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "offer driver: master closed connection");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "offer driver: stream error");
                            return Err(DriverError::RunFailed(e.to_string()));
                        }
                        None => {
                            tracing::info!("offer driver: stream ended");
                            return Ok(());
                        }
                    }
                }
                _ = self.stop.notified() => {
                    tracing::info!("offer driver: stop requested");
                    return Ok(());
                }
            }
        }
    }

    async fn stop(&self, failover: bool) {
        tracing::info!(failover, "stopping offer driver");
        self.stop.notify_one();
    }
}

/// Builds a fresh [`WsOfferDriver`] per activation (drivers are not reusable).
pub struct WsOfferDriverFactory {
    master_url: String,
}

impl WsOfferDriverFactory {
    pub fn new(master_url: impl Into<String>) -> Self {
        Self { master_url: master_url.into() }
    }
}

#[async_trait]
impl DriverFactory for WsOfferDriverFactory {
    type Driver = WsOfferDriver;

    async fn create_driver(&self) -> Result<Self::Driver, DriverError> {
        Ok(WsOfferDriver::new(self.master_url.clone()))
    }
}
