//! Push Channel Listener
//!
//! Connects to the backend's WebSocket and forwards parsed events to a
//! [`PushSink`]. What happens after the connection drops is decided by an
//! explicit [`ReconnectPolicy`].

use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::messages::PushEvent;
use crate::config::RealtimeConfig;

/// Receiver of parsed push events
#[async_trait]
pub trait PushSink: Send + Sync {
    async fn dispatch(&self, event: PushEvent);
}

/// Errors raised by the push listener
#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid push channel URL: {0}")]
    InvalidUrl(String),
}

/// When and how often to reconnect after the socket is lost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// 0 disables reconnecting
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// Give up as soon as the connection is lost
    pub fn never() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.reconnect_max_attempts,
            base_delay: Duration::from_millis(config.reconnect_base_delay_ms),
            max_delay: Duration::from_millis(config.reconnect_max_delay_ms),
        }
    }

    /// Delay before reconnect attempt `attempt` (0-based), `None` once exhausted
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2_u32.saturating_pow(attempt);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::never()
    }
}

/// Listener for the backend push socket
pub struct RealtimeListener {
    url: String,
    policy: ReconnectPolicy,
}

impl RealtimeListener {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Result<Self, RealtimeError> {
        let url = url.into();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(RealtimeError::InvalidUrl(url));
        }
        Ok(Self { url, policy })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run in the background until the reconnect policy gives up
    pub fn spawn<S>(self, sink: Arc<S>) -> JoinHandle<()>
    where
        S: PushSink + 'static,
    {
        tokio::spawn(async move { self.run(sink.as_ref()).await })
    }

    /// Listen, reconnecting per policy; returns once the policy is exhausted
    pub async fn run<S: PushSink + ?Sized>(&self, sink: &S) {
        let mut attempt = 0;

        loop {
            match self.listen_once(sink, &mut attempt).await {
                Ok(()) => tracing::info!("Push channel closed"),
                Err(e) => tracing::error!("Push channel error: {}", e),
            }

            match self.policy.delay_for(attempt) {
                Some(delay) => {
                    attempt += 1;
                    tracing::info!(
                        "Reconnecting to push channel in {:?} (attempt {})",
                        delay,
                        attempt
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::warn!("Push channel lost, not reconnecting");
                    return;
                }
            }
        }
    }

    /// One connection lifetime: connect, then forward frames until close
    ///
    /// `attempt` is reset as soon as the handshake succeeds, however the
    /// connection ends afterwards.
    async fn listen_once<S: PushSink + ?Sized>(
        &self,
        sink: &S,
        attempt: &mut u32,
    ) -> Result<(), RealtimeError> {
        let (mut stream, _) = connect_async(self.url.as_str()).await?;
        tracing::info!("Push channel connected: {}", self.url);
        *attempt = 0;

        while let Some(frame) = stream.next().await {
            match frame? {
                Message::Text(text) => match PushEvent::parse(&text) {
                    Ok(event) => {
                        tracing::debug!("Push event for view {}", event.view_id());
                        sink.dispatch(event).await;
                    }
                    Err(e) => tracing::error!("Failed to parse push message: {}", e),
                },
                Message::Close(frame) => {
                    tracing::debug!("Push channel close frame: {:?}", frame);
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }
}
