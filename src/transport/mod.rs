//! Message transport between the session and the market-data server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[cfg(feature = "ws-transport")]
mod ws;
#[cfg(feature = "ws-transport")]
pub use ws::{LWS_SUBPROTOCOL, WsTransport};

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake finished; requests may be sent.
    Opened,
    Text(String),
    Closed { reason: Option<String> },
}

/// Bidirectional text channel to the server.
///
/// Implementations are polled from a single thread; `poll_event` blocks for at
/// most `timeout` and returns `Ok(None)` when nothing arrived.
pub trait Transport {
    fn connect(&mut self) -> ChartResult<()>;
    fn is_open(&self) -> bool;
    fn send_text(&mut self, text: &str) -> ChartResult<()>;
    fn poll_event(&mut self, timeout: Duration) -> ChartResult<Option<TransportEvent>>;
    fn close(&mut self);
}

/// Exponential reconnect backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// `None` retries forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay_ms: duration_ms(base_delay),
            max_delay_ms: duration_ms(max_delay),
            max_attempts: None,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.base_delay_ms == 0 {
            return Err(ChartError::InvalidData(
                "reconnect base delay must be > 0".to_owned(),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ChartError::InvalidData(
                "reconnect max delay must be >= base delay".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    ///
    /// `base * 2^(attempt - 1)` capped at `max_delay`; attempt `0` is
    /// immediate. `None` once `max_attempts` is exceeded.
    #[must_use]
    pub fn delay_for(self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return Some(Duration::ZERO);
        }
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        let delay = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Some(Duration::from_millis(delay))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}
