//! Request/response polling state machine for one displayed symbol.
//!
//! At most one request is outstanding. Every reply schedules the next
//! request, so the session keeps a steady `latest` poll going once the full
//! series has arrived. A timeout retry re-sends the same request; the next
//! request goes out only after every copy on the wire has been answered.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::core::{AnalysisOverlay, Candle, CandleSeries, SeriesUpdate};
use crate::error::{ChartError, ChartResult};
use crate::protocol::{
    ChartSnapshot, Command, RequestKind, SearchResults, ServerMessage, Symbol, decode_message,
};

/// Polling behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a request may stay unanswered before it is retried.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Full `init` refresh after this many latest-candle updates; `0` disables it.
    #[serde(default = "default_resync_every_updates")]
    pub resync_every_updates: u32,
    /// Request the analysis overlay after each full series.
    #[serde(default = "default_analysis_enabled")]
    pub analysis_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            resync_every_updates: default_resync_every_updates(),
            analysis_enabled: default_analysis_enabled(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_resync_every_updates(mut self, updates: u32) -> Self {
        self.resync_every_updates = updates;
        self
    }

    #[must_use]
    pub fn with_analysis_enabled(mut self, enabled: bool) -> Self {
        self.analysis_enabled = enabled;
        self
    }

    #[must_use]
    pub fn request_timeout(self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.request_timeout_ms == 0 {
            return Err(ChartError::InvalidData(
                "request timeout must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_resync_every_updates() -> u32 {
    100
}

fn default_analysis_enabled() -> bool {
    true
}

/// Outstanding request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingResponse {
        kind: RequestKind,
        sent_at: Instant,
        /// `0` for the first send, incremented on every timeout retry.
        attempt: u32,
        /// Sends of this request still waiting for a reply.
        unanswered: u32,
    },
}

impl RequestState {
    #[must_use]
    pub fn pending_kind(self) -> Option<RequestKind> {
        match self {
            Self::Idle => None,
            Self::AwaitingResponse { kind, .. } => Some(kind),
        }
    }
}

/// Freshness of what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Live,
    /// A request timed out; the data shown may be outdated.
    Stale,
    Disconnected,
}

impl ConnectionStatus {
    /// Overlay text drawn on the chart; `None` while live.
    #[must_use]
    pub const fn indicator_text(self) -> Option<&'static str> {
        match self {
            Self::Connecting => Some("CONNECTING"),
            Self::Live => None,
            Self::Stale => Some("STALE DATA"),
            Self::Disconnected => Some("DISCONNECTED"),
        }
    }
}

/// Constructor of the request that follows a reply, if any.
type NextRequest = Option<fn(Symbol) -> Command>;

/// Outcome of feeding one reply to the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionUpdate {
    /// Next request to send.
    pub command: Option<Command>,
    pub redraw: bool,
}

impl SessionUpdate {
    fn send(command: Option<Command>, redraw: bool) -> Self {
        Self { command, redraw }
    }
}

/// Owns the displayed symbol's series, overlay and request state.
#[derive(Debug, Clone)]
pub struct ChartSession {
    config: SessionConfig,
    symbol: Symbol,
    series: CandleSeries,
    overlay: Option<AnalysisOverlay>,
    precision: Option<i64>,
    request: RequestState,
    status: ConnectionStatus,
    connected: bool,
    /// Symbol changed while a request was in flight.
    pending_reset: bool,
    /// Replies still owed for the previous symbol after a timed-out switch.
    discard_replies: u32,
    updates_since_resync: u32,
    search_results: Option<SearchResults>,
}

impl ChartSession {
    pub fn new(symbol: Symbol, config: SessionConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            symbol,
            series: CandleSeries::new(),
            overlay: None,
            precision: None,
            request: RequestState::Idle,
            status: ConnectionStatus::Connecting,
            connected: false,
            pending_reset: false,
            discard_replies: 0,
            updates_since_resync: 0,
            search_results: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&AnalysisOverlay> {
        self.overlay.as_ref()
    }

    /// Precision of the last full series, if the server sent one.
    #[must_use]
    pub fn precision(&self) -> Option<i64> {
        self.precision
    }

    #[must_use]
    pub fn request_state(&self) -> RequestState {
        self.request
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub fn search_results(&self) -> Option<&SearchResults> {
        self.search_results.as_ref()
    }

    /// Transport opened: starts the poll loop with a full series request.
    pub fn on_connected(&mut self, now: Instant) -> Command {
        info!(symbol = %self.symbol, "session connected");
        self.connected = true;
        self.status = ConnectionStatus::Connecting;
        self.discard_replies = 0;
        if self.pending_reset {
            self.reset_data();
        }
        self.issue(Command::Init, now, 0)
    }

    /// Transport closed: drops the outstanding request and keeps the data.
    pub fn on_disconnected(&mut self) {
        info!(symbol = %self.symbol, "session disconnected");
        self.connected = false;
        self.request = RequestState::Idle;
        self.discard_replies = 0;
        self.status = ConnectionStatus::Disconnected;
    }

    /// Decodes and applies one text frame; undecodable frames are dropped.
    pub fn handle_text(&mut self, text: &str, now: Instant) -> SessionUpdate {
        match decode_message(text) {
            Ok(message) => self.handle_message(message, now),
            Err(err) => {
                warn!(error = %err, len = text.len(), "dropping undecodable message");
                SessionUpdate::default()
            }
        }
    }

    /// Applies one decoded reply and returns the next request.
    pub fn handle_message(&mut self, message: ServerMessage, now: Instant) -> SessionUpdate {
        let message = match message {
            ServerMessage::SearchResults(results) => {
                debug!(count = results.len(), "search results received");
                self.search_results = Some(results);
                return SessionUpdate::default();
            }
            ServerMessage::Unknown { keys } => {
                debug!(?keys, "ignoring unknown message");
                return SessionUpdate::default();
            }
            other => other,
        };

        let RequestState::AwaitingResponse {
            kind,
            sent_at,
            attempt,
            unanswered,
        } = self.request
        else {
            debug!(kind = ?message.kind(), "discarding unsolicited response");
            return SessionUpdate::default();
        };

        // Replies arrive in request order.
        if self.discard_replies > 0 {
            self.discard_replies -= 1;
            debug!(
                remaining = self.discard_replies,
                "discarding reply owed to previous symbol"
            );
            return SessionUpdate::default();
        }

        if self.pending_reset {
            let remaining = unanswered.saturating_sub(1);
            if remaining > 0 {
                self.request = RequestState::AwaitingResponse {
                    kind,
                    sent_at,
                    attempt,
                    unanswered: remaining,
                };
                debug!(remaining, "discarding response for previous symbol");
                return SessionUpdate::default();
            }
            debug!(symbol = %self.symbol, "discarding response for previous symbol");
            self.reset_data();
            return SessionUpdate::send(Some(self.issue(Command::Init, now, 0)), true);
        }

        if message.kind() != Some(kind) {
            debug!(
                expected = ?kind,
                received = ?message.kind(),
                "discarding response for another request"
            );
            return SessionUpdate::default();
        }

        let remaining = unanswered.saturating_sub(1);
        self.request = RequestState::AwaitingResponse {
            kind,
            sent_at,
            attempt,
            unanswered: remaining,
        };

        let (redraw, next): (bool, NextRequest) = match message {
            ServerMessage::Full(snapshot) => self.apply_full(snapshot, attempt),
            ServerMessage::Incremental(candle) => self.apply_latest(candle),
            ServerMessage::Analysis(overlay) => {
                trace!(
                    patterns = overlay.pattern_count(),
                    trend_lines = overlay.trend_lines().len(),
                    "analysis overlay received"
                );
                self.overlay = Some(overlay);
                self.status = ConnectionStatus::Live;
                (true, Some(Command::Latest))
            }
            ServerMessage::SearchResults(_) | ServerMessage::Unknown { .. } => (false, None),
        };

        if remaining > 0 {
            trace!(request = ?kind, remaining, "holding next request for retried copies");
            return SessionUpdate::send(None, redraw);
        }
        let command = next.map(|make| self.issue(make, now, 0));
        SessionUpdate::send(command, redraw)
    }

    fn apply_latest(&mut self, candle: Candle) -> (bool, NextRequest) {
        if self.series.is_empty() {
            debug!("latest candle before full series, requesting init");
            return (false, Some(Command::Init));
        }
        self.status = ConnectionStatus::Live;
        let redraw = match self.series.apply_latest(candle) {
            Ok(SeriesUpdate::Appended) => true,
            Ok(SeriesUpdate::Replaced { prices_changed }) => prices_changed,
            Err(err) => {
                debug!(error = %err, "ignoring out-of-order latest candle");
                false
            }
        };
        self.updates_since_resync += 1;
        let resync = self.config.resync_every_updates;
        if resync > 0 && self.updates_since_resync >= resync {
            debug!(updates = self.updates_since_resync, "periodic resync");
            (redraw, Some(Command::Init))
        } else {
            (redraw, Some(Command::Latest))
        }
    }

    fn apply_full(
        &mut self,
        snapshot: ChartSnapshot,
        attempt: u32,
    ) -> (bool, NextRequest) {
        let count = snapshot.candles.len();
        if let Err(err) = self.series.replace_all(snapshot.candles) {
            // Left pending; the timeout retries the request.
            warn!(error = %err, attempt, "rejecting full series");
            return (false, None);
        }
        if snapshot.precision.is_some() {
            self.precision = snapshot.precision;
        }
        self.updates_since_resync = 0;
        self.status = ConnectionStatus::Live;
        debug!(symbol = %self.symbol, candles = count, "full series received");
        if self.config.analysis_enabled {
            (true, Some(Command::Analysis))
        } else {
            (true, Some(Command::Latest))
        }
    }

    /// Retries the outstanding request once it has timed out.
    pub fn poll(&mut self, now: Instant) -> Option<Command> {
        let RequestState::AwaitingResponse {
            kind,
            sent_at,
            attempt,
            unanswered,
        } = self.request
        else {
            return None;
        };
        if now.saturating_duration_since(sent_at) < self.config.request_timeout() {
            return None;
        }

        warn!(
            symbol = %self.symbol,
            request = ?kind,
            attempt,
            "request timed out, retrying"
        );
        self.status = ConnectionStatus::Stale;
        if self.pending_reset {
            self.reset_data();
            self.discard_replies = self.discard_replies.saturating_add(unanswered);
            return Some(self.issue(Command::Init, now, 0));
        }
        let retry: fn(Symbol) -> Command = match kind {
            RequestKind::Init => Command::Init,
            RequestKind::Latest => Command::Latest,
            RequestKind::Analysis => Command::Analysis,
            RequestKind::Search => return None,
        };
        let command = self.issue(retry, now, attempt.saturating_add(1));
        self.request = RequestState::AwaitingResponse {
            kind,
            sent_at: now,
            attempt: attempt.saturating_add(1),
            unanswered: unanswered.saturating_add(1),
        };
        Some(command)
    }

    /// Switches the displayed symbol.
    ///
    /// With no request in flight the reset is immediate and `init` for the
    /// new symbol is returned. Otherwise the reset waits for the in-flight
    /// reply, which is discarded.
    pub fn switch_symbol(&mut self, symbol: Symbol, now: Instant) -> Option<Command> {
        if symbol == self.symbol {
            return None;
        }
        info!(from = %self.symbol, to = %symbol, "switching symbol");
        self.symbol = symbol;
        match self.request {
            RequestState::AwaitingResponse { .. } => {
                self.pending_reset = true;
                None
            }
            RequestState::Idle => {
                self.reset_data();
                self.connected
                    .then(|| self.issue(Command::Init, now, 0))
            }
        }
    }

    /// Builds a symbol search command; it runs outside the poll loop.
    pub fn request_search(&self, query: &str) -> ChartResult<Command> {
        let query = query.trim();
        if query.is_empty() || query.contains('|') {
            return Err(ChartError::InvalidData(format!(
                "search query `{query}` must be non-empty without `|`"
            )));
        }
        Ok(Command::Search(query.to_owned()))
    }

    fn reset_data(&mut self) {
        self.series.clear();
        self.overlay = None;
        self.precision = None;
        self.updates_since_resync = 0;
        self.pending_reset = false;
    }

    /// Marks `make(symbol)` as the outstanding request and returns it.
    fn issue(&mut self, make: fn(Symbol) -> Command, now: Instant, attempt: u32) -> Command {
        let command = make(self.symbol.clone());
        let kind = command.kind();
        self.request = RequestState::AwaitingResponse {
            kind,
            sent_at: now,
            attempt,
            unanswered: 1,
        };
        trace!(request = ?kind, attempt, "request issued");
        command
    }
}
