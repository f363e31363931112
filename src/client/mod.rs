//! Top-level application object wiring transport, session and view.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{ChartView, LayoutConfig};
use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::protocol::{Command, Symbol};
use crate::render::Renderer;
use crate::session::{ChartSession, ConnectionStatus, SessionConfig};
use crate::transport::{ReconnectPolicy, Transport, TransportEvent};

/// Everything needed to start a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    /// `EXCHANGE:SECURITY`.
    pub symbol: String,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    #[must_use]
    pub fn new(server_url: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            symbol: symbol.into(),
            viewport: default_viewport(),
            layout: LayoutConfig::default(),
            session: SessionConfig::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.server_url.trim().is_empty() {
            return Err(ChartError::InvalidData(
                "server url must not be empty".to_owned(),
            ));
        }
        Symbol::parse(&self.symbol)?;
        self.viewport.ensure_valid()?;
        self.layout.validate()?;
        self.session.validate()?;
        self.reconnect.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize client config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse client config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(1280, 720)
}

/// What one `step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub event_handled: bool,
    pub commands_sent: usize,
    pub rendered: bool,
    /// Set while waiting out a reconnect delay.
    pub reconnect_at: Option<Instant>,
}

/// Single-threaded chart client.
///
/// The host calls `step` in a loop; nothing else mutates session state.
pub struct ChartClient<T: Transport, R: Renderer> {
    transport: T,
    session: ChartSession,
    view: ChartView<R>,
    viewport: Viewport,
    reconnect: ReconnectPolicy,
    failed_attempts: u32,
    reconnect_at: Option<Instant>,
    needs_redraw: bool,
}

impl<T: Transport, R: Renderer> ChartClient<T, R> {
    pub fn new(transport: T, renderer: R, config: &ClientConfig) -> ChartResult<Self> {
        config.validate()?;
        let symbol = Symbol::parse(&config.symbol)?;
        Ok(Self {
            transport,
            session: ChartSession::new(symbol, config.session)?,
            view: ChartView::new(renderer, config.layout.clone())?,
            viewport: config.viewport,
            reconnect: config.reconnect.validate()?,
            failed_attempts: 0,
            reconnect_at: None,
            needs_redraw: true,
        })
    }

    #[must_use]
    pub fn session(&self) -> &ChartSession {
        &self.session
    }

    #[must_use]
    pub fn view(&self) -> &ChartView<R> {
        &self.view
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Runs one iteration: (re)connect on schedule, pump one transport event,
    /// check the request timeout, redraw if anything changed.
    ///
    /// Fails only when the reconnect policy gives up.
    pub fn step(&mut self, now: Instant, wait: Duration) -> ChartResult<StepReport> {
        let mut report = StepReport::default();

        if !self.transport.is_open() {
            self.try_connect(now)?;
        }

        if self.transport.is_open() {
            match self.transport.poll_event(wait) {
                Ok(Some(event)) => {
                    report.event_handled = true;
                    self.handle_event(event, now, &mut report)?;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "transport fault");
                    self.on_transport_lost(now)?;
                }
            }
        }

        if self.transport.is_open() {
            if let Some(command) = self.session.poll(now) {
                self.needs_redraw = true;
                self.send(&command, now, &mut report)?;
            }
        }

        report.reconnect_at = self.reconnect_at;
        report.rendered = self.render_if_needed();
        Ok(report)
    }

    fn try_connect(&mut self, now: Instant) -> ChartResult<()> {
        if self.reconnect_at.is_some_and(|at| now < at) {
            return Ok(());
        }
        match self.transport.connect() {
            Ok(()) => {
                // Backoff resets on the first accepted reply, not the handshake.
                debug!(attempts = self.failed_attempts, "transport connected");
                self.reconnect_at = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, attempt = self.failed_attempts + 1, "connect failed");
                self.schedule_reconnect(now)
            }
        }
    }

    fn handle_event(
        &mut self,
        event: TransportEvent,
        now: Instant,
        report: &mut StepReport,
    ) -> ChartResult<()> {
        match event {
            TransportEvent::Opened => {
                let command = self.session.on_connected(now);
                self.needs_redraw = true;
                self.send(&command, now, report)
            }
            TransportEvent::Text(text) => {
                let update = self.session.handle_text(&text, now);
                self.needs_redraw |= update.redraw;
                if self.failed_attempts > 0 && self.session.status() == ConnectionStatus::Live {
                    debug!(attempts = self.failed_attempts, "server answering, backoff reset");
                    self.failed_attempts = 0;
                }
                match update.command {
                    Some(command) => self.send(&command, now, report),
                    None => Ok(()),
                }
            }
            TransportEvent::Closed { reason } => {
                debug!(?reason, "transport closed");
                self.on_transport_lost(now)
            }
        }
    }

    fn send(&mut self, command: &Command, now: Instant, report: &mut StepReport) -> ChartResult<()> {
        match self.transport.send_text(&command.encode()) {
            Ok(()) => {
                report.commands_sent += 1;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, command = %command, "send failed");
                self.on_transport_lost(now)
            }
        }
    }

    fn on_transport_lost(&mut self, now: Instant) -> ChartResult<()> {
        self.transport.close();
        self.session.on_disconnected();
        self.needs_redraw = true;
        self.schedule_reconnect(now)
    }

    fn schedule_reconnect(&mut self, now: Instant) -> ChartResult<()> {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        let delay = self.reconnect.delay_for(self.failed_attempts).ok_or_else(|| {
            ChartError::Transport(format!(
                "giving up after {} reconnect attempts",
                self.failed_attempts - 1
            ))
        })?;
        debug!(
            attempt = self.failed_attempts,
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );
        self.reconnect_at = Some(now + delay);
        Ok(())
    }

    fn render_if_needed(&mut self) -> bool {
        if !self.needs_redraw {
            return false;
        }
        self.needs_redraw = false;
        match self.view.render_frame(
            self.session.series(),
            self.session.overlay(),
            self.viewport,
            self.session.precision(),
            self.session.status(),
        ) {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "render failed");
                false
            }
        }
    }

    /// Forces a redraw on the next `step`.
    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.viewport = viewport.ensure_valid()?;
        self.needs_redraw = true;
        Ok(())
    }

    /// Switches symbol; the `init` goes out now or after the in-flight reply.
    pub fn switch_symbol(&mut self, symbol: Symbol, now: Instant) -> ChartResult<()> {
        self.needs_redraw = true;
        if let Some(command) = self.session.switch_symbol(symbol, now) {
            let mut report = StepReport::default();
            self.send(&command, now, &mut report)?;
        }
        Ok(())
    }

    /// Sends a symbol search; results land in `session().search_results()`.
    pub fn search(&mut self, query: &str, now: Instant) -> ChartResult<()> {
        let command = self.session.request_search(query)?;
        if !self.transport.is_open() {
            return Err(ChartError::Transport(
                "cannot search while disconnected".to_owned(),
            ));
        }
        let mut report = StepReport::default();
        self.send(&command, now, &mut report)
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.needs_redraw |= self.view.on_wheel(delta_y);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.needs_redraw |= self.view.on_pointer_move(x, y);
    }

    pub fn on_pointer_leave(&mut self) {
        self.needs_redraw |= self.view.on_pointer_leave();
    }
}
