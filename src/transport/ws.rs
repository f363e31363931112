use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info, trace};
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket, connect};

use crate::error::{ChartError, ChartResult};

use super::{Transport, TransportEvent};

/// Subprotocol the market-data server registers its handler under.
pub const LWS_SUBPROTOCOL: &str = "lws-minimal";

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Blocking tungstenite client.
///
/// Reads use a socket timeout so `poll_event` returns within the requested
/// wait even when the server is silent.
pub struct WsTransport {
    url: String,
    socket: Option<Socket>,
    opened_pending: bool,
    read_timeout: Option<Duration>,
}

impl WsTransport {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            socket: None,
            opened_pending: false,
            read_timeout: None,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> ChartResult<()> {
        // Zero means "block forever" to the OS.
        let timeout = timeout.max(Duration::from_millis(1));
        if self.read_timeout == Some(timeout) {
            return Ok(());
        }
        let Some(socket) = self.socket.as_ref() else {
            return Ok(());
        };
        let result = match socket.get_ref() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout)),
            MaybeTlsStream::Rustls(stream) => stream.get_ref().set_read_timeout(Some(timeout)),
            _ => Ok(()),
        };
        result.map_err(|e| ChartError::Transport(format!("failed to set read timeout: {e}")))?;
        self.read_timeout = Some(timeout);
        Ok(())
    }

    fn drop_socket(&mut self) {
        self.socket = None;
        self.opened_pending = false;
        self.read_timeout = None;
    }
}

impl Transport for WsTransport {
    fn connect(&mut self) -> ChartResult<()> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ChartError::Transport(format!("invalid websocket url: {e}")))?;
        request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(LWS_SUBPROTOCOL),
        );

        let (socket, response) = connect(request)
            .map_err(|e| ChartError::Transport(format!("websocket connect failed: {e}")))?;
        info!(url = %self.url, status = %response.status(), "websocket connected");
        self.socket = Some(socket);
        self.opened_pending = true;
        self.read_timeout = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn send_text(&mut self, text: &str) -> ChartResult<()> {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| ChartError::Transport("websocket is not connected".to_owned()))?;
        trace!(text, "websocket send");
        if let Err(err) = socket.send(Message::Text(text.to_owned())) {
            self.drop_socket();
            return Err(ChartError::Transport(format!("websocket send failed: {err}")));
        }
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> ChartResult<Option<TransportEvent>> {
        if self.opened_pending {
            self.opened_pending = false;
            return Ok(Some(TransportEvent::Opened));
        }
        self.set_read_timeout(timeout)?;
        let Some(socket) = self.socket.as_mut() else {
            return Ok(None);
        };

        match socket.read() {
            Ok(Message::Text(text)) => Ok(Some(TransportEvent::Text(text))),
            Ok(Message::Close(frame)) => {
                let reason = frame.map(|frame| frame.reason.into_owned());
                debug!(?reason, "websocket closed by server");
                self.drop_socket();
                Ok(Some(TransportEvent::Closed { reason }))
            }
            Ok(_) => Ok(None),
            Err(tungstenite::Error::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                Ok(None)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.drop_socket();
                Ok(Some(TransportEvent::Closed { reason: None }))
            }
            Err(err) => {
                self.drop_socket();
                Err(ChartError::Transport(format!("websocket read failed: {err}")))
            }
        }
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.as_mut() {
            if let Err(err) = socket.close(None) {
                trace!(error = %err, "websocket close");
            }
        }
        self.drop_socket();
    }
}
