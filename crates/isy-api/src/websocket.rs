//! Event-stream WebSocket.
//!
//! A thin wrapper over `tokio-tungstenite` that performs the controller's
//! subscription handshake (`ISYSUB` subprotocol, fixed `Origin`, Basic
//! credentials) and surfaces inbound traffic as [`Frame`]s. Liveness and
//! reconnect policy live in `isy-core`'s supervisor; this type only
//! moves bytes.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Subprotocol requested on the upgrade.
pub const SUBPROTOCOL: &str = "ISYSUB";
/// `Origin` header the controller expects from subscribers.
pub const ORIGIN: &str = "com.universal-devices.websockets.isy";
/// How long a graceful close may take before the socket is dropped.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Inbound traffic, reduced to what the supervisor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Ping,
    Pong,
    Closed { code: u16, reason: String },
}

/// An open subscription socket.
pub struct EventSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventSocket {
    /// Open `url` (`ws://host/rest/subscribe` or `wss://…`).
    pub async fn connect(
        url: &Url,
        authorization: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        tracing::info!(url = %url, "connecting event stream");

        let uri: tungstenite::http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| {
                Error::WebSocketConnect(e.to_string())
            })?;

        let request = ClientRequestBuilder::new(uri)
            .with_sub_protocol(SUBPROTOCOL)
            .with_header("Origin", ORIGIN)
            .with_header("Authorization", authorization);

        let connector = if url.scheme() == "wss" {
            transport.websocket_tls()?.map(Connector::Rustls)
        } else {
            None
        };

        let (stream, _response) =
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
                .await
                .map_err(|e| match e {
                    tungstenite::Error::Http(resp) if resp.status().as_u16() == 401 => {
                        Error::Authentication {
                            path: url.path().to_owned(),
                        }
                    }
                    other => Error::WebSocketConnect(other.to_string()),
                })?;

        tracing::info!("event stream connected");
        Ok(Self { stream })
    }

    /// Wait for the next frame. `None` once the stream has ended.
    pub async fn next_frame(&mut self) -> Option<Result<Frame, Error>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(Error::WebSocketConnect(e.to_string()))),
            };
            let frame = match msg {
                Message::Text(text) => Frame::Text(text.as_str().to_owned()),
                Message::Ping(_) => Frame::Ping,
                Message::Pong(_) => Frame::Pong,
                Message::Close(close) => match close {
                    Some(cf) => Frame::Closed {
                        code: u16::from(cf.code),
                        reason: cf.reason.as_str().to_owned(),
                    },
                    None => Frame::Closed {
                        code: 1005,
                        reason: String::new(),
                    },
                },
                // Binary and raw frames carry nothing for us
                Message::Binary(_) | Message::Frame(_) => continue,
            };
            return Some(Ok(frame));
        }
    }

    /// Send a ping. Any inbound frame (including the pong) counts as
    /// activity for the liveness check.
    pub async fn ping(&mut self) -> Result<(), Error> {
        self.stream
            .send(Message::Ping(Vec::new().into()))
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))
    }

    /// Tear the socket down. The close frame gets a short grace period;
    /// after that the connection is dropped without a handshake. Errors
    /// are logged, never surfaced.
    pub async fn terminate(mut self) {
        match tokio::time::timeout(CLOSE_GRACE, SinkExt::close(&mut self.stream)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "event stream close failed"),
            Err(_) => tracing::debug!("event stream close timed out, dropping socket"),
        }
    }
}
