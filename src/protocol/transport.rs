// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Socket transport used by subscription managers.
//!
//! A [`Connector`] opens one [`Connection`] per subscription. The production
//! implementation is [`WebSocketConnector`]; tests substitute an in-memory
//! connector that plays back scripted server frames.
//!
//! Connections are driven from the manager's receiver thread on a
//! current-thread runtime, so neither trait requires `Send` futures.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::ClientConfig;
use crate::error::ProtocolError;

/// Subprotocol announced during the WebSocket handshake.
pub const SUBPROTOCOL: &str = "protobuf";

/// Opens connections to the subscription endpoint.
#[allow(async_fn_in_trait)]
pub trait Connector: Send + 'static {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Establishes a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the endpoint cannot be reached or
    /// refuses the handshake.
    async fn connect(&self) -> Result<Self::Connection, ProtocolError>;
}

/// A bidirectional stream of binary frames.
#[allow(async_fn_in_trait)]
pub trait Connection {
    /// Writes one frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the connection is broken.
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ProtocolError>;

    /// Reads the next frame. Returns `Ok(None)` once the peer closed the
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the connection is broken.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, ProtocolError>;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the close handshake fails.
    async fn close(&mut self) -> Result<(), ProtocolError>;
}

// ============================================================================
// WebSocketConnector
// ============================================================================

/// Connector for the server's WebSocket endpoint.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use missionlink::protocol::WebSocketConnector;
///
/// let connector = WebSocketConnector::new("ws://localhost:8090/api/websocket")
///     .with_authorization("Bearer abc")
///     .with_connect_timeout(Duration::from_secs(5));
///
/// assert_eq!(connector.url(), "ws://localhost:8090/api/websocket");
/// ```
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
    authorization: Option<String>,
    user_agent: Option<String>,
    connect_timeout: Duration,
}

impl WebSocketConnector {
    /// Default time allowed for the TCP, TLS and WebSocket handshakes.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a connector for a `ws://` or `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: None,
            user_agent: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Creates a connector for the endpoint and credentials of a client
    /// configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            url: config.websocket_url(),
            authorization: config.authorization_header(),
            user_agent: config.user_agent().map(ToString::to_string),
            connect_timeout: config.connect_timeout(),
        }
    }

    /// Sets the `Authorization` header sent with the handshake.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Sets the `User-Agent` header sent with the handshake.
    #[must_use]
    pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the handshake timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    fn request(&self) -> Result<tungstenite::handshake::client::Request, ProtocolError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ProtocolError::InvalidAddress(e.to_string()))?;

        let headers = request.headers_mut();
        headers.insert(
            header::SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(SUBPROTOCOL),
        );
        if let Some(authorization) = &self.authorization {
            let value = HeaderValue::from_str(authorization)
                .map_err(|_| ProtocolError::AuthenticationFailed)?;
            headers.insert(header::AUTHORIZATION, value);
        }
        if let Some(user_agent) = &self.user_agent {
            let value = HeaderValue::from_str(user_agent).map_err(|e| {
                ProtocolError::ConnectionFailed(format!("invalid user agent: {e}"))
            })?;
            headers.insert(header::USER_AGENT, value);
        }
        Ok(request)
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    async fn connect(&self) -> Result<WebSocketConnection, ProtocolError> {
        let request = self.request()?;

        tracing::debug!(url = %self.url, "Connecting WebSocket");

        let (stream, _response) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(request))
                .await
                .map_err(|_| ProtocolError::timeout(self.connect_timeout))?
                .map_err(map_ws_error)?;

        tracing::debug!(url = %self.url, "WebSocket connected");

        Ok(WebSocketConnection { stream })
    }
}

/// A connected WebSocket.
#[derive(Debug)]
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connection for WebSocketConnection {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ProtocolError> {
        self.stream
            .send(Message::Binary(frame.into()))
            .await
            .map_err(map_ws_error)
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Ping(payload))) => {
                    self.stream
                        .send(Message::Pong(payload))
                        .await
                        .map_err(map_ws_error)?;
                }
                Some(Ok(Message::Text(text))) => {
                    tracing::warn!(len = text.len(), "Ignoring text frame on binary socket");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(frame = ?frame, "WebSocket closed by server");
                    return Ok(None);
                }
                Some(Ok(Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(err)) => return Err(map_ws_error(err)),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ProtocolError> {
        match self.stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(err) => Err(map_ws_error(err)),
        }
    }
}

fn map_ws_error(err: tungstenite::Error) -> ProtocolError {
    match err {
        tungstenite::Error::Http(response) if response.status().as_u16() == 401 => {
            ProtocolError::AuthenticationFailed
        }
        tungstenite::Error::Http(response) => ProtocolError::ConnectionFailed(format!(
            "handshake rejected with HTTP {}",
            response.status().as_u16()
        )),
        tungstenite::Error::Url(err) => ProtocolError::InvalidAddress(err.to_string()),
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            ProtocolError::ConnectionFailed("connection already closed".to_string())
        }
        other => ProtocolError::ConnectionFailed(other.to_string()),
    }
}
