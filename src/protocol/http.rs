// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP session for the server's REST API.
//!
//! The session owns the credentials of a client. It signs HTTP requests,
//! hands the same `Authorization` header to [`WebSocketConnector`]s it
//! creates, and exchanges length-delimited protobuf bodies with the bulk
//! endpoints.

use std::time::Duration;

use prost::Message;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::framing::{self, SplitStream};
use crate::protocol::transport::WebSocketConnector;

const PROTOBUF_MEDIA_TYPE: &str = "application/protobuf";

/// Authenticated HTTP session.
///
/// # Examples
///
/// ```
/// use missionlink::ClientConfig;
/// use missionlink::protocol::HttpSession;
///
/// let config = ClientConfig::new("localhost:8090").with_credentials("user", "pass");
/// let session = HttpSession::new(&config).unwrap();
///
/// assert_eq!(session.base_url(), "http://localhost:8090/api");
/// assert_eq!(session.websocket_url(), "ws://localhost:8090/api/websocket");
/// assert_eq!(
///     session.resource_url(&["mdb", "simulator", "parameters", "/YSS/SIMULATOR/Alpha"]),
///     "http://localhost:8090/api/mdb/simulator/parameters/%2FYSS%2FSIMULATOR%2FAlpha",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HttpSession {
    base_url: String,
    websocket_url: String,
    authorization: Option<String>,
    user_agent: Option<String>,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
    client: Client,
}

impl HttpSession {
    /// Creates a session from a client configuration.
    ///
    /// Requests are bounded by the connect timeout and, when configured, by
    /// [`ClientConfig::http_timeout`] for the whole exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ProtocolError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url: config.http_base_url(),
            websocket_url: config.websocket_url(),
            authorization: config.authorization_header(),
            user_agent: config.user_agent().map(ToString::to_string),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.http_timeout(),
            client,
        })
    }

    /// Returns the base URL of the HTTP API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the WebSocket endpoint URL.
    #[must_use]
    pub fn websocket_url(&self) -> &str {
        &self.websocket_url
    }

    /// Returns the `Authorization` header value, if the session has
    /// credentials.
    #[must_use]
    pub fn authorization_header(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Creates a WebSocket connector carrying this session's credentials.
    #[must_use]
    pub fn connector(&self) -> WebSocketConnector {
        let mut connector = WebSocketConnector::new(&self.websocket_url)
            .with_connect_timeout(self.connect_timeout);
        if let Some(authorization) = &self.authorization {
            connector = connector.with_authorization(authorization);
        }
        if let Some(user_agent) = &self.user_agent {
            connector = connector.with_user_agent(user_agent);
        }
        connector
    }

    /// Builds an API URL from path segments, percent-encoding each one.
    #[must_use]
    pub fn resource_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Fetches a length-delimited body and decodes every message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] on transport failure or a non-success
    /// status, [`ProtocolError::Timeout`] if the configured HTTP timeout
    /// elapses, and [`ParseError`](crate::error::ParseError) if the body is
    /// malformed.
    pub async fn get_delimited<M: Message + Default>(&self, url: &str) -> Result<Vec<M>> {
        let response = self.send(self.client.get(url)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        Ok(framing::split(&body)?)
    }

    /// Fetches a length-delimited body, passing each message to `on_message`
    /// as soon as it is complete.
    ///
    /// Returns the number of messages received.
    ///
    /// # Errors
    ///
    /// Same as [`get_delimited`](Self::get_delimited).
    pub async fn stream_delimited<M, F>(&self, url: &str, mut on_message: F) -> Result<usize>
    where
        M: Message + Default,
        F: FnMut(M),
    {
        let mut response = self.send(self.client.get(url)).await?;
        let mut stream = SplitStream::<M>::new();
        let mut count = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| self.transport_error(err))?
        {
            stream.push(&chunk);
            while let Some(message) = stream.next_message()? {
                on_message(message);
                count += 1;
            }
        }
        stream.finish()?;

        tracing::debug!(url = %url, messages = count, "Delimited stream complete");
        Ok(count)
    }

    /// Posts a length-delimited body and decodes the delimited response.
    ///
    /// # Errors
    ///
    /// Same as [`get_delimited`](Self::get_delimited).
    pub async fn post_delimited<Req, M>(&self, url: &str, messages: &[Req]) -> Result<Vec<M>>
    where
        Req: Message,
        M: Message + Default,
    {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, PROTOBUF_MEDIA_TYPE)
            .body(framing::delimit(messages));
        let response = self.send(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        Ok(framing::split(&body)?)
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ProtocolError> {
        let mut request = request.header(ACCEPT, PROTOBUF_MEDIA_TYPE);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        tracing::debug!(url = %response.url(), status = response.status().as_u16(), "HTTP response");

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }
        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }
        Ok(response)
    }

    /// Maps a reqwest failure, reporting elapsed timeouts as
    /// [`ProtocolError::Timeout`].
    fn transport_error(&self, err: reqwest::Error) -> ProtocolError {
        if !err.is_timeout() {
            return ProtocolError::Http(err);
        }
        let limit = match self.request_timeout {
            Some(timeout) if !err.is_connect() => timeout,
            _ => self.connect_timeout,
        };
        tracing::debug!(timeout_ms = limit.as_millis(), error = %err, "HTTP request timed out");
        ProtocolError::timeout(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_reuses_credentials() {
        let config = ClientConfig::new("localhost:8090")
            .with_token("abc")
            .with_connect_timeout(Duration::from_secs(4));
        let session = HttpSession::new(&config).unwrap();

        assert_eq!(session.authorization_header(), Some("Bearer abc"));
        let connector = session.connector();
        assert_eq!(connector.url(), "ws://localhost:8090/api/websocket");
        assert_eq!(connector.connect_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn session_without_credentials() {
        let session = HttpSession::new(&ClientConfig::new("localhost:8090")).unwrap();
        assert_eq!(session.authorization_header(), None);
    }

    #[test]
    fn resource_url_encodes_segments() {
        let session = HttpSession::new(&ClientConfig::new("localhost:8090").with_tls(true)).unwrap();
        assert_eq!(
            session.resource_url(&["archive", "simulator", "a b"]),
            "https://localhost:8090/api/archive/simulator/a%20b"
        );
    }
}
