// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.
//!
//! A [`ClientConfig`] names the server and how to authenticate against it.
//! It is built in code with `with_*` methods or loaded from JSON:
//!
//! ```
//! use std::time::Duration;
//!
//! use missionlink::ClientConfig;
//!
//! let config = ClientConfig::from_json(r#"{
//!     "address": "mcs.example.org:443",
//!     "tls": true,
//!     "token": "s3cr3t",
//!     "reply_timeout_ms": 5000
//! }"#).unwrap();
//!
//! assert_eq!(config.websocket_url(), "wss://mcs.example.org:443/api/websocket");
//! assert_eq!(config.reply_timeout(), Duration::from_secs(5));
//! assert_eq!(config.authorization_header().as_deref(), Some("Bearer s3cr3t"));
//! ```

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Connection settings shared by every subscription of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    address: String,
    tls: bool,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    connect_timeout: Duration,
    #[serde(rename = "reply_timeout_ms", with = "millis")]
    reply_timeout: Duration,
    #[serde(
        rename = "http_timeout_ms",
        with = "optional_millis",
        skip_serializing_if = "Option::is_none"
    )]
    http_timeout: Option<Duration>,
    websocket_path: String,
    user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADDRESS)
    }
}

impl ClientConfig {
    /// Address used when none is configured.
    pub const DEFAULT_ADDRESS: &'static str = "localhost:8090";
    /// Default time allowed to establish a connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default time to wait for the server to acknowledge a subscription.
    pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default path of the WebSocket endpoint.
    pub const DEFAULT_WEBSOCKET_PATH: &'static str = "api/websocket";

    /// Creates a configuration for a server at `host:port`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            tls: false,
            username: None,
            password: None,
            token: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            reply_timeout: Self::DEFAULT_REPLY_TIMEOUT,
            http_timeout: None,
            websocket_path: Self::DEFAULT_WEBSOCKET_PATH.to_string(),
            user_agent: None,
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults; timeouts are given in
    /// milliseconds as `connect_timeout_ms`, `reply_timeout_ms` and
    /// `http_timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed and
    /// [`ConfigError::Invalid`] if it fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can be used to connect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the address is empty or carries a
    /// scheme, if only half of a username/password pair is set, if both a
    /// token and credentials are set, or if a timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("address is empty".to_string()));
        }
        if self.address.contains("://") {
            return Err(ConfigError::Invalid(format!(
                "address '{}' must not include a scheme, use with_tls instead",
                self.address
            )));
        }
        match (&self.username, &self.password) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "username and password must be set together".to_string(),
                ));
            }
            (Some(_), Some(_)) if self.token.is_some() => {
                return Err(ConfigError::Invalid(
                    "set either a token or credentials, not both".to_string(),
                ));
            }
            _ => {}
        }
        if self.connect_timeout.is_zero()
            || self.reply_timeout.is_zero()
            || self.http_timeout.is_some_and(|timeout| timeout.is_zero())
        {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Enables TLS (`wss://` and `https://`).
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the time allowed to establish a connection.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the time to wait for a subscription to be acknowledged.
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Caps the total duration of each HTTP request, body included.
    ///
    /// Unset by default, so bulk downloads are bounded only by the connect
    /// timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the path of the WebSocket endpoint.
    #[must_use]
    pub fn with_websocket_path(mut self, path: impl Into<String>) -> Self {
        self.websocket_path = path.into();
        self
    }

    /// Sets the `User-Agent` sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the server address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns whether TLS is enabled.
    #[must_use]
    pub fn tls(&self) -> bool {
        self.tls
    }

    /// Returns the basic authentication credentials, if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username.as_deref().zip(self.password.as_deref())
    }

    /// Returns the bearer token, if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the reply timeout.
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Returns the HTTP request timeout, if set.
    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }

    /// Returns the WebSocket path.
    #[must_use]
    pub fn websocket_path(&self) -> &str {
        &self.websocket_path
    }

    /// Returns the user agent, if set.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Builds the WebSocket endpoint URL.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!(
            "{scheme}://{}/{}",
            self.address.trim_end_matches('/'),
            self.websocket_path.trim_start_matches('/')
        )
    }

    /// Builds the base URL of the HTTP API.
    #[must_use]
    pub fn http_base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{scheme}://{}/api", self.address.trim_end_matches('/'))
    }

    /// Builds the `Authorization` header value.
    ///
    /// A token takes precedence over credentials.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(format!("Bearer {token}"));
        }
        self.credentials().map(|(username, password)| {
            format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
        })
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => super::millis::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|value| value.map(Duration::from_millis))
    }
}
