// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `missionlink` library.
//!
//! Errors are split by where they originate: the transport
//! ([`ProtocolError`]), frame decoding ([`ParseError`]), the lifetime of a
//! subscription ([`SubscriptionError`]) and client configuration
//! ([`ConfigError`]).
//!
//! [`SubscriptionError`] is the only cloneable variant. It is the value a
//! [`Promise`](crate::future::Promise) stores, so every waiter on a failed
//! subscription observes the same error.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred in the transport layer (socket, HTTP, timeouts).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a frame or payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The subscription failed or was cancelled.
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// The client configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The subscription connection is not open.
    #[error("subscription is not open")]
    NotOpen,

    /// The server has not acknowledged the subscription yet.
    #[error("subscription has not been acknowledged by the server")]
    NotAcknowledged,
}

impl Error {
    /// Returns `true` if this error is a wait that gave up.
    ///
    /// A timeout never implies that the awaited operation failed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::Timeout(_)))
    }
}

/// Errors related to transport communication (WebSocket/HTTP).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the server failed or was lost.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A blocking wait timed out.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),
}

impl ProtocolError {
    /// Creates a timeout error from a duration.
    #[must_use]
    pub fn timeout(duration: std::time::Duration) -> Self {
        // Safe: timeouts in practical use never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        Self::Timeout(duration.as_millis() as u64)
    }
}

/// Errors related to decoding server frames and payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Protobuf decoding failed.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Expected field is missing from a message.
    #[error("missing field in message: {0}")]
    MissingField(String),

    /// Unexpected message format.
    #[error("unexpected message format: {0}")]
    UnexpectedFormat(String),

    /// A payload carried a type other than the one the topic produces.
    #[error("unexpected payload type {actual}, expected {expected}")]
    UnexpectedPayload {
        /// The type URL the decoder expected.
        expected: String,
        /// The type URL found in the frame.
        actual: String,
    },
}

/// Errors stored in a subscription's promise.
///
/// This type is `Clone` so that every caller blocked on the same
/// subscription receives its own copy of the failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The socket could not be established or was lost.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// The server rejected the subscription or reported a failure.
    #[error("server exception: {0}")]
    Server(ServerException),

    /// The subscription was cancelled before it resolved.
    #[error("subscription cancelled")]
    Cancelled,
}

impl From<ProtocolError> for SubscriptionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::ConnectionFailed(cause) => Self::ConnectionFailure(cause),
            other => Self::ConnectionFailure(other.to_string()),
        }
    }
}

/// A failure reported by the server in a reply or exception frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerException {
    /// HTTP-like status code.
    pub code: i32,
    /// Server-side error type (e.g. `BadRequestException`).
    pub kind: String,
    /// Human readable message.
    pub message: String,
}

impl fmt::Display for ServerException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() {
            write!(f, "{} ({})", self.message, self.code)
        } else {
            write!(f, "{}: {} ({})", self.kind, self.message, self.code)
        }
    }
}

/// Errors related to client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON configuration could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display() {
        let err = ProtocolError::Timeout(250);
        assert_eq!(err.to_string(), "timed out after 250 ms");
    }

    #[test]
    fn timeout_from_duration() {
        let err = ProtocolError::timeout(std::time::Duration::from_secs(2));
        assert!(matches!(err, ProtocolError::Timeout(2000)));
    }

    #[test]
    fn error_is_timeout() {
        let err: Error = ProtocolError::Timeout(10).into();
        assert!(err.is_timeout());

        let err: Error = SubscriptionError::Cancelled.into();
        assert!(!err.is_timeout());
    }

    #[test]
    fn connection_failure_keeps_cause() {
        let err: SubscriptionError = ProtocolError::ConnectionFailed("refused".to_string()).into();
        assert_eq!(err, SubscriptionError::ConnectionFailure("refused".to_string()));
    }

    #[test]
    fn server_exception_display() {
        let exc = ServerException {
            code: 400,
            kind: "BadRequestException".to_string(),
            message: "No parameter named '/x'".to_string(),
        };
        assert_eq!(
            exc.to_string(),
            "BadRequestException: No parameter named '/x' (400)"
        );
    }

    #[test]
    fn server_exception_display_without_kind() {
        let exc = ServerException {
            code: 500,
            kind: String::new(),
            message: "boom".to_string(),
        };
        assert_eq!(exc.to_string(), "boom (500)");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("data".to_string());
        assert_eq!(err.to_string(), "missing field in message: data");
    }
}
