// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encoding and decoding of subscription frames.
//!
//! Every WebSocket binary frame carries exactly one envelope. Outbound
//! envelopes are [`ClientMessage`]s: the initial subscribe request of a call,
//! follow-up control requests on the same call, and cancellations. Inbound
//! envelopes are [`ServerMessage`]s, decoded here into an [`Envelope`].
//!
//! The functions in this module are pure. Request ids come from a
//! [`SequenceGenerator`] supplied by the caller.
//!
//! # Examples
//!
//! ```
//! use missionlink::proto::{self, SubscribeLinksRequest};
//! use missionlink::protocol::codec::{self, SequenceGenerator, Topic};
//!
//! let sequence = SequenceGenerator::new();
//! let options = proto::pack(&SubscribeLinksRequest {
//!     instance: "simulator".to_string(),
//! })
//! .unwrap();
//!
//! let frame = codec::encode_subscribe(sequence.next(), &Topic::LINKS, options);
//! assert!(!frame.is_empty());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use prost::{Message, Name};

use crate::error::{ParseError, ServerException};
use crate::proto::{
    self, Any, CancelOptions, ClientMessage, ExceptionMessage, Reply, ServerMessage,
};

/// Message type of inbound replies.
const REPLY_TYPE: &str = "reply";

/// Message type of inbound exceptions.
const EXCEPTION_TYPE: &str = "exception";

/// Message type of outbound cancellations.
const CANCEL_TYPE: &str = "cancel";

// ============================================================================
// SequenceGenerator
// ============================================================================

/// Source of request ids for outbound frames.
///
/// Ids are unique and increasing for all managers sharing a generator, so
/// replies can be matched to requests across concurrently open calls.
/// [`SequenceGenerator::global`] returns the process-wide instance; tests
/// and embedders may create their own.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicI32,
}

impl SequenceGenerator {
    /// First id handed out by a new generator.
    pub const INITIAL: i32 = 1;

    /// Creates a generator starting at [`Self::INITIAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Self::INITIAL)
    }

    /// Creates a generator starting at `first`.
    #[must_use]
    pub fn starting_at(first: i32) -> Self {
        Self {
            next: AtomicI32::new(first),
        }
    }

    /// Returns the process-wide generator.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<SequenceGenerator>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SequenceGenerator::new())))
    }

    /// Returns the next id.
    pub fn next(&self) -> i32 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Topic
// ============================================================================

/// Name of a server-side event stream.
///
/// # Examples
///
/// ```
/// use missionlink::protocol::codec::Topic;
///
/// assert_eq!(Topic::PARAMETERS.as_str(), "parameters");
/// assert_eq!(Topic::new("stream").to_string(), "stream");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(Cow<'static, str>);

impl Topic {
    /// Telemetry parameter values.
    pub const PARAMETERS: Topic = Topic(Cow::Borrowed("parameters"));
    /// Alarm state changes.
    pub const ALARMS: Topic = Topic(Cow::Borrowed("alarms"));
    /// Command history updates.
    pub const COMMANDS: Topic = Topic(Cow::Borrowed("commands"));
    /// Data link state.
    pub const LINKS: Topic = Topic(Cow::Borrowed("links"));
    /// File transfer progress.
    pub const FILE_TRANSFERS: Topic = Topic(Cow::Borrowed("file-transfers"));
    /// Remote directory listings.
    pub const REMOTE_FILE_LIST: Topic = Topic(Cow::Borrowed("remote-file-list"));
    /// Extracted container packets.
    pub const CONTAINERS: Topic = Topic(Cow::Borrowed("containers"));
    /// Mission time.
    pub const TIME: Topic = Topic(Cow::Borrowed("time"));
    /// Mission events.
    pub const EVENTS: Topic = Topic(Cow::Borrowed("events"));
    /// COP-1 uplink state.
    pub const COP1: Topic = Topic(Cow::Borrowed("cop1"));
    /// Activity updates.
    pub const ACTIVITIES: Topic = Topic(Cow::Borrowed("activities"));

    /// Creates a topic for a stream not covered by the constants.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the topic name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Answer to a client request.
    Reply(ReplyFrame),
    /// Topic payload.
    Data(DataFrame),
    /// Failure of the call, raised by the server at any time.
    Exception(ServerException),
}

/// Answer to a client request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyFrame {
    /// Call id assigned by the server.
    pub call: i32,
    /// Id of the request being answered.
    pub reply_to: i32,
    /// Set when the request failed.
    pub error: Option<ServerException>,
}

/// A topic payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    /// Topic the payload belongs to.
    pub topic: String,
    /// Call the payload belongs to.
    pub call: i32,
    /// Per-call sequence number.
    pub seq: i32,
    /// Typed payload.
    pub payload: Any,
}

impl DataFrame {
    /// Decodes the payload as `M`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedPayload`] if the payload is of another
    /// type, or [`ParseError::Decode`] if it is malformed.
    pub fn decode<M: Message + Name + Default>(&self) -> Result<M, ParseError> {
        proto::unpack(&self.payload)
    }
}

impl From<ExceptionMessage> for ServerException {
    fn from(exception: ExceptionMessage) -> Self {
        Self {
            code: exception.code,
            kind: exception.r#type,
            message: exception.msg,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes the initial request of a call.
#[must_use]
pub fn encode_subscribe(id: i32, topic: &Topic, options: Any) -> Vec<u8> {
    ClientMessage {
        r#type: topic.as_str().to_string(),
        options: Some(options),
        id,
        call: 0,
    }
    .encode_to_vec()
}

/// Encodes a follow-up request on an established call.
#[must_use]
pub fn encode_control(id: i32, topic: &Topic, call: i32, options: Any) -> Vec<u8> {
    ClientMessage {
        r#type: topic.as_str().to_string(),
        options: Some(options),
        id,
        call,
    }
    .encode_to_vec()
}

/// Encodes a request asking the server to end a call.
#[must_use]
pub fn encode_cancel(id: i32, call: i32) -> Vec<u8> {
    let options = Any {
        type_url: CancelOptions::type_url(),
        value: CancelOptions { call }.encode_to_vec(),
    };
    ClientMessage {
        r#type: CANCEL_TYPE.to_string(),
        options: Some(options),
        id,
        call: 0,
    }
    .encode_to_vec()
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes an inbound frame.
///
/// # Errors
///
/// Returns [`ParseError`] if the frame is not a server envelope, if a reply
/// or exception lacks its payload, or if that payload is malformed.
pub fn decode(bytes: &[u8]) -> Result<Envelope, ParseError> {
    let message = ServerMessage::decode(bytes)?;

    match message.r#type.as_str() {
        REPLY_TYPE => {
            let data = message
                .data
                .ok_or_else(|| ParseError::MissingField("reply data".to_string()))?;
            let reply: Reply = proto::unpack(&data)?;
            Ok(Envelope::Reply(ReplyFrame {
                call: message.call,
                reply_to: reply.reply_to,
                error: reply.exception.map(ServerException::from),
            }))
        }
        EXCEPTION_TYPE => {
            let data = message
                .data
                .ok_or_else(|| ParseError::MissingField("exception data".to_string()))?;
            let exception: ExceptionMessage = proto::unpack(&data)?;
            Ok(Envelope::Exception(exception.into()))
        }
        "" => Err(ParseError::UnexpectedFormat(
            "server message without type".to_string(),
        )),
        _ => {
            let payload = message
                .data
                .ok_or_else(|| ParseError::MissingField("data".to_string()))?;
            Ok(Envelope::Data(DataFrame {
                topic: message.r#type,
                call: message.call,
                seq: message.seq,
                payload,
            }))
        }
    }
}
