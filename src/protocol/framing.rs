// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length-delimited protobuf streams.
//!
//! Bulk HTTP endpoints send and accept a sequence of messages, each prefixed
//! with its length as a varint. [`delimit`] writes such a body and
//! [`SplitStream`] reads one back incrementally, as chunks arrive.
//!
//! # Examples
//!
//! ```
//! use missionlink::proto::NamedObjectId;
//! use missionlink::protocol::framing::{SplitStream, delimit};
//!
//! let ids = vec![
//!     NamedObjectId { name: "/YSS/SIMULATOR/BatteryVoltage1".into(), namespace: None },
//!     NamedObjectId { name: "/YSS/SIMULATOR/BatteryVoltage2".into(), namespace: None },
//! ];
//! let body = delimit(&ids);
//!
//! let mut stream = SplitStream::<NamedObjectId>::new();
//! let (head, tail) = body.split_at(5);
//! stream.push(head);
//! assert!(stream.next_message().unwrap().is_none());
//! stream.push(tail);
//! assert_eq!(stream.next_message().unwrap(), Some(ids[0].clone()));
//! assert_eq!(stream.next_message().unwrap(), Some(ids[1].clone()));
//! stream.finish().unwrap();
//! ```

use std::marker::PhantomData;

use bytes::{Buf, BytesMut};
use prost::Message;

use crate::error::ParseError;

/// Longest encoding of a length varint.
const MAX_DELIMITER_LEN: usize = 10;

/// Largest message body accepted from a delimited stream.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

/// Encodes messages as one length-delimited body.
#[must_use]
pub fn delimit<M: Message>(messages: &[M]) -> Vec<u8> {
    let mut body = Vec::new();
    for message in messages {
        body.extend_from_slice(&message.encode_length_delimited_to_vec());
    }
    body
}

/// Decodes a complete length-delimited body.
///
/// # Errors
///
/// Returns [`ParseError`] if a message is malformed or the body ends in the
/// middle of one.
pub fn split<M: Message + Default>(body: &[u8]) -> Result<Vec<M>, ParseError> {
    let mut stream = SplitStream::new();
    stream.push(body);
    let mut messages = Vec::new();
    while let Some(message) = stream.next_message()? {
        messages.push(message);
    }
    stream.finish()?;
    Ok(messages)
}

/// Incremental decoder for a length-delimited stream.
///
/// Bytes are appended with [`push`](Self::push) in whatever chunks the
/// transport delivers; complete messages are taken out with
/// [`next_message`](Self::next_message).
#[derive(Debug)]
pub struct SplitStream<M> {
    buffer: BytesMut,
    _message: PhantomData<fn() -> M>,
}

impl<M: Message + Default> Default for SplitStream<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message + Default> SplitStream<M> {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            _message: PhantomData,
        }
    }

    /// Appends received bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Returns the number of buffered bytes not yet decoded.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Takes the next complete message out of the buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Decode`] if the length prefix or the message is
    /// malformed, and [`ParseError::UnexpectedFormat`] if the announced length
    /// exceeds [`MAX_MESSAGE_LEN`].
    pub fn next_message(&mut self) -> Result<Option<M>, ParseError> {
        let header_end = self
            .buffer
            .iter()
            .take(MAX_DELIMITER_LEN)
            .position(|byte| byte & 0x80 == 0);
        if header_end.is_none() {
            if self.buffer.len() >= MAX_DELIMITER_LEN {
                return Err(ParseError::UnexpectedFormat(
                    "length prefix exceeds 10 bytes".to_string(),
                ));
            }
            return Ok(None);
        }

        let length = prost::decode_length_delimiter(&self.buffer[..])?;
        if length > MAX_MESSAGE_LEN {
            return Err(ParseError::UnexpectedFormat(format!(
                "message of {length} bytes exceeds the {MAX_MESSAGE_LEN} byte limit"
            )));
        }
        let header = prost::length_delimiter_len(length);
        let Some(total) = header.checked_add(length) else {
            return Err(ParseError::UnexpectedFormat(
                "length prefix overflows".to_string(),
            ));
        };
        if self.buffer.len() < total {
            return Ok(None);
        }

        self.buffer.advance(header);
        let body = self.buffer.split_to(length).freeze();
        Ok(Some(M::decode(body)?))
    }

    /// Ends the stream.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedFormat`] if a partial message is
    /// left in the buffer.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.buffer.is_empty() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedFormat(format!(
                "stream ended with {} undecoded bytes",
                self.buffer.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{NamedObjectId, TimeInfo, Timestamp};

    fn id(name: &str) -> NamedObjectId {
        NamedObjectId {
            name: name.to_string(),
            namespace: None,
        }
    }

    #[test]
    fn reassembles_byte_by_byte() {
        let ids = vec![id("/a"), id("/b/c"), id("")];
        let body = delimit(&ids);

        let mut stream = SplitStream::<NamedObjectId>::new();
        let mut decoded = Vec::new();
        for byte in &body {
            stream.push(std::slice::from_ref(byte));
            while let Some(message) = stream.next_message().unwrap() {
                decoded.push(message);
            }
        }
        assert_eq!(decoded, ids);
        stream.finish().unwrap();
    }

    #[test]
    fn empty_messages_are_yielded() {
        let body = delimit(&[TimeInfo::default(), TimeInfo::default()]);
        assert_eq!(body, vec![0, 0]);
        assert_eq!(split::<TimeInfo>(&body).unwrap().len(), 2);
    }

    #[test]
    fn long_messages_use_multi_byte_prefix() {
        let long = id(&"x".repeat(300));
        let body = delimit(std::slice::from_ref(&long));
        assert!(body[0] & 0x80 != 0);
        assert_eq!(split::<NamedObjectId>(&body).unwrap(), vec![long]);
    }

    #[test]
    fn truncated_body_fails_on_finish() {
        let info = TimeInfo {
            current_time: Some(Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
        };
        let body = delimit(&[info]);
        let err = split::<TimeInfo>(&body[..body.len() - 1]).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
    }

    #[test]
    fn oversized_prefix_is_rejected() {
        let mut stream = SplitStream::<TimeInfo>::new();
        stream.push(&[0xFF; 11]);
        assert!(stream.next_message().is_err());
    }

    #[test]
    fn huge_length_prefix_is_rejected() {
        let mut stream = SplitStream::<NamedObjectId>::new();
        let mut prefix = vec![0xFF; 9];
        prefix.push(0x01);
        stream.push(&prefix);
        let err = stream.next_message().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
    }

    #[test]
    fn length_above_limit_is_rejected() {
        let mut prefix = Vec::new();
        prost::encode_length_delimiter(MAX_MESSAGE_LEN + 1, &mut prefix).unwrap();
        let mut stream = SplitStream::<NamedObjectId>::new();
        stream.push(&prefix);
        let err = stream.next_message().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
    }

    #[test]
    fn length_at_limit_waits_for_body() {
        let mut prefix = Vec::new();
        prost::encode_length_delimiter(MAX_MESSAGE_LEN, &mut prefix).unwrap();
        let mut stream = SplitStream::<NamedObjectId>::new();
        stream.push(&prefix);
        assert!(stream.next_message().unwrap().is_none());
    }
}
