// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envelopes exchanged over the subscription socket.

use super::impl_name;

/// Outbound frame sent by the client.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientMessage {
    /// Topic name, or `cancel` for a cancellation request.
    #[prost(string, tag = "1")]
    pub r#type: String,
    /// Topic-specific request options.
    #[prost(message, optional, tag = "2")]
    pub options: Option<::prost_types::Any>,
    /// Client-chosen request id, echoed back in the reply.
    #[prost(int32, tag = "3")]
    pub id: i32,
    /// Server-assigned call id, zero on the initial request.
    #[prost(int32, tag = "4")]
    pub call: i32,
}

/// Inbound frame sent by the server.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerMessage {
    /// `reply`, `exception` or the topic name for data frames.
    #[prost(string, tag = "1")]
    pub r#type: String,
    /// Call the frame belongs to.
    #[prost(int32, tag = "2")]
    pub call: i32,
    /// Per-call sequence number of data frames.
    #[prost(int32, tag = "3")]
    pub seq: i32,
    /// Payload.
    #[prost(message, optional, tag = "4")]
    pub data: Option<::prost_types::Any>,
}

/// Reply to a client request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Reply {
    /// Id of the request being answered.
    #[prost(int32, tag = "1")]
    pub reply_to: i32,
    /// Set when the request failed.
    #[prost(message, optional, tag = "2")]
    pub exception: Option<ExceptionMessage>,
}

/// Server-side failure detail.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExceptionMessage {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub r#type: String,
    #[prost(string, tag = "3")]
    pub msg: String,
}

/// Options of a `cancel` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOptions {
    /// Call to cancel.
    #[prost(int32, tag = "1")]
    pub call: i32,
}

impl_name!(ClientMessage, ServerMessage, Reply, ExceptionMessage, CancelOptions);
