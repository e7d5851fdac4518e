// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `commands` topic.

use super::{Value, impl_name};

/// Options of a `commands` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeCommandsRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub processor: String,
    /// Skip history of commands issued before the subscription.
    #[prost(bool, tag = "3")]
    pub ignore_past_commands: bool,
}

/// An update to the history of one command.
///
/// The server only sends attributes that changed since the previous update.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandHistoryEntry {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub command_name: String,
    #[prost(string, tag = "3")]
    pub origin: String,
    #[prost(int32, tag = "4")]
    pub sequence_number: i32,
    #[prost(message, optional, tag = "5")]
    pub generation_time: Option<::prost_types::Timestamp>,
    #[prost(message, repeated, tag = "6")]
    pub attr: Vec<CommandHistoryAttribute>,
}

/// A named command history attribute.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandHistoryAttribute {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
}

impl_name!(SubscribeCommandsRequest, CommandHistoryEntry, CommandHistoryAttribute);
