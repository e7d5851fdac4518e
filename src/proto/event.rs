// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `events` topic.

use super::impl_name;

/// Options of an `events` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeEventsRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
}

/// Severity of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventSeverity {
    Info = 0,
    Warning = 1,
    Error = 2,
    Watch = 3,
    Distress = 5,
    Critical = 6,
    Severe = 7,
}

/// A mission event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(string, tag = "1")]
    pub source: String,
    #[prost(message, optional, tag = "2")]
    pub generation_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub reception_time: Option<::prost_types::Timestamp>,
    #[prost(int32, tag = "4")]
    pub seq_number: i32,
    #[prost(string, optional, tag = "5")]
    pub r#type: Option<String>,
    #[prost(string, tag = "6")]
    pub message: String,
    #[prost(enumeration = "EventSeverity", tag = "7")]
    pub severity: i32,
}

impl_name!(SubscribeEventsRequest, Event);
