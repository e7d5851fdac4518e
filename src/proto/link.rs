// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `links` topic.

use super::impl_name;

/// Options of a `links` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeLinksRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
}

/// Kind of link event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LinkEventType {
    Registered = 0,
    Unregistered = 1,
    Updated = 2,
}

/// A change to one data link.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LinkEvent {
    #[prost(enumeration = "LinkEventType", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub link_info: Option<LinkInfo>,
}

/// State of a data link.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LinkInfo {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub r#type: String,
    #[prost(bool, tag = "4")]
    pub disabled: bool,
    /// `OK`, `UNAVAIL`, `DISABLED` or `FAILED`.
    #[prost(string, tag = "5")]
    pub status: String,
    #[prost(int64, tag = "6")]
    pub data_in_count: i64,
    #[prost(int64, tag = "7")]
    pub data_out_count: i64,
    #[prost(string, tag = "8")]
    pub detailed_status: String,
    #[prost(string, optional, tag = "9")]
    pub parent_name: Option<String>,
}

impl_name!(SubscribeLinksRequest, LinkEvent, LinkInfo);
