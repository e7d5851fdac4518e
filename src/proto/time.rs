// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `time` topic.

use super::impl_name;

/// Options of a `time` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeTimeRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, optional, tag = "2")]
    pub processor: Option<String>,
}

/// Current mission time.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeInfo {
    #[prost(message, optional, tag = "1")]
    pub current_time: Option<::prost_types::Timestamp>,
}

impl_name!(SubscribeTimeRequest, TimeInfo);
