// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `containers` topic.

use super::impl_name;

/// Options of a `containers` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeContainersRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub processor: String,
    /// Qualified container names.
    #[prost(string, repeated, tag = "3")]
    pub names: Vec<String>,
}

/// One extracted container packet.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContainerData {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub generation_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub reception_time: Option<::prost_types::Timestamp>,
    #[prost(int32, tag = "4")]
    pub seq_count: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub binary: Vec<u8>,
}

impl_name!(SubscribeContainersRequest, ContainerData);
