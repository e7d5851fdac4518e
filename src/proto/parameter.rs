// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `parameters` topic.

use std::collections::HashMap;

use super::{NamedObjectId, Value, impl_name};

/// How a parameter request alters the live subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubscriptionAction {
    Replace = 0,
    Add = 1,
    Remove = 2,
}

/// Options of a `parameters` request, initial or follow-up.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeParametersRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub processor: String,
    #[prost(message, repeated, tag = "3")]
    pub id: Vec<NamedObjectId>,
    #[prost(bool, optional, tag = "4")]
    pub abort_on_invalid: Option<bool>,
    #[prost(bool, optional, tag = "5")]
    pub update_on_expiration: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub send_from_cache: Option<bool>,
    #[prost(enumeration = "SubscriptionAction", tag = "7")]
    pub action: i32,
}

/// A batch of parameter updates.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeParametersData {
    /// Numeric id to parameter identity, sent when ids are (re)assigned.
    #[prost(map = "uint32, message", tag = "1")]
    pub mapping: HashMap<u32, NamedObjectId>,
    #[prost(message, repeated, tag = "2")]
    pub values: Vec<ParameterValue>,
    /// Requested ids the server does not know.
    #[prost(message, repeated, tag = "3")]
    pub invalid: Vec<NamedObjectId>,
}

/// Acquisition status of a parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AcquisitionStatus {
    Acquired = 0,
    NotReceived = 1,
    Invalid = 2,
    Expired = 3,
}

/// Result of limit checking on a parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MonitoringResult {
    Disabled = 0,
    InLimits = 1,
    Watch = 7,
    Warning = 10,
    Distress = 13,
    Critical = 16,
    Severe = 19,
}

/// A single parameter sample.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ParameterValue {
    /// Full identity, omitted when `numeric_id` refers to a known mapping.
    #[prost(message, optional, tag = "1")]
    pub id: Option<NamedObjectId>,
    #[prost(message, optional, tag = "2")]
    pub raw_value: Option<Value>,
    #[prost(message, optional, tag = "3")]
    pub eng_value: Option<Value>,
    #[prost(message, optional, tag = "4")]
    pub acquisition_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub generation_time: Option<::prost_types::Timestamp>,
    #[prost(enumeration = "AcquisitionStatus", tag = "6")]
    pub acquisition_status: i32,
    #[prost(enumeration = "MonitoringResult", optional, tag = "7")]
    pub monitoring_result: Option<i32>,
    #[prost(uint32, tag = "8")]
    pub numeric_id: u32,
    #[prost(int64, optional, tag = "9")]
    pub expire_millis: Option<i64>,
}

impl_name!(SubscribeParametersRequest, SubscribeParametersData, ParameterValue);
