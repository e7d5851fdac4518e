// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `alarms` topic.

use super::{NamedObjectId, impl_name};

/// Options of an `alarms` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeAlarmsRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub processor: String,
}

/// Source of an alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlarmType {
    Parameter = 0,
    Event = 1,
}

/// Severity of an alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlarmSeverity {
    Watch = 0,
    Warning = 1,
    Distress = 2,
    Critical = 3,
    Severe = 4,
}

/// Why the server sent this alarm update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlarmNotificationType {
    Active = 0,
    Triggered = 1,
    SeverityIncreased = 2,
    ValueUpdated = 3,
    Acknowledged = 4,
    Cleared = 5,
    Rtn = 6,
    Shelved = 7,
    Unshelved = 8,
    Reset = 9,
    TriggeredPending = 10,
}

/// Who acknowledged an alarm, and when.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AcknowledgeInfo {
    #[prost(string, tag = "1")]
    pub acknowledged_by: String,
    #[prost(string, optional, tag = "2")]
    pub acknowledge_message: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub acknowledge_time: Option<::prost_types::Timestamp>,
}

/// Full state of one alarm.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlarmData {
    #[prost(enumeration = "AlarmType", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub trigger_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub id: Option<NamedObjectId>,
    #[prost(int32, tag = "4")]
    pub seq_num: i32,
    #[prost(enumeration = "AlarmSeverity", tag = "5")]
    pub severity: i32,
    #[prost(int32, tag = "6")]
    pub violations: i32,
    #[prost(int32, tag = "7")]
    pub count: i32,
    #[prost(message, optional, tag = "8")]
    pub acknowledge_info: Option<AcknowledgeInfo>,
    #[prost(enumeration = "AlarmNotificationType", tag = "9")]
    pub notification_type: i32,
    /// The triggering condition has gone away.
    #[prost(bool, tag = "10")]
    pub process_ok: bool,
    /// The alarm is currently triggered.
    #[prost(bool, tag = "11")]
    pub triggered: bool,
    #[prost(bool, tag = "12")]
    pub acknowledged: bool,
    #[prost(bool, tag = "13")]
    pub latching: bool,
    #[prost(bool, tag = "14")]
    pub shelved: bool,
    #[prost(bool, tag = "15")]
    pub pending: bool,
}

impl_name!(SubscribeAlarmsRequest, AcknowledgeInfo, AlarmData);
