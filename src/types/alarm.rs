// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alarm state.

use chrono::{DateTime, Utc};

use super::ParameterId;
use super::value::to_datetime;
use crate::proto::{self, AlarmNotificationType, AlarmSeverity, AlarmType};

/// State of one alarm, as last reported by the server.
///
/// An alarm goes through these flags:
///
/// - `triggered`: the monitored condition is out of limits now
/// - `process_ok`: the process is back in limits (may still be latched)
/// - `acknowledged`: an operator acknowledged the alarm
/// - `latching`: the alarm stays active until reset, even when back in limits
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    id: ParameterId,
    alarm_type: AlarmType,
    severity: AlarmSeverity,
    notification: AlarmNotificationType,
    trigger_time: Option<DateTime<Utc>>,
    seq_num: i32,
    count: i32,
    violations: i32,
    process_ok: bool,
    triggered: bool,
    acknowledged: bool,
    latching: bool,
    shelved: bool,
    pending: bool,
    acknowledged_by: Option<String>,
    acknowledge_message: Option<String>,
    acknowledge_time: Option<DateTime<Utc>>,
}

impl Alarm {
    pub(crate) fn from_proto(data: &proto::AlarmData) -> Self {
        let ack = data.acknowledge_info.as_ref();
        Self {
            id: data
                .id
                .as_ref()
                .map(ParameterId::from_proto)
                .unwrap_or_else(|| ParameterId::new("")),
            alarm_type: data.r#type(),
            severity: data.severity(),
            notification: data.notification_type(),
            trigger_time: data.trigger_time.as_ref().and_then(to_datetime),
            seq_num: data.seq_num,
            count: data.count,
            violations: data.violations,
            process_ok: data.process_ok,
            triggered: data.triggered,
            acknowledged: data.acknowledged,
            latching: data.latching,
            shelved: data.shelved,
            pending: data.pending,
            acknowledged_by: ack.map(|a| a.acknowledged_by.clone()),
            acknowledge_message: ack.and_then(|a| a.acknowledge_message.clone()),
            acknowledge_time: ack
                .and_then(|a| a.acknowledge_time.as_ref())
                .and_then(to_datetime),
        }
    }

    /// Returns the qualified name of the alarmed parameter or event source.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Returns the identity of the alarmed item.
    #[must_use]
    pub fn id(&self) -> &ParameterId {
        &self.id
    }

    /// Returns whether a parameter or an event raised the alarm.
    #[must_use]
    pub fn alarm_type(&self) -> AlarmType {
        self.alarm_type
    }

    /// Returns the highest severity reached.
    #[must_use]
    pub fn severity(&self) -> AlarmSeverity {
        self.severity
    }

    /// Returns why this update was sent.
    #[must_use]
    pub fn notification(&self) -> AlarmNotificationType {
        self.notification
    }

    /// Returns when the alarm was first triggered.
    #[must_use]
    pub fn trigger_time(&self) -> Option<DateTime<Utc>> {
        self.trigger_time
    }

    /// Returns the alarm instance sequence number.
    #[must_use]
    pub fn seq_num(&self) -> i32 {
        self.seq_num
    }

    /// Returns the number of samples received while alarmed.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Returns the number of out-of-limit samples.
    #[must_use]
    pub fn violations(&self) -> i32 {
        self.violations
    }

    /// Returns `true` if the alarm is not triggered.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.triggered
    }

    /// Returns `true` if the process is back within limits.
    #[must_use]
    pub fn is_process_ok(&self) -> bool {
        self.process_ok
    }

    /// Returns `true` if an operator acknowledged the alarm.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Returns `true` for latching alarms.
    #[must_use]
    pub fn is_latching(&self) -> bool {
        self.latching
    }

    /// Returns `true` if the alarm is shelved.
    #[must_use]
    pub fn is_shelved(&self) -> bool {
        self.shelved
    }

    /// Returns `true` while the alarm waits for its minimum violation count.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns who acknowledged the alarm.
    #[must_use]
    pub fn acknowledged_by(&self) -> Option<&str> {
        self.acknowledged_by.as_deref()
    }

    /// Returns the acknowledgment comment.
    #[must_use]
    pub fn acknowledge_message(&self) -> Option<&str> {
        self.acknowledge_message.as_deref()
    }

    /// Returns when the alarm was acknowledged.
    #[must_use]
    pub fn acknowledge_time(&self) -> Option<DateTime<Utc>> {
        self.acknowledge_time
    }

    /// Returns `true` when nothing about this alarm needs attention anymore:
    /// the process is back in limits, the alarm is no longer triggered and it
    /// was acknowledged.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.process_ok && !self.triggered && self.acknowledged
    }
}
