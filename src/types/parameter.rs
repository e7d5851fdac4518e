// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter identities and samples.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::value::{Value, to_datetime};
use crate::proto::{self, AcquisitionStatus, MonitoringResult};

/// Logical identity of a parameter: a name, optionally within a namespace.
///
/// Without a namespace the name is a fully qualified mission database name
/// such as `/YSS/SIMULATOR/BatteryVoltage2`. With a namespace it is an alias
/// within that namespace.
///
/// # Examples
///
/// ```
/// use missionlink::types::ParameterId;
///
/// let qualified = ParameterId::from("/YSS/SIMULATOR/BatteryVoltage2");
/// assert_eq!(qualified.namespace(), None);
///
/// let alias = ParameterId::with_namespace("MDB:OPS Name", "SIMULATOR_BatteryVoltage2");
/// assert_eq!(alias.to_string(), "MDB:OPS Name/SIMULATOR_BatteryVoltage2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId {
    namespace: Option<String>,
    name: String,
}

impl ParameterId {
    /// Creates an identity from a fully qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Creates an identity from an alias within a namespace.
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub(crate) fn from_proto(id: &proto::NamedObjectId) -> Self {
        Self {
            namespace: id.namespace.clone(),
            name: id.name.clone(),
        }
    }

    pub(crate) fn to_proto(&self) -> proto::NamedObjectId {
        proto::NamedObjectId {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for ParameterId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ParameterId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// The latest known sample of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValue {
    id: ParameterId,
    raw_value: Option<Value>,
    eng_value: Option<Value>,
    generation_time: Option<DateTime<Utc>>,
    acquisition_time: Option<DateTime<Utc>>,
    acquisition_status: AcquisitionStatus,
    monitoring_result: Option<MonitoringResult>,
}

impl ParameterValue {
    /// Converts a wire sample whose identity has already been resolved.
    pub(crate) fn from_proto(id: ParameterId, value: &proto::ParameterValue) -> Self {
        Self {
            id,
            raw_value: value.raw_value.as_ref().and_then(Value::from_proto),
            eng_value: value.eng_value.as_ref().and_then(Value::from_proto),
            generation_time: value.generation_time.as_ref().and_then(to_datetime),
            acquisition_time: value.acquisition_time.as_ref().and_then(to_datetime),
            acquisition_status: value.acquisition_status(),
            monitoring_result: value
                .monitoring_result
                .and_then(|r| MonitoringResult::try_from(r).ok()),
        }
    }

    /// Returns the parameter identity.
    #[must_use]
    pub fn id(&self) -> &ParameterId {
        &self.id
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Returns the raw (uncalibrated) value.
    #[must_use]
    pub fn raw_value(&self) -> Option<&Value> {
        self.raw_value.as_ref()
    }

    /// Returns the engineering (calibrated) value.
    #[must_use]
    pub fn eng_value(&self) -> Option<&Value> {
        self.eng_value.as_ref()
    }

    /// Returns when the value was generated on board.
    #[must_use]
    pub fn generation_time(&self) -> Option<DateTime<Utc>> {
        self.generation_time
    }

    /// Returns when the value was acquired on ground.
    #[must_use]
    pub fn acquisition_time(&self) -> Option<DateTime<Utc>> {
        self.acquisition_time
    }

    /// Returns the acquisition status.
    #[must_use]
    pub fn acquisition_status(&self) -> AcquisitionStatus {
        self.acquisition_status
    }

    /// Returns the limit checking outcome, if the parameter has limits.
    #[must_use]
    pub fn monitoring_result(&self) -> Option<MonitoringResult> {
        self.monitoring_result
    }

    /// Returns `true` if the value was acquired and has not expired.
    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.acquisition_status == AcquisitionStatus::Acquired
    }
}

/// One batch of parameter updates, as delivered to a subscription callback.
#[derive(Debug, Clone, Default)]
pub struct ParameterData {
    values: Vec<Arc<ParameterValue>>,
}

impl ParameterData {
    pub(crate) fn new(values: Vec<Arc<ParameterValue>>) -> Self {
        Self { values }
    }

    /// Returns the values of this batch in arrival order.
    #[must_use]
    pub fn parameters(&self) -> &[Arc<ParameterValue>] {
        &self.values
    }

    /// Returns the value of a parameter in this batch.
    #[must_use]
    pub fn get_value(&self, id: &ParameterId) -> Option<&Arc<ParameterValue>> {
        self.values.iter().find(|v| v.id() == id)
    }

    /// Returns the number of values in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if this batch has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
