// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alarm subscriptions.
//!
//! The cache holds alarms that still need attention. An update for an
//! alarm that is back in limits, no longer triggered and acknowledged
//! evicts it; any other update replaces the cached state.

use std::sync::Arc;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{AlarmData, SubscribeAlarmsRequest};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::Alarm;

#[derive(Debug, Default)]
pub(crate) struct AlarmCache {
    alarms: KeyedCache<String, Alarm>,
}

impl FrameHandler for AlarmCache {
    type Output = Arc<Alarm>;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<Arc<Alarm>>, ParseError> {
        let data: AlarmData = frame.decode()?;
        if data.id.is_none() {
            return Err(ParseError::MissingField("alarm id".to_string()));
        }

        let alarm = Arc::new(Alarm::from_proto(&data));
        if alarm.is_cleared() {
            tracing::debug!(alarm = alarm.name(), "Alarm cleared");
            self.alarms.remove(alarm.name());
        } else {
            self.alarms.insert(alarm.name().to_string(), Arc::clone(&alarm));
        }
        Ok(Some(alarm))
    }
}

/// A live subscription to the alarms of a processor.
#[derive(Debug, Clone)]
pub struct AlarmSubscription {
    future: SubscriptionFuture,
    cache: Arc<AlarmCache>,
}

impl AlarmSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        processor: &str,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Arc<Alarm>) + Send + 'static,
    {
        let request = SubscribeAlarmsRequest {
            instance: instance.to_string(),
            processor: processor.to_string(),
        };
        let cache = Arc::new(AlarmCache::default());
        let future = super::start(
            Topic::ALARMS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the latest state of an alarm, unless it was cleared.
    #[must_use]
    pub fn get_alarm(&self, name: &str) -> Option<Arc<Alarm>> {
        self.cache.alarms.get(name)
    }

    /// Returns every alarm that still needs attention.
    #[must_use]
    pub fn list_alarms(&self) -> Vec<Arc<Alarm>> {
        self.cache.alarms.values()
    }
}

impl Subscription for AlarmSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{self, NamedObjectId};

    fn frame(process_ok: bool, triggered: bool, acknowledged: bool) -> DataFrame {
        let data = AlarmData {
            id: Some(NamedObjectId {
                name: "/YSS/SIMULATOR/O2".to_string(),
                namespace: None,
            }),
            process_ok,
            triggered,
            acknowledged,
            ..Default::default()
        };
        DataFrame {
            topic: "alarms".to_string(),
            call: 1,
            seq: 1,
            payload: proto::pack(&data).unwrap(),
        }
    }

    #[test]
    fn triggered_alarm_is_cached() {
        let cache = AlarmCache::default();
        cache.handle(&frame(false, true, false)).unwrap();
        assert!(cache.alarms.get("/YSS/SIMULATOR/O2").is_some());
    }

    #[test]
    fn cleared_alarm_is_evicted() {
        let cache = AlarmCache::default();
        cache.handle(&frame(false, true, false)).unwrap();
        cache.handle(&frame(true, false, true)).unwrap();
        assert!(cache.alarms.get("/YSS/SIMULATOR/O2").is_none());
    }

    #[test]
    fn acknowledged_but_triggered_alarm_stays() {
        let cache = AlarmCache::default();
        cache.handle(&frame(false, true, false)).unwrap();
        cache.handle(&frame(false, true, true)).unwrap();
        let alarm = cache.alarms.get("/YSS/SIMULATOR/O2").unwrap();
        assert!(alarm.is_acknowledged());
    }
}
