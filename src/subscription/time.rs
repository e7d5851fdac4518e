// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mission time subscriptions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{SubscribeTimeRequest, TimeInfo};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::to_datetime;

#[derive(Debug, Default)]
pub(crate) struct TimeCache {
    current: RwLock<Option<DateTime<Utc>>>,
}

impl FrameHandler for TimeCache {
    type Output = DateTime<Utc>;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<DateTime<Utc>>, ParseError> {
        let info: TimeInfo = frame.decode()?;
        let time = info
            .current_time
            .as_ref()
            .and_then(to_datetime)
            .ok_or_else(|| ParseError::MissingField("current_time".to_string()))?;
        *self.current.write() = Some(time);
        Ok(Some(time))
    }
}

/// A live subscription to the mission time of an instance or processor.
#[derive(Debug, Clone)]
pub struct TimeSubscription {
    future: SubscriptionFuture,
    cache: Arc<TimeCache>,
}

impl TimeSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        processor: Option<&str>,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        let request = SubscribeTimeRequest {
            instance: instance.to_string(),
            processor: processor.map(ToString::to_string),
        };
        let cache = Arc::new(TimeCache::default());
        let future = super::start(
            Topic::TIME,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the most recent mission time, if any was received.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        *self.cache.current.read()
    }
}

impl Subscription for TimeSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}
