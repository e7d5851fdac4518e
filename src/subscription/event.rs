// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event subscriptions. Events are passed through without caching.

use std::sync::Arc;

use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{self, SubscribeEventsRequest};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::Event;

#[derive(Debug, Default)]
pub(crate) struct EventDecoder;

impl FrameHandler for EventDecoder {
    type Output = Event;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<Event>, ParseError> {
        let event: proto::Event = frame.decode()?;
        Ok(Some(Event::from_proto(&event)))
    }
}

/// A live subscription to the events of an instance.
#[derive(Debug, Clone)]
pub struct EventSubscription {
    future: SubscriptionFuture,
}

impl EventSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Event) + Send + 'static,
    {
        let request = SubscribeEventsRequest {
            instance: instance.to_string(),
        };
        let future = super::start(
            Topic::EVENTS,
            &request,
            connector,
            sequence,
            Arc::new(EventDecoder),
            on_data,
        )?;
        Ok(Self { future })
    }
}

impl Subscription for EventSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}
