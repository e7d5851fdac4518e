// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Container (packet) subscriptions.

use std::sync::Arc;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{ContainerData, SubscribeContainersRequest};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::Container;

#[derive(Debug, Default)]
pub(crate) struct ContainerCache {
    containers: KeyedCache<String, Container>,
}

impl FrameHandler for ContainerCache {
    type Output = Arc<Container>;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<Arc<Container>>, ParseError> {
        let data: ContainerData = frame.decode()?;
        if data.name.is_empty() {
            return Err(ParseError::MissingField("container name".to_string()));
        }
        let container = Arc::new(Container::from_proto(&data));
        self.containers
            .insert(container.name().to_string(), Arc::clone(&container));
        Ok(Some(container))
    }
}

/// A live subscription to the packets of selected containers.
///
/// The cache keeps the most recent packet of each container.
#[derive(Debug, Clone)]
pub struct ContainerSubscription {
    future: SubscriptionFuture,
    cache: Arc<ContainerCache>,
}

impl ContainerSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        processor: &str,
        names: Vec<String>,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Arc<Container>) + Send + 'static,
    {
        let request = SubscribeContainersRequest {
            instance: instance.to_string(),
            processor: processor.to_string(),
            names,
        };
        let cache = Arc::new(ContainerCache::default());
        let future = super::start(
            Topic::CONTAINERS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the latest packet of a container.
    #[must_use]
    pub fn get_container(&self, name: &str) -> Option<Arc<Container>> {
        self.cache.containers.get(name)
    }

    /// Returns the latest packet of every container seen so far.
    #[must_use]
    pub fn list_containers(&self) -> Vec<Arc<Container>> {
        self.cache.containers.values()
    }
}

impl Subscription for ContainerSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto;

    fn frame(name: &str, seq_count: i32) -> DataFrame {
        let data = ContainerData {
            name: name.to_string(),
            seq_count,
            binary: vec![0x08, 0x01],
            ..Default::default()
        };
        DataFrame {
            topic: "containers".to_string(),
            call: 1,
            seq: seq_count,
            payload: proto::pack(&data).unwrap(),
        }
    }

    #[test]
    fn keeps_latest_packet_per_container() {
        let cache = ContainerCache::default();
        cache.handle(&frame("/YSS/SIMULATOR/FlightData", 1)).unwrap();
        cache.handle(&frame("/YSS/SIMULATOR/Power", 2)).unwrap();
        cache.handle(&frame("/YSS/SIMULATOR/FlightData", 3)).unwrap();

        assert_eq!(cache.containers.len(), 2);
        let latest = cache.containers.get("/YSS/SIMULATOR/FlightData").unwrap();
        assert_eq!(latest.seq_count(), 3);
    }

    #[test]
    fn unnamed_packet_is_rejected() {
        let cache = ContainerCache::default();
        assert!(cache.handle(&frame("", 1)).is_err());
    }
}
