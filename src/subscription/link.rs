// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data link subscriptions.

use std::sync::Arc;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{LinkEvent, LinkEventType, SubscribeLinksRequest};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::Link;

/// A change to one data link, as passed to the subscription callback.
#[derive(Debug, Clone)]
pub struct LinkUpdate {
    /// What happened to the link.
    pub event: LinkEventType,
    /// State of the link after the change.
    pub link: Arc<Link>,
}

#[derive(Debug, Default)]
pub(crate) struct LinkCache {
    links: KeyedCache<String, Link>,
}

impl FrameHandler for LinkCache {
    type Output = LinkUpdate;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<LinkUpdate>, ParseError> {
        let event: LinkEvent = frame.decode()?;
        let info = event
            .link_info
            .as_ref()
            .ok_or_else(|| ParseError::MissingField("link_info".to_string()))?;

        let link = Arc::new(Link::from_proto(info));
        let kind = event.r#type();
        if kind == LinkEventType::Unregistered {
            self.links.remove(link.name());
        } else {
            self.links.insert(link.name().to_string(), Arc::clone(&link));
        }

        Ok(Some(LinkUpdate { event: kind, link }))
    }
}

/// A live subscription to the data links of an instance.
#[derive(Debug, Clone)]
pub struct LinkSubscription {
    future: SubscriptionFuture,
    cache: Arc<LinkCache>,
}

impl LinkSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(LinkUpdate) + Send + 'static,
    {
        let request = SubscribeLinksRequest {
            instance: instance.to_string(),
        };
        let cache = Arc::new(LinkCache::default());
        let future = super::start(
            Topic::LINKS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the latest state of a link.
    #[must_use]
    pub fn get_link(&self, name: &str) -> Option<Arc<Link>> {
        self.cache.links.get(name)
    }

    /// Returns the latest state of every registered link.
    #[must_use]
    pub fn list_links(&self) -> Vec<Arc<Link>> {
        let mut links = self.cache.links.values();
        links.sort_by(|a, b| a.name().cmp(b.name()));
        links
    }
}

impl Subscription for LinkSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{self, LinkInfo};

    fn frame(kind: LinkEventType, name: &str, status: &str) -> DataFrame {
        let event = LinkEvent {
            r#type: kind as i32,
            link_info: Some(LinkInfo {
                name: name.to_string(),
                status: status.to_string(),
                ..Default::default()
            }),
        };
        DataFrame {
            topic: "links".to_string(),
            call: 1,
            seq: 1,
            payload: proto::pack(&event).unwrap(),
        }
    }

    #[test]
    fn updates_replace_entry() {
        let cache = LinkCache::default();
        cache.handle(&frame(LinkEventType::Registered, "udp-in", "OK")).unwrap();
        cache.handle(&frame(LinkEventType::Updated, "udp-in", "FAILED")).unwrap();
        assert_eq!(cache.links.get("udp-in").unwrap().status(), "FAILED");
    }

    #[test]
    fn unregistered_removes_entry() {
        let cache = LinkCache::default();
        cache.handle(&frame(LinkEventType::Registered, "udp-in", "OK")).unwrap();
        let update = cache
            .handle(&frame(LinkEventType::Unregistered, "udp-in", "OK"))
            .unwrap()
            .unwrap();
        assert_eq!(update.event, LinkEventType::Unregistered);
        assert!(cache.links.get("udp-in").is_none());
    }

    #[test]
    fn event_without_link_is_rejected() {
        let cache = LinkCache::default();
        let frame = DataFrame {
            topic: "links".to_string(),
            call: 1,
            seq: 1,
            payload: proto::pack(&LinkEvent::default()).unwrap(),
        };
        assert!(matches!(cache.handle(&frame), Err(ParseError::MissingField(_))));
    }
}
