// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry parameter subscriptions.
//!
//! The server refers to parameters by numeric ids after the first sample.
//! Every frame carrying a mapping table refreshes the id to identity map,
//! and later samples carrying only a numeric id are resolved through it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{self, SubscribeParametersData, SubscribeParametersRequest, SubscriptionAction};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::{ParameterData, ParameterId, ParameterValue};

/// Options for subscribing to parameters.
///
/// # Examples
///
/// ```
/// use missionlink::subscription::AddOptions;
///
/// let options = AddOptions::new()
///     .with_abort_on_invalid(false)
///     .with_update_on_expiration(true);
/// assert!(!options.abort_on_invalid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    abort_on_invalid: bool,
    send_from_cache: bool,
    update_on_expiration: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            abort_on_invalid: true,
            send_from_cache: true,
            update_on_expiration: false,
        }
    }
}

impl AddOptions {
    /// Creates the default options: abort on unknown ids, send cached
    /// values immediately, no expiration updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the whole request if any id is unknown. When disabled, unknown
    /// ids are reported through [`ParameterSubscription::invalid_ids`].
    #[must_use]
    pub fn with_abort_on_invalid(mut self, abort: bool) -> Self {
        self.abort_on_invalid = abort;
        self
    }

    /// Sends the last known value of each parameter right away.
    #[must_use]
    pub fn with_send_from_cache(mut self, send: bool) -> Self {
        self.send_from_cache = send;
        self
    }

    /// Sends an update when a value expires.
    #[must_use]
    pub fn with_update_on_expiration(mut self, update: bool) -> Self {
        self.update_on_expiration = update;
        self
    }

    /// Returns whether unknown ids fail the request.
    #[must_use]
    pub fn abort_on_invalid(&self) -> bool {
        self.abort_on_invalid
    }

    /// Returns whether cached values are sent right away.
    #[must_use]
    pub fn send_from_cache(&self) -> bool {
        self.send_from_cache
    }

    /// Returns whether expirations produce updates.
    #[must_use]
    pub fn update_on_expiration(&self) -> bool {
        self.update_on_expiration
    }
}

#[derive(Default)]
pub(crate) struct ParameterCache {
    mapping: RwLock<HashMap<u32, ParameterId>>,
    values: KeyedCache<ParameterId, ParameterValue>,
    items: RwLock<BTreeSet<ParameterId>>,
    invalid: RwLock<BTreeSet<ParameterId>>,
    delivery_count: AtomicU64,
}

impl ParameterCache {
    fn resolve(&self, value: &proto::ParameterValue) -> Option<ParameterId> {
        if let Some(id) = &value.id {
            return Some(ParameterId::from_proto(id));
        }
        self.mapping.read().get(&value.numeric_id).cloned()
    }
}

impl FrameHandler for ParameterCache {
    type Output = ParameterData;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<ParameterData>, ParseError> {
        let data: SubscribeParametersData = frame.decode()?;

        if !data.mapping.is_empty() {
            let mut mapping = self.mapping.write();
            for (numeric_id, id) in &data.mapping {
                mapping.insert(*numeric_id, ParameterId::from_proto(id));
            }
        }

        if !data.invalid.is_empty() {
            let mut invalid = self.invalid.write();
            let mut items = self.items.write();
            for id in &data.invalid {
                let id = ParameterId::from_proto(id);
                tracing::warn!(parameter = %id, "Server reported unknown parameter");
                items.remove(&id);
                invalid.insert(id);
            }
        }

        if data.values.is_empty() {
            return Ok(None);
        }

        let mut batch = Vec::with_capacity(data.values.len());
        for value in &data.values {
            let Some(id) = self.resolve(value) else {
                tracing::warn!(numeric_id = value.numeric_id, "Skipping value of unmapped parameter");
                continue;
            };
            let value = Arc::new(ParameterValue::from_proto(id.clone(), value));
            self.values.insert(id, Arc::clone(&value));
            batch.push(value);
        }

        self.delivery_count.fetch_add(1, Ordering::Relaxed);
        Ok(Some(ParameterData::new(batch)))
    }
}

/// A live subscription to telemetry parameters.
///
/// The set of parameters can change without reopening the socket through
/// [`add`](Self::add) and [`remove`](Self::remove).
#[derive(Clone)]
pub struct ParameterSubscription {
    future: SubscriptionFuture,
    cache: Arc<ParameterCache>,
    instance: String,
    processor: String,
}

impl std::fmt::Debug for ParameterSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSubscription")
            .field("instance", &self.instance)
            .field("processor", &self.processor)
            .field("items", &self.cache.items.read().len())
            .field("delivery_count", &self.delivery_count())
            .finish_non_exhaustive()
    }
}

impl ParameterSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        processor: &str,
        ids: Vec<ParameterId>,
        options: AddOptions,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(ParameterData) + Send + 'static,
    {
        let request = request(instance, processor, &ids, options, SubscriptionAction::Replace);
        let cache = Arc::new(ParameterCache::default());
        cache.items.write().extend(ids);

        let future = super::start(
            Topic::PARAMETERS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;

        Ok(Self {
            future,
            cache,
            instance: instance.to_string(),
            processor: processor.to_string(),
        })
    }

    /// Adds parameters to the live subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`](crate::Error::NotOpen) if the
    /// subscription is closed, or
    /// [`Error::NotAcknowledged`](crate::Error::NotAcknowledged) before the
    /// server acknowledged it.
    pub fn add<I>(&self, ids: I, options: AddOptions) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<ParameterId>,
    {
        let ids: Vec<ParameterId> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let request = request(
            &self.instance,
            &self.processor,
            &ids,
            options,
            SubscriptionAction::Add,
        );
        self.future.manager().send(proto::pack(&request)?)?;

        tracing::debug!(count = ids.len(), "Added parameters to subscription");
        self.cache.items.write().extend(ids);
        Ok(())
    }

    /// Removes parameters from the live subscription.
    ///
    /// Values already received stay in the cache.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn remove<I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<ParameterId>,
    {
        let ids: Vec<ParameterId> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let request = SubscribeParametersRequest {
            instance: self.instance.clone(),
            processor: self.processor.clone(),
            id: ids.iter().map(ParameterId::to_proto).collect(),
            action: SubscriptionAction::Remove as i32,
            ..Default::default()
        };
        self.future.manager().send(proto::pack(&request)?)?;

        tracing::debug!(count = ids.len(), "Removed parameters from subscription");
        let mut items = self.cache.items.write();
        for id in &ids {
            items.remove(id);
        }
        Ok(())
    }

    /// Returns the latest value of a parameter.
    #[must_use]
    pub fn get_value(&self, id: impl Into<ParameterId>) -> Option<Arc<ParameterValue>> {
        self.cache.values.get(&id.into())
    }

    /// Returns the latest value of every parameter received so far.
    #[must_use]
    pub fn values(&self) -> HashMap<ParameterId, Arc<ParameterValue>> {
        self.cache.values.snapshot()
    }

    /// Returns the number of batches received.
    #[must_use]
    pub fn delivery_count(&self) -> u64 {
        self.cache.delivery_count.load(Ordering::Relaxed)
    }

    /// Returns the parameters currently requested from the server.
    #[must_use]
    pub fn items(&self) -> Vec<ParameterId> {
        self.cache.items.read().iter().cloned().collect()
    }

    /// Returns the ids the server reported as unknown.
    #[must_use]
    pub fn invalid_ids(&self) -> Vec<ParameterId> {
        self.cache.invalid.read().iter().cloned().collect()
    }
}

impl Subscription for ParameterSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}

fn request(
    instance: &str,
    processor: &str,
    ids: &[ParameterId],
    options: AddOptions,
    action: SubscriptionAction,
) -> SubscribeParametersRequest {
    SubscribeParametersRequest {
        instance: instance.to_string(),
        processor: processor.to_string(),
        id: ids.iter().map(ParameterId::to_proto).collect(),
        abort_on_invalid: Some(options.abort_on_invalid),
        update_on_expiration: Some(options.update_on_expiration),
        send_from_cache: Some(options.send_from_cache),
        action: action as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{NamedObjectId, Value, ValueType};

    fn frame(data: &SubscribeParametersData) -> DataFrame {
        DataFrame {
            topic: "parameters".to_string(),
            call: 1,
            seq: 1,
            payload: proto::pack(data).unwrap(),
        }
    }

    fn named(name: &str) -> NamedObjectId {
        NamedObjectId {
            name: name.to_string(),
            namespace: None,
        }
    }

    fn sample(numeric_id: u32, value: f64) -> proto::ParameterValue {
        proto::ParameterValue {
            numeric_id,
            eng_value: Some(Value {
                r#type: ValueType::Double as i32,
                double_value: value,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn mapping_resolves_later_samples() {
        let cache = ParameterCache::default();

        let first = SubscribeParametersData {
            mapping: HashMap::from([(5, named("/YSS/SIMULATOR/Battery1"))]),
            values: vec![sample(5, 12.0)],
            invalid: Vec::new(),
        };
        let batch = cache.handle(&frame(&first)).unwrap().unwrap();
        assert_eq!(batch.len(), 1);

        let second = SubscribeParametersData {
            values: vec![sample(5, 13.5)],
            ..Default::default()
        };
        cache.handle(&frame(&second)).unwrap();

        let latest = cache.values.get(&ParameterId::new("/YSS/SIMULATOR/Battery1")).unwrap();
        assert_eq!(latest.eng_value().and_then(|v| v.as_f64()), Some(13.5));
        assert_eq!(cache.delivery_count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unmapped_sample_is_skipped() {
        let cache = ParameterCache::default();
        let data = SubscribeParametersData {
            values: vec![sample(99, 1.0)],
            ..Default::default()
        };
        let batch = cache.handle(&frame(&data)).unwrap().unwrap();
        assert!(batch.is_empty());
        assert!(cache.values.is_empty());
    }

    #[test]
    fn frame_without_values_is_not_a_delivery() {
        let cache = ParameterCache::default();
        cache.items.write().insert(ParameterId::new("/nope"));

        let data = SubscribeParametersData {
            invalid: vec![named("/nope")],
            ..Default::default()
        };
        assert!(cache.handle(&frame(&data)).unwrap().is_none());
        assert_eq!(cache.delivery_count.load(Ordering::Relaxed), 0);
        assert!(cache.items.read().is_empty());
        assert!(cache.invalid.read().contains(&ParameterId::new("/nope")));
    }

    #[test]
    fn request_carries_options() {
        let ids = vec![ParameterId::with_namespace("MDB:OPS Name", "SIM_TIME")];
        let options = AddOptions::new().with_send_from_cache(false);
        let req = request("simulator", "realtime", &ids, options, SubscriptionAction::Add);

        assert_eq!(req.action, SubscriptionAction::Add as i32);
        assert_eq!(req.send_from_cache, Some(false));
        assert_eq!(req.abort_on_invalid, Some(true));
        assert_eq!(req.id[0].namespace.as_deref(), Some("MDB:OPS Name"));
    }

    #[test]
    fn wrong_payload_is_an_error() {
        let cache = ParameterCache::default();
        let frame = DataFrame {
            topic: "parameters".to_string(),
            call: 1,
            seq: 1,
            payload: proto::pack(&proto::LinkEvent::default()).unwrap(),
        };
        assert!(cache.handle(&frame).is_err());
    }
}
