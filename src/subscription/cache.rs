// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Latest-state store shared by typed subscriptions.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// A map from keys to immutable snapshots.
///
/// Written by one receiver thread and read by any number of caller threads.
/// Entries are never modified in place: every write publishes a new
/// [`Arc`], so a snapshot handed out earlier stays valid and complete.
#[derive(Debug)]
pub struct KeyedCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> KeyedCache<K, V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot stored for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.read().get(key).cloned()
    }

    /// Replaces the snapshot stored for `key`.
    pub fn insert(&self, key: K, value: Arc<V>) {
        self.entries.write().insert(key, value);
    }

    /// Publishes a snapshot derived from the current one.
    ///
    /// `merge` receives the current snapshot, if any, and returns its
    /// successor. Runs under the write lock, so concurrent merges of the
    /// same key cannot lose updates.
    pub fn merge(&self, key: K, merge: impl FnOnce(Option<&V>) -> V) -> Arc<V> {
        let mut entries = self.entries.write();
        let next = Arc::new(merge(entries.get(&key).map(|entry| &**entry)));
        entries.insert(key, Arc::clone(&next));
        next
    }

    /// Removes the snapshot stored for `key`.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.write().remove(key)
    }

    /// Returns a copy of the whole map.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<K, Arc<V>> {
        self.entries.read().clone()
    }

    /// Returns all snapshots, in no particular order.
    #[must_use]
    pub fn values(&self) -> Vec<Arc<V>> {
        self.entries.read().values().cloned().collect()
    }

    /// Returns all keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
