// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle that resolves when the server acknowledges a subscription.

use std::time::Duration;

use crate::error::{Result, SubscriptionError};
use crate::future::Promise;
use crate::protocol::codec::{DataFrame, Envelope};
use crate::protocol::manager::SubscriptionManager;
use crate::protocol::transport::Connector;

/// A subscription call coupled to the promise of its acknowledgment.
///
/// The promise resolves to `true` when the server replies to the initial
/// request, or when the call is closed without error before any reply. It
/// fails with the error that closed the call otherwise.
///
/// Waiting with a timeout never closes the call; use [`cancel`] for that.
///
/// [`cancel`]: SubscriptionFuture::cancel
#[derive(Debug, Clone)]
pub struct SubscriptionFuture {
    manager: SubscriptionManager,
    promise: Promise<bool>,
}

impl SubscriptionFuture {
    /// Opens `manager` and routes its data frames to `on_data`.
    ///
    /// `on_data` runs on the receiver thread, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager cannot be opened.
    pub fn open<C, F>(manager: SubscriptionManager, connector: C, mut on_data: F) -> Result<Self>
    where
        C: Connector,
        F: FnMut(&DataFrame) + Send + 'static,
    {
        let promise = Promise::new();

        let on_close = promise.clone();
        manager.add_close_listener(move |reason| {
            match reason {
                None => on_close.try_set_result(true),
                Some(err) => on_close.try_set_exception(err.clone()),
            };
        });

        let on_reply = promise.clone();
        let handle = manager.clone();
        manager.open(connector, move |envelope| match envelope {
            Envelope::Reply(reply) if handle.request_id() == Some(reply.reply_to) => {
                match &reply.error {
                    None => on_reply.try_set_result(true),
                    Some(err) => on_reply.try_set_exception(SubscriptionError::Server(err.clone())),
                };
            }
            Envelope::Data(frame) => on_data(frame),
            Envelope::Reply(_) | Envelope::Exception(_) => {}
        })?;

        Ok(Self { manager, promise })
    }

    /// Blocks until the server acknowledged the subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Subscription`](crate::Error::Subscription) if the
    /// call failed or was cancelled, and a timeout error if `timeout`
    /// elapsed first. A timeout leaves the call running.
    pub fn reply(&self, timeout: Option<Duration>) -> Result<bool> {
        self.promise.result(timeout)
    }

    /// Blocks until the call resolved and returns its error, if any.
    ///
    /// # Errors
    ///
    /// Returns a timeout error if `timeout` elapsed first.
    pub fn exception(&self, timeout: Option<Duration>) -> Result<Option<SubscriptionError>> {
        self.promise.exception(timeout)
    }

    /// Closes the call.
    ///
    /// A call still waiting for its acknowledgment resolves as cancelled.
    /// Returns `true` if that happened.
    pub fn cancel(&self) -> bool {
        let cancelled = self.promise.cancel();
        self.manager.close(None);
        cancelled
    }

    /// Returns `true` once the acknowledgment promise resolved.
    #[must_use]
    pub fn done(&self) -> bool {
        self.promise.done()
    }

    /// Returns `true` while waiting for the acknowledgment.
    #[must_use]
    pub fn running(&self) -> bool {
        self.promise.running()
    }

    /// Returns `true` if the call was cancelled before its acknowledgment.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        self.promise.cancelled()
    }

    /// Registers a callback to run once the acknowledgment promise resolves.
    pub fn add_done_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Promise<bool>) + Send + 'static,
    {
        self.promise.add_done_callback(callback);
    }

    /// Returns the manager driving this call.
    #[must_use]
    pub fn manager(&self) -> &SubscriptionManager {
        &self.manager
    }
}
