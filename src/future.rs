// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-assignment result cell shared between threads.
//!
//! A [`Promise`] starts pending and is resolved exactly once, with a value,
//! an error or a cancellation. Any number of threads may block on it with a
//! timeout; callbacks registered with [`Promise::add_done_callback`] run once
//! on the resolving thread.
//!
//! Giving up a wait never touches the promise: a timed-out
//! [`Promise::result`] returns [`ProtocolError::Timeout`] and a later wait
//! still observes the real outcome.
//!
//! # Examples
//!
//! ```
//! use std::thread;
//! use std::time::Duration;
//!
//! use missionlink::future::Promise;
//!
//! let promise = Promise::new();
//! let resolver = promise.clone();
//!
//! thread::spawn(move || resolver.set_result(42));
//!
//! assert_eq!(promise.result(Some(Duration::from_secs(5))).unwrap(), 42);
//! assert!(promise.done());
//! ```

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, ProtocolError, SubscriptionError};

type DoneCallback<T> = Box<dyn FnOnce(&Promise<T>) + Send>;

enum Outcome<T> {
    Pending,
    Value(T),
    Failed(SubscriptionError),
    Cancelled,
}

struct State<T> {
    outcome: Outcome<T>,
    callbacks: Vec<DoneCallback<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    resolved: Condvar,
}

/// A thread-safe, single-assignment result.
///
/// Cloning a promise yields another handle to the same cell.
pub struct Promise<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.state.lock().outcome {
            Outcome::Pending => "pending",
            Outcome::Value(_) => "resolved",
            Outcome::Failed(_) => "failed",
            Outcome::Cancelled => "cancelled",
        };
        f.debug_struct("Promise").field("state", &state).finish()
    }
}

impl<T: Clone + Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Creates a pending promise.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    outcome: Outcome::Pending,
                    callbacks: Vec::new(),
                }),
                resolved: Condvar::new(),
            }),
        }
    }

    /// Blocks until the promise resolves and returns its value.
    ///
    /// `None` waits forever.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Subscription`] with the stored error if the promise
    /// failed or was cancelled, and [`ProtocolError::Timeout`] if `timeout`
    /// elapsed first.
    pub fn result(&self, timeout: Option<Duration>) -> crate::Result<T> {
        self.wait_with(timeout, |outcome| match outcome {
            Outcome::Value(value) => Ok(value.clone()),
            Outcome::Failed(err) => Err(Error::Subscription(err.clone())),
            Outcome::Cancelled => Err(Error::Subscription(SubscriptionError::Cancelled)),
            Outcome::Pending => unreachable!("wait returned while pending"),
        })
    }

    /// Blocks until the promise resolves and returns its error, if any.
    ///
    /// A cancelled promise reports [`SubscriptionError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if `timeout` elapsed first.
    pub fn exception(&self, timeout: Option<Duration>) -> crate::Result<Option<SubscriptionError>> {
        self.wait_with(timeout, |outcome| match outcome {
            Outcome::Value(_) => Ok(None),
            Outcome::Failed(err) => Ok(Some(err.clone())),
            Outcome::Cancelled => Ok(Some(SubscriptionError::Cancelled)),
            Outcome::Pending => unreachable!("wait returned while pending"),
        })
    }

    fn wait_with<R>(
        &self,
        timeout: Option<Duration>,
        read: impl FnOnce(&Outcome<T>) -> crate::Result<R>,
    ) -> crate::Result<R> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.inner.state.lock();

        while matches!(state.outcome, Outcome::Pending) {
            match deadline {
                Some(deadline) => {
                    let timed_out = self
                        .inner
                        .resolved
                        .wait_until(&mut state, deadline)
                        .timed_out();
                    if timed_out && matches!(state.outcome, Outcome::Pending) {
                        let waited = timeout.unwrap_or_default();
                        return Err(ProtocolError::timeout(waited).into());
                    }
                }
                None => self.inner.resolved.wait(&mut state),
            }
        }

        read(&state.outcome)
    }

    /// Returns `true` once the promise is resolved, failed or cancelled.
    #[must_use]
    pub fn done(&self) -> bool {
        !matches!(self.inner.state.lock().outcome, Outcome::Pending)
    }

    /// Returns `true` while the promise is pending.
    #[must_use]
    pub fn running(&self) -> bool {
        !self.done()
    }

    /// Returns `true` if the promise was cancelled.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        matches!(self.inner.state.lock().outcome, Outcome::Cancelled)
    }

    /// Cancels the promise if it is still pending.
    ///
    /// Returns `false` if it had already resolved.
    pub fn cancel(&self) -> bool {
        self.resolve(Outcome::Cancelled)
    }

    /// Registers a callback to run once the promise is done.
    ///
    /// Runs immediately on the calling thread if the promise is already
    /// done, otherwise on the resolving thread. Callbacks run in
    /// registration order.
    pub fn add_done_callback<F>(&self, callback: F)
    where
        F: FnOnce(&Promise<T>) + Send + 'static,
    {
        {
            let mut state = self.inner.state.lock();
            if matches!(state.outcome, Outcome::Pending) {
                state.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback(self);
    }

    /// Resolves the promise with a value.
    ///
    /// # Panics
    ///
    /// Panics if the promise is already done.
    pub fn set_result(&self, value: T) {
        assert!(
            self.try_set_result(value),
            "set_result called on a promise that is already done"
        );
    }

    /// Resolves the promise with an error.
    ///
    /// # Panics
    ///
    /// Panics if the promise is already done.
    pub fn set_exception(&self, err: SubscriptionError) {
        assert!(
            self.try_set_exception(err),
            "set_exception called on a promise that is already done"
        );
    }

    /// Resolves the promise with a value unless it is already done.
    pub(crate) fn try_set_result(&self, value: T) -> bool {
        self.resolve(Outcome::Value(value))
    }

    /// Resolves the promise with an error unless it is already done.
    pub(crate) fn try_set_exception(&self, err: SubscriptionError) -> bool {
        self.resolve(Outcome::Failed(err))
    }

    fn resolve(&self, outcome: Outcome<T>) -> bool {
        let callbacks = {
            let mut state = self.inner.state.lock();
            if !matches!(state.outcome, Outcome::Pending) {
                return false;
            }
            state.outcome = outcome;
            mem::take(&mut state.callbacks)
        };
        self.inner.resolved.notify_all();

        for callback in callbacks {
            callback(self);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn resolves_with_value() {
        let promise = Promise::new();
        assert!(promise.running());
        promise.set_result(5);
        assert!(promise.done());
        assert!(!promise.cancelled());
        assert_eq!(promise.result(None).unwrap(), 5);
        assert_eq!(promise.exception(None).unwrap(), None);
    }

    #[test]
    fn resolves_with_error() {
        let promise: Promise<bool> = Promise::new();
        let failure = SubscriptionError::ConnectionFailure("refused".to_string());
        promise.set_exception(failure.clone());

        assert_eq!(promise.exception(None).unwrap(), Some(failure.clone()));
        let err = promise.result(None).unwrap_err();
        assert!(matches!(err, Error::Subscription(e) if e == failure));
    }

    #[test]
    #[should_panic(expected = "already done")]
    fn second_set_result_panics() {
        let promise = Promise::new();
        promise.set_result(1);
        promise.set_result(2);
    }

    #[test]
    #[should_panic(expected = "already done")]
    fn set_exception_after_result_panics() {
        let promise = Promise::new();
        promise.set_result(1);
        promise.set_exception(SubscriptionError::Cancelled);
    }

    #[test]
    fn only_one_concurrent_resolution_wins() {
        let promise = Promise::new();
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let promise = promise.clone();
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if promise.try_set_result(i) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(promise.done());
    }

    #[test]
    fn timeout_does_not_change_outcome() {
        let promise = Promise::new();
        let resolver = promise.clone();

        let err = promise.result(Some(Duration::from_millis(10))).unwrap_err();
        assert!(err.is_timeout());
        assert!(promise.running());

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            resolver.set_result("late");
        });

        assert_eq!(promise.result(Some(Duration::from_secs(5))).unwrap(), "late");
        handle.join().unwrap();
        assert_eq!(promise.result(Some(Duration::ZERO)).unwrap(), "late");
    }

    #[test]
    fn exception_times_out_while_pending() {
        let promise: Promise<u8> = Promise::new();
        let err = promise.exception(Some(Duration::from_millis(5))).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn callbacks_run_in_order_once() {
        let promise = Promise::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let calls = Arc::clone(&calls);
            promise.add_done_callback(move |p: &Promise<u32>| {
                calls.lock().push((i, p.result(None).unwrap()));
            });
        }
        promise.set_result(9);
        assert!(!promise.try_set_result(10));

        assert_eq!(*calls.lock(), vec![(0, 9), (1, 9), (2, 9)]);
    }

    #[test]
    fn callback_added_after_resolution_runs_immediately() {
        let promise = Promise::new();
        promise.set_result(1);

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        promise.add_done_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_only_while_pending() {
        let promise: Promise<u8> = Promise::new();
        assert!(promise.cancel());
        assert!(promise.cancelled());
        assert!(!promise.cancel());
        assert_eq!(
            promise.exception(None).unwrap(),
            Some(SubscriptionError::Cancelled)
        );

        let resolved = Promise::new();
        resolved.set_result(1u8);
        assert!(!resolved.cancel());
        assert!(!resolved.cancelled());
    }
}
