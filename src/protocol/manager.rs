// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle of one subscription call.
//!
//! A [`SubscriptionManager`] binds one topic to one socket. [`open`] starts a
//! single receiver thread which connects, sends the initial request and then
//! decodes every inbound frame, handing it to the registered callback in
//! arrival order. Follow-up requests written with [`send`] travel over the
//! same socket.
//!
//! The manager moves through `Created -> Open -> Closing -> Closed`. Only
//! the first [`close`] performs teardown; every close listener then runs
//! exactly once with the close reason (`None` for a requested close).
//!
//! Transport failures and server exceptions end the call. The receiver
//! thread never tears itself down: it hands the close to a helper thread so
//! that joining the receiver cannot deadlock. No reconnection is attempted.
//!
//! [`open`]: SubscriptionManager::open
//! [`send`]: SubscriptionManager::send
//! [`close`]: SubscriptionManager::close

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Error, ProtocolError, Result, SubscriptionError};
use crate::proto::Any;
use crate::protocol::codec::{self, Envelope, SequenceGenerator, Topic};
use crate::protocol::transport::{Connection, Connector};

/// Callback receiving every decoded frame of a call.
///
/// Runs on the receiver thread. A callback that blocks stalls the socket.
pub type FrameCallback = Box<dyn FnMut(&Envelope) + Send>;

type CloseListener = Box<dyn FnOnce(Option<&SubscriptionError>) + Send>;

/// Lifecycle state of a [`SubscriptionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Not opened yet.
    Created,
    /// Receiver thread running.
    Open,
    /// Teardown in progress.
    Closing,
    /// Terminal.
    Closed,
}

/// Request from caller threads to the receiver thread.
enum Outbound {
    Frame(Vec<u8>),
    Close,
}

struct Shared {
    state: ManagerState,
    request_id: Option<i32>,
    call: Option<i32>,
    outbound: Option<mpsc::UnboundedSender<Outbound>>,
    receiver: Option<JoinHandle<()>>,
    listeners: Vec<CloseListener>,
    close_reason: Option<SubscriptionError>,
}

struct Inner {
    topic: Topic,
    options: Any,
    sequence: Arc<SequenceGenerator>,
    shared: Mutex<Shared>,
}

/// Owner of one subscription socket and its receiver thread.
///
/// Cloning yields another handle to the same manager.
#[derive(Clone)]
pub struct SubscriptionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("SubscriptionManager")
            .field("topic", &self.inner.topic)
            .field("state", &shared.state)
            .field("request_id", &shared.request_id)
            .field("call", &shared.call)
            .finish_non_exhaustive()
    }
}

impl SubscriptionManager {
    /// Creates a manager for `topic` that will subscribe with `options`.
    #[must_use]
    pub fn new(topic: Topic, options: Any, sequence: Arc<SequenceGenerator>) -> Self {
        Self {
            inner: Arc::new(Inner {
                topic,
                options,
                sequence,
                shared: Mutex::new(Shared {
                    state: ManagerState::Created,
                    request_id: None,
                    call: None,
                    outbound: None,
                    receiver: None,
                    listeners: Vec::new(),
                    close_reason: None,
                }),
            }),
        }
    }

    /// Returns the topic of this call.
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.inner.topic
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ManagerState {
        self.inner.shared.lock().state
    }

    /// Returns `true` while the receiver thread is running.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ManagerState::Open
    }

    /// Returns the id of the initial request, once opened.
    #[must_use]
    pub fn request_id(&self) -> Option<i32> {
        self.inner.shared.lock().request_id
    }

    /// Returns the call id assigned by the server, once acknowledged.
    #[must_use]
    pub fn call(&self) -> Option<i32> {
        self.inner.shared.lock().call
    }

    /// Starts the receiver thread.
    ///
    /// The thread connects through `connector`, sends the initial request
    /// and then invokes `callback` for every decoded frame. Connection
    /// failures are reported through the close listeners, not here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] if the manager was already opened or
    /// closed, and [`ProtocolError::ConnectionFailed`] if the thread cannot
    /// be spawned.
    pub fn open<C, F>(&self, connector: C, callback: F) -> Result<()>
    where
        C: Connector,
        F: FnMut(&Envelope) + Send + 'static,
    {
        let mut shared = self.inner.shared.lock();
        if shared.state != ManagerState::Created {
            return Err(Error::NotOpen);
        }

        let request_id = self.inner.sequence.next();
        let initial = codec::encode_subscribe(
            request_id,
            &self.inner.topic,
            self.inner.options.clone(),
        );
        let (tx, rx) = mpsc::unbounded_channel();

        let manager = self.clone();
        let callback: FrameCallback = Box::new(callback);
        let handle = thread::Builder::new()
            .name(format!("missionlink-{}", self.inner.topic))
            .spawn(move || manager.run_receiver(connector, rx, initial, callback))
            .map_err(|e| {
                ProtocolError::ConnectionFailed(format!("cannot spawn receiver thread: {e}"))
            })?;

        shared.state = ManagerState::Open;
        shared.request_id = Some(request_id);
        shared.outbound = Some(tx);
        shared.receiver = Some(handle);

        tracing::info!(topic = %self.inner.topic, request_id, "Subscription opened");
        Ok(())
    }

    /// Sends a follow-up request on the established call.
    ///
    /// Returns the id of the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] unless the manager is open, and
    /// [`Error::NotAcknowledged`] before the server replied to the initial
    /// request.
    pub fn send(&self, options: Any) -> Result<i32> {
        self.enqueue(|id, call| codec::encode_control(id, &self.inner.topic, call, options))
    }

    /// Asks the server to end the call without closing the socket.
    ///
    /// Returns the id of the request.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub fn cancel_call(&self) -> Result<i32> {
        self.enqueue(codec::encode_cancel)
    }

    fn enqueue(&self, encode: impl FnOnce(i32, i32) -> Vec<u8>) -> Result<i32> {
        let shared = self.inner.shared.lock();
        if shared.state != ManagerState::Open {
            return Err(Error::NotOpen);
        }
        let call = shared.call.ok_or(Error::NotAcknowledged)?;
        let outbound = shared.outbound.as_ref().ok_or(Error::NotOpen)?;

        let id = self.inner.sequence.next();
        outbound
            .send(Outbound::Frame(encode(id, call)))
            .map_err(|_| Error::NotOpen)?;

        tracing::debug!(topic = %self.inner.topic, id, call, "Queued control frame");
        Ok(id)
    }

    /// Closes the call.
    ///
    /// Only the first call performs teardown: it stops the socket, waits for
    /// the receiver thread (unless called from it), then runs every close
    /// listener with `reason`. Later calls return immediately.
    pub fn close(&self, reason: Option<SubscriptionError>) {
        let (outbound, receiver) = {
            let mut shared = self.inner.shared.lock();
            match shared.state {
                ManagerState::Closing | ManagerState::Closed => return,
                ManagerState::Created | ManagerState::Open => {}
            }
            shared.state = ManagerState::Closing;
            (shared.outbound.take(), shared.receiver.take())
        };

        if let Some(outbound) = outbound {
            // The receiver may already be gone after a transport failure
            let _ = outbound.send(Outbound::Close);
        }

        if let Some(receiver) = receiver {
            if receiver.thread().id() == thread::current().id() {
                tracing::debug!(topic = %self.inner.topic, "Close requested from receiver thread");
            } else if receiver.join().is_err() {
                tracing::error!(topic = %self.inner.topic, "Receiver thread panicked");
            }
        }

        let listeners = {
            let mut shared = self.inner.shared.lock();
            shared.state = ManagerState::Closed;
            shared.close_reason.clone_from(&reason);
            mem::take(&mut shared.listeners)
        };

        match &reason {
            None => tracing::info!(topic = %self.inner.topic, "Subscription closed"),
            Some(err) => tracing::warn!(topic = %self.inner.topic, error = %err, "Subscription closed"),
        }

        for listener in listeners {
            listener(reason.as_ref());
        }
    }

    /// Closes the call from a helper thread.
    ///
    /// Used where the caller must not wait for the receiver thread.
    pub fn close_in_background(&self, reason: Option<SubscriptionError>) {
        let manager = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("missionlink-{}-close", self.inner.topic))
            .spawn(move || manager.close(reason));

        if let Err(err) = spawned {
            tracing::error!(topic = %self.inner.topic, error = %err, "Cannot spawn close thread");
        }
    }

    /// Registers a listener invoked once when the manager closes.
    ///
    /// Runs immediately if the manager is already closed.
    pub fn add_close_listener<F>(&self, listener: F)
    where
        F: FnOnce(Option<&SubscriptionError>) + Send + 'static,
    {
        let reason = {
            let mut shared = self.inner.shared.lock();
            if shared.state != ManagerState::Closed {
                shared.listeners.push(Box::new(listener));
                return;
            }
            shared.close_reason.clone()
        };
        listener(reason.as_ref());
    }

    // ========================================================================
    // Receiver thread
    // ========================================================================

    fn run_receiver<C: Connector>(
        &self,
        connector: C,
        commands: mpsc::UnboundedReceiver<Outbound>,
        initial: Vec<u8>,
        callback: FrameCallback,
    ) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!(topic = %self.inner.topic, error = %err, "Cannot start receiver runtime");
                self.close_in_background(Some(SubscriptionError::ConnectionFailure(
                    err.to_string(),
                )));
                return;
            }
        };

        match runtime.block_on(self.drive(connector, commands, initial, callback)) {
            Ok(()) => tracing::debug!(topic = %self.inner.topic, "Receiver stopped"),
            Err(err) => {
                tracing::error!(topic = %self.inner.topic, error = %err, "Subscription failed");
                self.close_in_background(Some(err));
            }
        }
    }

    async fn drive<C: Connector>(
        &self,
        connector: C,
        mut commands: mpsc::UnboundedReceiver<Outbound>,
        initial: Vec<u8>,
        mut callback: FrameCallback,
    ) -> std::result::Result<(), SubscriptionError> {
        let mut connection = tokio::select! {
            connection = connector.connect() => connection?,
            _ = commands.recv() => return Ok(()),
        };
        connection.send(initial).await?;

        loop {
            let step = tokio::select! {
                command = commands.recv() => Step::Command(command),
                inbound = connection.recv() => Step::Inbound(inbound),
            };

            match step {
                Step::Command(Some(Outbound::Frame(frame))) => connection.send(frame).await?,
                Step::Command(Some(Outbound::Close) | None) => {
                    if let Err(err) = connection.close().await {
                        tracing::debug!(topic = %self.inner.topic, error = %err, "Close handshake failed");
                    }
                    return Ok(());
                }
                Step::Inbound(Ok(Some(bytes))) => self.dispatch(&bytes, &mut callback)?,
                Step::Inbound(Ok(None)) => {
                    return Err(SubscriptionError::ConnectionFailure(
                        "connection closed by server".to_string(),
                    ));
                }
                Step::Inbound(Err(err)) => return Err(err.into()),
            }
        }
    }

    /// Decodes one inbound frame and hands it to the callback.
    ///
    /// Returns an error for frames that end the call.
    fn dispatch(
        &self,
        bytes: &[u8],
        callback: &mut FrameCallback,
    ) -> std::result::Result<(), SubscriptionError> {
        let envelope = match codec::decode(bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(topic = %self.inner.topic, error = %err, "Skipping undecodable frame");
                return Ok(());
            }
        };

        match &envelope {
            Envelope::Reply(reply) => {
                let initial = {
                    let mut shared = self.inner.shared.lock();
                    let initial = shared.request_id == Some(reply.reply_to);
                    if initial && shared.call.is_none() && reply.error.is_none() {
                        shared.call = Some(reply.call);
                    }
                    initial
                };
                tracing::debug!(
                    topic = %self.inner.topic,
                    reply_to = reply.reply_to,
                    call = reply.call,
                    "Received reply"
                );

                callback(&envelope);

                if let Some(err) = &reply.error {
                    if initial {
                        return Err(SubscriptionError::Server(err.clone()));
                    }
                    tracing::warn!(topic = %self.inner.topic, error = %err, "Request rejected");
                }
            }
            Envelope::Data(frame) => {
                if self.inner.shared.lock().call != Some(frame.call) {
                    tracing::debug!(
                        topic = %self.inner.topic,
                        call = frame.call,
                        "Skipping data of another call"
                    );
                    return Ok(());
                }
                callback(&envelope);
            }
            Envelope::Exception(err) => {
                callback(&envelope);
                return Err(SubscriptionError::Server(err.clone()));
            }
        }
        Ok(())
    }
}

enum Step {
    Command(Option<Outbound>),
    Inbound(std::result::Result<Option<Vec<u8>>, ProtocolError>),
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::proto::{self, SubscribeLinksRequest};

    fn manager() -> SubscriptionManager {
        let options = proto::pack(&SubscribeLinksRequest::default()).unwrap();
        SubscriptionManager::new(
            Topic::LINKS,
            options,
            Arc::new(SequenceGenerator::new()),
        )
    }

    #[test]
    fn new_manager_is_created() {
        let manager = manager();
        assert_eq!(manager.state(), ManagerState::Created);
        assert_eq!(manager.request_id(), None);
        assert_eq!(manager.call(), None);
    }

    #[test]
    fn send_before_open_is_rejected() {
        let manager = manager();
        let options = proto::pack(&SubscribeLinksRequest::default()).unwrap();
        assert!(matches!(manager.send(options), Err(Error::NotOpen)));
        assert!(matches!(manager.cancel_call(), Err(Error::NotOpen)));
    }

    #[test]
    fn close_unopened_manager_notifies_once() {
        let manager = manager();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        manager.add_close_listener(move |reason| {
            assert!(reason.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.close(None);
        manager.close(Some(SubscriptionError::Cancelled));

        assert_eq!(manager.state(), ManagerState::Closed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_added_after_close_sees_reason() {
        let manager = manager();
        manager.close(Some(SubscriptionError::ConnectionFailure("refused".to_string())));

        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        manager.add_close_listener(move |reason| *slot.lock() = reason.cloned());

        assert_eq!(
            *seen.lock(),
            Some(SubscriptionError::ConnectionFailure("refused".to_string()))
        );
    }

    #[test]
    fn closed_manager_cannot_open() {
        struct Unused;
        impl Connector for Unused {
            type Connection = NeverConnection;
            async fn connect(&self) -> std::result::Result<NeverConnection, ProtocolError> {
                Err(ProtocolError::ConnectionFailed("unused".to_string()))
            }
        }
        struct NeverConnection;
        impl Connection for NeverConnection {
            async fn send(&mut self, _frame: Vec<u8>) -> std::result::Result<(), ProtocolError> {
                Ok(())
            }
            async fn recv(&mut self) -> std::result::Result<Option<Vec<u8>>, ProtocolError> {
                Ok(None)
            }
            async fn close(&mut self) -> std::result::Result<(), ProtocolError> {
                Ok(())
            }
        }

        let manager = manager();
        manager.close(None);
        assert!(matches!(manager.open(Unused, |_| {}), Err(Error::NotOpen)));
    }
}
