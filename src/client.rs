// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client facade.
//!
//! [`MissionClient`] opens instance-level subscriptions (links, events,
//! time, file transfers); [`ProcessorClient`] opens the ones scoped to a
//! processor (parameters, command history, alarms, containers).
//!
//! Every `create_*` method blocks until the server acknowledged the
//! subscription or the configured reply timeout elapsed. On any failure the
//! subscription is cancelled before the error is returned, so a returned
//! subscription is always live.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use prost::Name;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::proto;
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::manager::SubscriptionManager;
use crate::protocol::transport::{Connector, WebSocketConnector};
use crate::subscription::{
    AddOptions, AlarmSubscription, CommandHistorySubscription, ContainerSubscription,
    EventSubscription, FileListSubscription, LinkSubscription, LinkUpdate, ParameterSubscription,
    Subscription, SubscriptionFuture, TimeSubscription, TransferSubscription,
};
use crate::types::{
    Alarm, CommandHistory, Container, Event, FileTransfer, ParameterData, ParameterId,
    RemoteFileListing,
};

#[cfg(feature = "http")]
use crate::protocol::HttpSession;

// ============================================================================
// MissionClient
// ============================================================================

/// Entry point for opening subscriptions against one server.
///
/// Cloning is cheap; clones share the configuration, the connector
/// settings and the request id sequence.
///
/// # Examples
///
/// ```no_run
/// use missionlink::{ClientConfig, MissionClient, Subscription};
///
/// # fn example() -> missionlink::Result<()> {
/// let client = MissionClient::new(
///     ClientConfig::new("localhost:8090").with_credentials("operator", "secret"),
/// )?;
///
/// let events = client.create_event_subscription("simulator", |event| {
///     println!("[{:?}] {}", event.severity(), event.message());
/// })?;
///
/// let processor = client.processor("simulator", "realtime");
/// let alarms = processor.create_alarm_subscription(|alarm| {
///     println!("{} triggered {} times", alarm.name(), alarm.count());
/// })?;
///
/// # events.cancel();
/// # alarms.cancel();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MissionClient<C = WebSocketConnector> {
    config: Arc<ClientConfig>,
    connector: C,
    sequence: Arc<SequenceGenerator>,
}

impl MissionClient<WebSocketConnector> {
    /// Creates a client connecting over WebSocket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let connector = WebSocketConnector::from_config(&config);
        Self::with_connector(config, connector)
    }
}

impl<C: Connector + Clone> MissionClient<C> {
    /// Creates a client that opens its connections through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid.
    pub fn with_connector(config: ClientConfig, connector: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            connector,
            sequence: SequenceGenerator::global(),
        })
    }

    /// Uses `sequence` for request ids instead of the process-wide one.
    #[must_use]
    pub fn with_sequence(mut self, sequence: Arc<SequenceGenerator>) -> Self {
        self.sequence = sequence;
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the request id sequence.
    #[must_use]
    pub fn sequence(&self) -> &Arc<SequenceGenerator> {
        &self.sequence
    }

    /// Creates an HTTP session with this client's credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Http`](crate::error::ProtocolError::Http)
    /// if the HTTP client cannot be built.
    #[cfg(feature = "http")]
    pub fn session(&self) -> Result<HttpSession> {
        Ok(HttpSession::new(&self.config)?)
    }

    /// Returns a client scoped to one processor of an instance.
    #[must_use]
    pub fn processor(
        &self,
        instance: impl Into<String>,
        processor: impl Into<String>,
    ) -> ProcessorClient<C> {
        ProcessorClient {
            client: self.clone(),
            instance: instance.into(),
            processor: processor.into(),
        }
    }

    /// Subscribes to the data links of an instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be opened or is not
    /// acknowledged within the reply timeout.
    pub fn create_link_subscription<F>(&self, instance: &str, on_data: F) -> Result<LinkSubscription>
    where
        F: FnMut(LinkUpdate) + Send + 'static,
    {
        let subscription =
            LinkSubscription::open(self.connector.clone(), self.sequence_handle(), instance, on_data)?;
        self.await_reply(subscription)
    }

    /// Subscribes to the events of an instance.
    ///
    /// # Errors
    ///
    /// Same as [`create_link_subscription`](Self::create_link_subscription).
    pub fn create_event_subscription<F>(&self, instance: &str, on_data: F) -> Result<EventSubscription>
    where
        F: FnMut(Event) + Send + 'static,
    {
        let subscription =
            EventSubscription::open(self.connector.clone(), self.sequence_handle(), instance, on_data)?;
        self.await_reply(subscription)
    }

    /// Subscribes to the mission time of an instance.
    ///
    /// # Errors
    ///
    /// Same as [`create_link_subscription`](Self::create_link_subscription).
    pub fn create_time_subscription<F>(&self, instance: &str, on_data: F) -> Result<TimeSubscription>
    where
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        let subscription = TimeSubscription::open(
            self.connector.clone(),
            self.sequence_handle(),
            instance,
            None,
            on_data,
        )?;
        self.await_reply(subscription)
    }

    /// Subscribes to the transfers of a file transfer service.
    ///
    /// With `ongoing_only`, the server does not replay finished transfers.
    ///
    /// # Errors
    ///
    /// Same as [`create_link_subscription`](Self::create_link_subscription).
    pub fn create_file_transfer_subscription<F>(
        &self,
        instance: &str,
        service: &str,
        ongoing_only: bool,
        on_data: F,
    ) -> Result<TransferSubscription>
    where
        F: FnMut(Arc<FileTransfer>) + Send + 'static,
    {
        let subscription = TransferSubscription::open(
            self.connector.clone(),
            self.sequence_handle(),
            instance,
            service,
            ongoing_only,
            on_data,
        )?;
        self.await_reply(subscription)
    }

    /// Subscribes to the remote directory listings of a file transfer
    /// service.
    ///
    /// # Errors
    ///
    /// Same as [`create_link_subscription`](Self::create_link_subscription).
    pub fn create_file_list_subscription<F>(
        &self,
        instance: &str,
        service: &str,
        on_data: F,
    ) -> Result<FileListSubscription>
    where
        F: FnMut(Arc<RemoteFileListing>) + Send + 'static,
    {
        let subscription = FileListSubscription::open(
            self.connector.clone(),
            self.sequence_handle(),
            instance,
            service,
            on_data,
        )?;
        self.await_reply(subscription)
    }

    /// Subscribes to any topic, handing undecoded data frames to `on_data`.
    ///
    /// Used for topics without a typed subscription, such as
    /// [`Topic::COP1`] or [`Topic::ACTIVITIES`].
    ///
    /// # Errors
    ///
    /// Same as [`create_link_subscription`](Self::create_link_subscription).
    pub fn subscribe<M, F>(&self, topic: Topic, request: &M, on_data: F) -> Result<SubscriptionFuture>
    where
        M: Name,
        F: FnMut(&DataFrame) + Send + 'static,
    {
        let options = proto::pack(request)?;
        let manager = SubscriptionManager::new(topic, options, self.sequence_handle());
        let future = SubscriptionFuture::open(manager, self.connector.clone(), on_data)?;
        self.await_reply(future)
    }

    fn sequence_handle(&self) -> Arc<SequenceGenerator> {
        Arc::clone(&self.sequence)
    }

    fn await_reply<S: Subscription>(&self, subscription: S) -> Result<S> {
        match subscription.reply(Some(self.config.reply_timeout())) {
            Ok(_) => Ok(subscription),
            Err(err) => {
                tracing::warn!(error = %err, "Subscription not acknowledged, cancelling");
                subscription.cancel();
                Err(err)
            }
        }
    }
}

// ============================================================================
// ProcessorClient
// ============================================================================

/// Client scoped to one processor of an instance.
///
/// Obtained from [`MissionClient::processor`].
#[derive(Debug, Clone)]
pub struct ProcessorClient<C = WebSocketConnector> {
    client: MissionClient<C>,
    instance: String,
    processor: String,
}

impl<C: Connector + Clone> ProcessorClient<C> {
    /// Returns the instance name.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Returns the processor name.
    #[must_use]
    pub fn processor(&self) -> &str {
        &self.processor
    }

    /// Subscribes to parameter values.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be opened or is not
    /// acknowledged within the reply timeout. With
    /// [`AddOptions::with_abort_on_invalid`] set, an unknown parameter is
    /// such a failure.
    pub fn create_parameter_subscription<I, F>(
        &self,
        ids: I,
        options: AddOptions,
        on_data: F,
    ) -> Result<ParameterSubscription>
    where
        I: IntoIterator,
        I::Item: Into<ParameterId>,
        F: FnMut(ParameterData) + Send + 'static,
    {
        let subscription = ParameterSubscription::open(
            self.client.connector.clone(),
            self.client.sequence_handle(),
            &self.instance,
            &self.processor,
            ids.into_iter().map(Into::into).collect(),
            options,
            on_data,
        )?;
        self.client.await_reply(subscription)
    }

    /// Subscribes to command history.
    ///
    /// With `ignore_past_commands`, only commands issued after the
    /// subscription are reported.
    ///
    /// # Errors
    ///
    /// Same as [`create_parameter_subscription`](Self::create_parameter_subscription).
    pub fn create_command_history_subscription<F>(
        &self,
        ignore_past_commands: bool,
        on_data: F,
    ) -> Result<CommandHistorySubscription>
    where
        F: FnMut(Arc<CommandHistory>) + Send + 'static,
    {
        let subscription = CommandHistorySubscription::open(
            self.client.connector.clone(),
            self.client.sequence_handle(),
            &self.instance,
            &self.processor,
            ignore_past_commands,
            on_data,
        )?;
        self.client.await_reply(subscription)
    }

    /// Subscribes to alarms.
    ///
    /// # Errors
    ///
    /// Same as [`create_parameter_subscription`](Self::create_parameter_subscription).
    pub fn create_alarm_subscription<F>(&self, on_data: F) -> Result<AlarmSubscription>
    where
        F: FnMut(Arc<Alarm>) + Send + 'static,
    {
        let subscription = AlarmSubscription::open(
            self.client.connector.clone(),
            self.client.sequence_handle(),
            &self.instance,
            &self.processor,
            on_data,
        )?;
        self.client.await_reply(subscription)
    }

    /// Subscribes to the packets of the named containers.
    ///
    /// # Errors
    ///
    /// Same as [`create_parameter_subscription`](Self::create_parameter_subscription).
    pub fn create_container_subscription<I, F>(
        &self,
        names: I,
        on_data: F,
    ) -> Result<ContainerSubscription>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        F: FnMut(Arc<Container>) + Send + 'static,
    {
        let subscription = ContainerSubscription::open(
            self.client.connector.clone(),
            self.client.sequence_handle(),
            &self.instance,
            &self.processor,
            names.into_iter().map(Into::into).collect(),
            on_data,
        )?;
        self.client.await_reply(subscription)
    }

    /// Subscribes to the mission time of this processor.
    ///
    /// # Errors
    ///
    /// Same as [`create_parameter_subscription`](Self::create_parameter_subscription).
    pub fn create_time_subscription<F>(&self, on_data: F) -> Result<TimeSubscription>
    where
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        let subscription = TimeSubscription::open(
            self.client.connector.clone(),
            self.client.sequence_handle(),
            &self.instance,
            Some(self.processor.as_str()),
            on_data,
        )?;
        self.client.await_reply(subscription)
    }
}
