// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed subscriptions and their latest-state caches.
//!
//! Each subscription kind couples a [`SubscriptionFuture`] with a decoder
//! implementing [`FrameHandler`]. The decoder runs on the receiver thread:
//! it turns each data frame into domain types, merges them into the
//! subscription's cache and yields the value passed to the user callback.
//! Caches are readable from any thread while frames keep arriving.
//!
//! # Kinds
//!
//! - [`ParameterSubscription`] - Telemetry values, with live add/remove
//! - [`CommandHistorySubscription`] - Accumulated command history
//! - [`LinkSubscription`] - Data link state
//! - [`AlarmSubscription`] - Active alarms
//! - [`TransferSubscription`] - File transfer progress
//! - [`FileListSubscription`] - Remote directory listings
//! - [`ContainerSubscription`] - Latest packet per container
//! - [`TimeSubscription`] - Mission time
//! - [`EventSubscription`] - Mission events
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use missionlink::{ClientConfig, MissionClient, Subscription};
//!
//! # fn example() -> missionlink::Result<()> {
//! let client = MissionClient::new(ClientConfig::new("localhost:8090"))?;
//! let links = client.create_link_subscription("simulator", |update| {
//!     println!("{} is {}", update.link.name(), update.link.status());
//! })?;
//!
//! std::thread::sleep(Duration::from_secs(5));
//! for link in links.list_links() {
//!     println!("{}: {} in / {} out", link.name(), link.data_in_count(), link.data_out_count());
//! }
//! links.cancel();
//! # Ok(())
//! # }
//! ```

mod alarm;
mod cache;
mod command_history;
mod container;
mod event;
mod future;
mod link;
mod parameter;
mod time;
mod transfer;

pub use alarm::AlarmSubscription;
pub use cache::KeyedCache;
pub use command_history::CommandHistorySubscription;
pub use container::ContainerSubscription;
pub use event::EventSubscription;
pub use future::SubscriptionFuture;
pub use link::{LinkSubscription, LinkUpdate};
pub use parameter::{AddOptions, ParameterSubscription};
pub use time::TimeSubscription;
pub use transfer::{FileListSubscription, TransferSubscription};

use std::sync::Arc;
use std::time::Duration;

use prost::Name;

use crate::error::{ParseError, Result, SubscriptionError};
use crate::proto;
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::manager::SubscriptionManager;
use crate::protocol::transport::Connector;

/// Decoding and merge step of one subscription kind.
///
/// Called on the receiver thread for every data frame of the call.
pub trait FrameHandler: Send + Sync + 'static {
    /// Value passed to the user callback.
    type Output;

    /// Decodes `frame` and merges it into the cache.
    ///
    /// Returns `Ok(None)` when the frame produced nothing to report.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the payload cannot be decoded. The frame
    /// is then skipped; the call stays open.
    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<Self::Output>, ParseError>;
}

/// Operations shared by every subscription.
pub trait Subscription {
    /// Returns the underlying call.
    fn future(&self) -> &SubscriptionFuture;

    /// Blocks until the server acknowledged the subscription.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionFuture::reply`].
    fn reply(&self, timeout: Option<Duration>) -> Result<bool> {
        self.future().reply(timeout)
    }

    /// Blocks until the call resolved and returns its error, if any.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionFuture::exception`].
    fn exception(&self, timeout: Option<Duration>) -> Result<Option<SubscriptionError>> {
        self.future().exception(timeout)
    }

    /// Closes the subscription. Cached state stays readable.
    fn cancel(&self) -> bool {
        self.future().cancel()
    }

    /// Returns `true` once the acknowledgment resolved.
    fn done(&self) -> bool {
        self.future().done()
    }

    /// Returns `true` while frames are being received.
    fn is_open(&self) -> bool {
        self.future().manager().is_open()
    }
}

impl Subscription for SubscriptionFuture {
    fn future(&self) -> &SubscriptionFuture {
        self
    }
}

/// Opens a call on `topic` whose data frames go through `handler`.
pub(crate) fn start<M, C, H, F>(
    topic: Topic,
    request: &M,
    connector: C,
    sequence: Arc<SequenceGenerator>,
    handler: Arc<H>,
    mut on_data: F,
) -> Result<SubscriptionFuture>
where
    M: Name,
    C: Connector,
    H: FrameHandler,
    F: FnMut(H::Output) + Send + 'static,
{
    let manager = SubscriptionManager::new(topic.clone(), proto::pack(request)?, sequence);

    SubscriptionFuture::open(manager, connector, move |frame| {
        match handler.handle(frame) {
            Ok(Some(output)) => on_data(output),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(topic = %topic, seq = frame.seq, error = %err, "Skipping undecodable payload");
            }
        }
    })
}
