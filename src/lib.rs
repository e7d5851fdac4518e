// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `missionlink` - A Rust client for mission control servers.
//!
//! The library speaks the server's WebSocket subscription protocol:
//! protobuf envelopes in binary frames, one topic per connection. Each
//! subscription runs on its own receiver thread, decodes inbound frames into
//! typed values, keeps the latest state of every key in a cache and hands
//! each update to a user callback.
//!
//! # Supported Topics
//!
//! - **Parameters**: telemetry values, with live add/remove of items
//! - **Command history**: acknowledgments and completion of issued commands
//! - **Alarms**, **links**, **containers**, **events** and **mission time**
//! - **File transfers** and **remote file listings**
//! - Any other topic through [`MissionClient::subscribe`]
//!
//! # Quick Start
//!
//! ```no_run
//! use missionlink::{AddOptions, ClientConfig, MissionClient, Subscription};
//!
//! fn main() -> missionlink::Result<()> {
//!     let client = MissionClient::new(
//!         ClientConfig::new("localhost:8090").with_token("s3cr3t"),
//!     )?;
//!     let processor = client.processor("simulator", "realtime");
//!
//!     // Blocks until the server acknowledged the subscription
//!     let telemetry = processor.create_parameter_subscription(
//!         ["/YSS/SIMULATOR/BatteryVoltage1", "/YSS/SIMULATOR/Altitude"],
//!         AddOptions::default(),
//!         |data| {
//!             for value in data.parameters() {
//!                 println!("{} = {:?}", value.name(), value.eng_value());
//!             }
//!         },
//!     )?;
//!
//!     // Extend the subscription without reconnecting
//!     telemetry.add(["/YSS/SIMULATOR/Heading"], AddOptions::default())?;
//!
//!     std::thread::sleep(std::time::Duration::from_secs(10));
//!     if let Some(value) = telemetry.get_value("/YSS/SIMULATOR/Altitude") {
//!         println!("latest altitude: {:?}", value.eng_value());
//!     }
//!
//!     telemetry.cancel();
//!     Ok(())
//! }
//! ```
//!
//! ## Command History
//!
//! ```no_run
//! use missionlink::{ClientConfig, MissionClient};
//!
//! # fn example() -> missionlink::Result<()> {
//! let client = MissionClient::new(ClientConfig::new("localhost:8090"))?;
//! let history = client
//!     .processor("simulator", "realtime")
//!     .create_command_history_subscription(true, |command| {
//!         if command.is_complete() {
//!             println!("{} finished, success: {}", command.name(), command.is_success());
//!         }
//!     })?;
//!
//! for command in history.list_commands() {
//!     for ack in command.acknowledgments() {
//!         println!("{}: {} {}", command.id(), ack.name, ack.status);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! Callbacks run on the subscription's receiver thread, in arrival order.
//! A callback that blocks stalls its subscription. Cache accessors may be
//! called from any thread at any time. Dropping a subscription handle does
//! not close it; call [`Subscription::cancel`].

pub mod client;
pub mod config;
pub mod error;
pub mod future;
pub mod proto;
pub mod protocol;
pub mod subscription;
pub mod types;

pub use client::{MissionClient, ProcessorClient};
pub use config::ClientConfig;
pub use error::{
    ConfigError, Error, ParseError, ProtocolError, Result, ServerException, SubscriptionError,
};
pub use future::Promise;
pub use protocol::{SequenceGenerator, Topic, WebSocketConnector};
pub use subscription::{
    AddOptions, AlarmSubscription, CommandHistorySubscription, ContainerSubscription,
    EventSubscription, FileListSubscription, LinkSubscription, LinkUpdate, ParameterSubscription,
    Subscription, SubscriptionFuture, TimeSubscription, TransferSubscription,
};
pub use types::{
    Acknowledgment, Alarm, CommandHistory, Container, Event, FileTransfer, Link, ParameterData,
    ParameterId, ParameterValue, RemoteFile, RemoteFileListing, Value,
};
