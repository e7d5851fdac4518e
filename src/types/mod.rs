// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain types delivered by subscriptions.
//!
//! These are the decoded, owned counterparts of the wire messages in
//! [`crate::proto`]. Typed subscriptions store them in their caches behind
//! [`Arc`](std::sync::Arc) so snapshots can be handed to caller threads
//! without copying.
//!
//! # Types
//!
//! - [`Value`] - Engineering or raw value of a parameter or attribute
//! - [`ParameterId`], [`ParameterValue`], [`ParameterData`] - Telemetry
//! - [`CommandHistory`], [`Acknowledgment`] - Progress of issued commands
//! - [`Link`] - Data link state
//! - [`Alarm`] - Alarm state
//! - [`FileTransfer`], [`RemoteFileListing`] - File transfer service
//! - [`Container`] - Extracted packets
//! - [`Event`] - Mission events

mod alarm;
mod command;
mod container;
mod event;
mod link;
mod parameter;
mod transfer;
mod value;

pub use alarm::Alarm;
pub use command::{Acknowledgment, CommandHistory};
pub use container::Container;
pub use event::Event;
pub use link::Link;
pub use parameter::{ParameterData, ParameterId, ParameterValue};
pub use transfer::{FileTransfer, RemoteFile, RemoteFileListing};
pub use value::Value;

pub(crate) use value::to_datetime;
