// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol and transports.
//!
//! - [`codec`]: client and server frame envelopes, topics and request ids
//! - [`transport`]: the [`Connector`]/[`Connection`] seam and its WebSocket
//!   implementation
//! - [`manager`]: one WebSocket call, its receiver thread and lifecycle
//! - [`framing`]: length-delimited protobuf bodies
//! - [`HttpSession`]: authenticated HTTP access (feature `http`)

pub mod codec;
pub mod framing;
#[cfg(feature = "http")]
mod http;
pub mod manager;
pub mod transport;

pub use codec::{Envelope, SequenceGenerator, Topic};
#[cfg(feature = "http")]
pub use http::HttpSession;
pub use manager::{ManagerState, SubscriptionManager};
pub use transport::{Connection, Connector, WebSocketConnection, WebSocketConnector};
