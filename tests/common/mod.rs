// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory server used to drive subscriptions in tests.
//!
//! A [`ScriptedConnector`] hands out one queued connection per `connect`.
//! The test keeps the matching [`ServerSide`], pushes server frames into it
//! and reads back what the client wrote.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use missionlink::ProtocolError;
use missionlink::proto::{self, ClientMessage, ExceptionMessage, Reply, ServerMessage};
use missionlink::protocol::{Connection, Connector};
use prost::{Message, Name};
use tokio::sync::mpsc;

pub const TIMEOUT: Duration = Duration::from_secs(5);

enum Pending {
    Accept(ScriptedConnection),
    Refuse(String),
}

/// Connector returning scripted connections in the order they were queued.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pending: Arc<Mutex<VecDeque<Pending>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection and returns its server end.
    pub fn accept(&self) -> ServerSide {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = std_mpsc::channel();
        self.pending
            .lock()
            .unwrap()
            .push_back(Pending::Accept(ScriptedConnection {
                inbound: inbound_rx,
                outbound: outbound_tx,
            }));
        ServerSide {
            inbound: inbound_tx,
            outbound: outbound_rx,
        }
    }

    /// Queues a refused connection attempt.
    pub fn refuse(&self, reason: &str) {
        self.pending
            .lock()
            .unwrap()
            .push_back(Pending::Refuse(reason.to_string()));
    }
}

impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection, ProtocolError> {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some(Pending::Accept(connection)) => Ok(connection),
            Some(Pending::Refuse(reason)) => Err(ProtocolError::ConnectionFailed(reason)),
            None => Err(ProtocolError::ConnectionFailed(
                "no scripted connection".to_string(),
            )),
        }
    }
}

/// Client end of a scripted connection.
pub struct ScriptedConnection {
    inbound: mpsc::UnboundedReceiver<Option<Vec<u8>>>,
    outbound: std_mpsc::Sender<Vec<u8>>,
}

impl Connection for ScriptedConnection {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ProtocolError> {
        self.outbound
            .send(frame)
            .map_err(|_| ProtocolError::ConnectionFailed("server side dropped".to_string()))
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        Ok(self.inbound.recv().await.flatten())
    }

    async fn close(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Server end of a scripted connection.
pub struct ServerSide {
    inbound: mpsc::UnboundedSender<Option<Vec<u8>>>,
    outbound: std_mpsc::Receiver<Vec<u8>>,
}

impl ServerSide {
    /// Queues a frame for the client.
    pub fn push(&self, frame: Vec<u8>) {
        let _ = self.inbound.send(Some(frame));
    }

    /// Closes the connection from the server side.
    pub fn hang_up(&self) {
        let _ = self.inbound.send(None);
    }

    /// Waits for the next frame written by the client.
    pub fn next_frame(&self) -> ClientMessage {
        let bytes = self
            .outbound
            .recv_timeout(TIMEOUT)
            .expect("client did not send a frame");
        ClientMessage::decode(bytes.as_slice()).expect("client frame is not a ClientMessage")
    }

    /// Returns `true` if the client wrote nothing within `wait`.
    pub fn is_quiet(&self, wait: Duration) -> bool {
        self.outbound.recv_timeout(wait).is_err()
    }

    /// Returns `true` once the client dropped its end of the connection,
    /// discarding any frames it wrote before.
    pub fn is_disconnected(&self, wait: Duration) -> bool {
        loop {
            match self.outbound.recv_timeout(wait) {
                Ok(_) => {}
                Err(std_mpsc::RecvTimeoutError::Disconnected) => return true,
                Err(std_mpsc::RecvTimeoutError::Timeout) => return false,
            }
        }
    }
}

// ============================================================================
// Server frames
// ============================================================================

pub fn reply(call: i32, reply_to: i32) -> Vec<u8> {
    server_message(
        "reply",
        call,
        0,
        &Reply {
            reply_to,
            exception: None,
        },
    )
}

pub fn error_reply(reply_to: i32, code: i32, msg: &str) -> Vec<u8> {
    server_message(
        "reply",
        0,
        0,
        &Reply {
            reply_to,
            exception: Some(ExceptionMessage {
                code,
                r#type: "NotFoundException".to_string(),
                msg: msg.to_string(),
            }),
        },
    )
}

pub fn exception(call: i32, code: i32, msg: &str) -> Vec<u8> {
    server_message(
        "exception",
        call,
        0,
        &ExceptionMessage {
            code,
            r#type: "InternalServerErrorException".to_string(),
            msg: msg.to_string(),
        },
    )
}

pub fn data<M: Name>(topic: &str, call: i32, seq: i32, payload: &M) -> Vec<u8> {
    server_message(topic, call, seq, payload)
}

fn server_message<M: Name>(kind: &str, call: i32, seq: i32, payload: &M) -> Vec<u8> {
    ServerMessage {
        r#type: kind.to_string(),
        call,
        seq,
        data: Some(proto::pack(payload).unwrap()),
    }
    .encode_to_vec()
}
