// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protobuf wire contract spoken by the mission control server.
//!
//! These messages mirror the server's schema field for field. They are plain
//! `prost` structs with no behaviour of their own: decoding them into the
//! richer domain types in [`crate::types`] happens in the subscription
//! modules.
//!
//! Payloads travel inside [`prost_types::Any`] envelopes. Every message that
//! can appear in an `Any` implements [`prost::Name`] so it can be packed with
//! [`pack`] and checked with [`unpack`].

mod alarm;
mod command;
mod common;
mod container;
mod envelope;
mod event;
mod filetransfer;
mod link;
mod parameter;
mod time;

pub use alarm::{
    AcknowledgeInfo, AlarmData, AlarmNotificationType, AlarmSeverity, AlarmType,
    SubscribeAlarmsRequest,
};
pub use command::{CommandHistoryAttribute, CommandHistoryEntry, SubscribeCommandsRequest};
pub use common::{AggregateValue, NamedObjectId, Value, ValueType};
pub use container::{ContainerData, SubscribeContainersRequest};
pub use envelope::{CancelOptions, ClientMessage, ExceptionMessage, Reply, ServerMessage};
pub use event::{Event, EventSeverity, SubscribeEventsRequest};
pub use filetransfer::{
    ListFilesResponse, RemoteFile, SubscribeFileListRequest, SubscribeTransfersRequest,
    TransferDirection, TransferInfo, TransferState,
};
pub use link::{LinkEvent, LinkEventType, LinkInfo, SubscribeLinksRequest};
pub use parameter::{
    AcquisitionStatus, MonitoringResult, ParameterValue, SubscribeParametersData,
    SubscribeParametersRequest, SubscriptionAction,
};
pub use prost_types::{Any, Timestamp};
pub use time::{SubscribeTimeRequest, TimeInfo};

use prost::{Message, Name};

use crate::error::{ParseError, ProtocolError};

/// Package under which all messages of this contract are registered.
pub(crate) const PACKAGE: &str = "mission.api";

/// Implements [`prost::Name`] for messages of this contract.
macro_rules! impl_name {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl ::prost::Name for $ty {
                const NAME: &'static str = stringify!($ty);
                const PACKAGE: &'static str = $crate::proto::PACKAGE;
            }
        )+
    };
}
pub(crate) use impl_name;

/// Packs a message into an `Any` envelope.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if the message cannot be serialized.
pub fn pack<M: Name>(message: &M) -> Result<Any, ProtocolError> {
    Any::from_msg(message).map_err(ProtocolError::Encode)
}

/// Unpacks an `Any` envelope into the expected message type.
///
/// Only the last path segment of the type URL is compared, so both
/// `type.googleapis.com/pkg.Msg` and `/pkg.Msg` are accepted.
///
/// # Errors
///
/// Returns [`ParseError::UnexpectedPayload`] when the envelope holds another
/// type and [`ParseError::Decode`] when the bytes are malformed.
pub fn unpack<M: Message + Name + Default>(any: &Any) -> Result<M, ParseError> {
    let actual = any.type_url.rsplit('/').next().unwrap_or_default();
    let expected = M::full_name();
    if actual != expected {
        return Err(ParseError::UnexpectedPayload {
            expected,
            actual: actual.to_string(),
        });
    }
    Ok(M::decode(any.value.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack_reply() {
        let reply = Reply {
            reply_to: 7,
            exception: None,
        };
        let any = pack(&reply).unwrap();
        assert!(any.type_url.ends_with("mission.api.Reply"));

        let decoded: Reply = unpack(&any).unwrap();
        assert_eq!(decoded.reply_to, 7);
    }

    #[test]
    fn unpack_accepts_google_type_prefix() {
        let id = NamedObjectId {
            name: "/YSS/SIMULATOR/BatteryVoltage2".to_string(),
            namespace: None,
        };
        let mut any = pack(&id).unwrap();
        any.type_url = "type.googleapis.com/mission.api.NamedObjectId".to_string();

        let decoded: NamedObjectId = unpack(&any).unwrap();
        assert_eq!(decoded.name, "/YSS/SIMULATOR/BatteryVoltage2");
    }

    #[test]
    fn unpack_rejects_other_type() {
        let any = pack(&Reply::default()).unwrap();
        let err = unpack::<LinkEvent>(&any).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedPayload { .. }));
    }
}
