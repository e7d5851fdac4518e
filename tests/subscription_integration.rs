// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests driving subscriptions against a scripted server.
//!
//! Each client gets its own sequence starting at 1, so the initial request
//! of the first subscription always has id 1 and its reply can be queued
//! before the subscription is created.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use common::{ScriptedConnector, ServerSide, TIMEOUT, data, error_reply, exception, reply};
use missionlink::proto::{
    self, AlarmData, CommandHistoryAttribute, CommandHistoryEntry, LinkEvent, LinkEventType,
    LinkInfo, NamedObjectId, SubscribeLinksRequest, SubscribeParametersData,
    SubscribeParametersRequest, SubscriptionAction, TimeInfo, Timestamp, ValueType,
};
use missionlink::protocol::{ManagerState, SubscriptionManager};
use missionlink::{
    AddOptions, ClientConfig, Error, MissionClient, SequenceGenerator, Subscription,
    SubscriptionError, SubscriptionFuture, Topic, Value,
};

const CALL: i32 = 7;

// Activities have no typed subscription and are reached through the generic
// `subscribe`. Listing them over REST is not exposed here; when it is,
// `descending == false` must request `order=asc`. One upstream client
// variant always sends `desc`, which is a bug and not a behaviour to match.
fn client(connector: &ScriptedConnector) -> MissionClient<ScriptedConnector> {
    let config = ClientConfig::new("localhost:8090").with_reply_timeout(TIMEOUT);
    MissionClient::with_connector(config, connector.clone())
        .unwrap()
        .with_sequence(Arc::new(SequenceGenerator::new()))
}

/// Queues a connection whose initial request is acknowledged with [`CALL`].
fn acknowledged(connector: &ScriptedConnector) -> ServerSide {
    let server = connector.accept();
    server.push(reply(CALL, SequenceGenerator::INITIAL));
    server
}

fn named(name: &str) -> NamedObjectId {
    NamedObjectId {
        name: name.to_string(),
        namespace: None,
    }
}

fn string_value(text: &str) -> proto::Value {
    proto::Value {
        r#type: ValueType::String as i32,
        string_value: text.to_string(),
        ..Default::default()
    }
}

fn double_value(value: f64) -> proto::Value {
    proto::Value {
        r#type: ValueType::Double as i32,
        double_value: value,
        ..Default::default()
    }
}

// ============================================================================
// Handshake
// ============================================================================

mod handshake {
    use super::*;

    #[test]
    fn initial_frame_carries_topic_and_options() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);

        let links = client(&connector)
            .create_link_subscription("simulator", |_| {})
            .unwrap();

        let initial = server.next_frame();
        assert_eq!(initial.r#type, "links");
        assert_eq!(initial.id, 1);
        assert_eq!(initial.call, 0);
        let options: SubscribeLinksRequest =
            proto::unpack(initial.options.as_ref().unwrap()).unwrap();
        assert_eq!(options.instance, "simulator");

        assert_eq!(links.future().manager().call(), Some(CALL));
        assert!(links.is_open());
        links.cancel();
    }

    #[test]
    fn error_reply_fails_with_server_exception() {
        let connector = ScriptedConnector::new();
        let server = connector.accept();
        server.push(error_reply(1, 404, "No such instance"));

        let err = client(&connector)
            .create_link_subscription("nope", |_| {})
            .unwrap_err();

        match err {
            Error::Subscription(SubscriptionError::Server(exc)) => {
                assert_eq!(exc.code, 404);
                assert_eq!(exc.message, "No such instance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn refused_connection_fails_with_connection_failure() {
        let connector = ScriptedConnector::new();
        connector.refuse("connection refused");

        let err = client(&connector)
            .create_event_subscription("simulator", |_| {})
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Subscription(SubscriptionError::ConnectionFailure(reason))
                if reason == "connection refused"
        ));
    }

    #[test]
    fn missing_reply_times_out_and_cancels() {
        let connector = ScriptedConnector::new();
        let server = connector.accept();
        let config = ClientConfig::new("localhost:8090")
            .with_reply_timeout(Duration::from_millis(100));
        let client = MissionClient::with_connector(config, connector.clone())
            .unwrap()
            .with_sequence(Arc::new(SequenceGenerator::new()));

        let err = client
            .create_link_subscription("simulator", |_| {})
            .unwrap_err();
        assert!(err.is_timeout());

        let initial = server.next_frame();
        assert_eq!(initial.r#type, "links");
        assert!(server.is_disconnected(TIMEOUT));
    }

    #[test]
    fn graceful_close_before_reply_resolves_true() {
        let connector = ScriptedConnector::new();
        let server = connector.accept();
        let options = proto::pack(&SubscribeLinksRequest::default()).unwrap();
        let manager = SubscriptionManager::new(
            Topic::LINKS,
            options,
            Arc::new(SequenceGenerator::new()),
        );
        let future = SubscriptionFuture::open(manager.clone(), connector, |_| {}).unwrap();

        server.next_frame();
        manager.close(None);

        assert!(future.reply(Some(TIMEOUT)).unwrap());
        assert_eq!(future.exception(Some(TIMEOUT)).unwrap(), None);
        assert_eq!(manager.state(), ManagerState::Closed);
    }

    #[test]
    fn cancel_before_reply_reports_cancelled() {
        let connector = ScriptedConnector::new();
        let server = connector.accept();
        let options = proto::pack(&SubscribeLinksRequest::default()).unwrap();
        let manager = SubscriptionManager::new(
            Topic::LINKS,
            options,
            Arc::new(SequenceGenerator::new()),
        );
        let future = SubscriptionFuture::open(manager, connector, |_| {}).unwrap();
        server.next_frame();

        assert!(future.cancel());
        assert!(future.cancelled());
        assert!(matches!(
            future.reply(Some(TIMEOUT)),
            Err(Error::Subscription(SubscriptionError::Cancelled))
        ));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn concurrent_cancel_tears_down_once() {
        let connector = ScriptedConnector::new();
        let _server = acknowledged(&connector);
        let links = client(&connector)
            .create_link_subscription("simulator", |_| {})
            .unwrap();

        let closes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closes);
        links.future().manager().add_close_listener(move |reason| {
            assert!(reason.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let links = links.clone();
                thread::spawn(move || {
                    links.cancel();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(links.future().manager().state(), ManagerState::Closed);
        assert!(!links.is_open());
    }

    #[test]
    fn server_exception_closes_subscription() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let links = client(&connector)
            .create_link_subscription("simulator", |_| {})
            .unwrap();

        let (tx, rx) = mpsc::channel();
        links
            .future()
            .manager()
            .add_close_listener(move |reason| tx.send(reason.cloned()).unwrap());

        server.push(exception(CALL, 500, "processor stopped"));

        let reason = rx.recv_timeout(TIMEOUT).unwrap();
        assert!(matches!(
            reason,
            Some(SubscriptionError::Server(exc)) if exc.message == "processor stopped"
        ));
        // The acknowledgment already resolved; the close does not change it
        assert!(links.reply(Some(TIMEOUT)).unwrap());
    }

    #[test]
    fn server_hang_up_is_a_connection_failure() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let time = client(&connector)
            .create_time_subscription("simulator", |_| {})
            .unwrap();

        let (tx, rx) = mpsc::channel();
        time.future()
            .manager()
            .add_close_listener(move |reason| tx.send(reason.cloned()).unwrap());
        server.hang_up();

        let reason = rx.recv_timeout(TIMEOUT).unwrap();
        assert!(matches!(reason, Some(SubscriptionError::ConnectionFailure(_))));
    }

    #[test]
    fn send_after_close_is_rejected() {
        let connector = ScriptedConnector::new();
        let _server = acknowledged(&connector);
        let parameters = client(&connector)
            .processor("simulator", "realtime")
            .create_parameter_subscription(["/a"], AddOptions::default(), |_| {})
            .unwrap();

        parameters.cancel();
        assert!(matches!(
            parameters.add(["/b"], AddOptions::default()),
            Err(Error::NotOpen)
        ));
    }
}

// ============================================================================
// Parameters
// ============================================================================

mod parameters {
    use super::*;

    fn values(entries: &[(u32, f64)]) -> Vec<proto::ParameterValue> {
        entries
            .iter()
            .map(|(numeric_id, value)| proto::ParameterValue {
                numeric_id: *numeric_id,
                eng_value: Some(double_value(*value)),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn batches_arrive_in_order_and_refresh_cache() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();

        let parameters = client(&connector)
            .processor("simulator", "realtime")
            .create_parameter_subscription(
                ["/YSS/SIMULATOR/Alpha", "/YSS/SIMULATOR/Beta"],
                AddOptions::default(),
                move |batch| tx.send(batch).unwrap(),
            )
            .unwrap();

        let initial = server.next_frame();
        let request: SubscribeParametersRequest =
            proto::unpack(initial.options.as_ref().unwrap()).unwrap();
        assert_eq!(request.id.len(), 2);
        assert_eq!(request.processor, "realtime");

        let mapping: HashMap<u32, NamedObjectId> = [
            (1, named("/YSS/SIMULATOR/Alpha")),
            (2, named("/YSS/SIMULATOR/Beta")),
        ]
        .into_iter()
        .collect();
        server.push(data(
            "parameters",
            CALL,
            1,
            &SubscribeParametersData {
                mapping,
                values: values(&[(1, 1.0), (2, 2.0)]),
                invalid: Vec::new(),
            },
        ));
        for seq in 2..=10 {
            server.push(data(
                "parameters",
                CALL,
                seq,
                &SubscribeParametersData {
                    values: values(&[(1, f64::from(seq))]),
                    ..Default::default()
                },
            ));
        }

        let first = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(first.len(), 2);
        for seq in 2..=10 {
            let batch = rx.recv_timeout(TIMEOUT).unwrap();
            let value = &batch.parameters()[0];
            assert_eq!(value.name(), "/YSS/SIMULATOR/Alpha");
            assert_eq!(value.eng_value(), Some(&Value::Double(f64::from(seq))));
        }

        assert_eq!(parameters.delivery_count(), 10);
        let alpha = parameters.get_value("/YSS/SIMULATOR/Alpha").unwrap();
        assert_eq!(alpha.eng_value(), Some(&Value::Double(10.0)));
        let beta = parameters.get_value("/YSS/SIMULATOR/Beta").unwrap();
        assert_eq!(beta.eng_value(), Some(&Value::Double(2.0)));
        parameters.cancel();
    }

    #[test]
    fn control_frames_carry_call_id() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let parameters = client(&connector)
            .processor("simulator", "realtime")
            .create_parameter_subscription(["/a"], AddOptions::default(), |_| {})
            .unwrap();
        server.next_frame();

        parameters
            .add(["/b", "/c"], AddOptions::default().with_send_from_cache(false))
            .unwrap();
        let add = server.next_frame();
        assert_eq!(add.r#type, "parameters");
        assert_eq!(add.call, CALL);
        assert_eq!(add.id, 2);
        let request: SubscribeParametersRequest =
            proto::unpack(add.options.as_ref().unwrap()).unwrap();
        assert_eq!(request.action(), SubscriptionAction::Add);
        assert_eq!(request.send_from_cache, Some(false));

        parameters.remove(["/a"]).unwrap();
        let remove = server.next_frame();
        assert_eq!(remove.call, CALL);
        let request: SubscribeParametersRequest =
            proto::unpack(remove.options.as_ref().unwrap()).unwrap();
        assert_eq!(request.action(), SubscriptionAction::Remove);

        let mut items: Vec<String> = parameters
            .items()
            .iter()
            .map(|id| id.name().to_string())
            .collect();
        items.sort();
        assert_eq!(items, vec!["/b", "/c"]);
        parameters.cancel();
    }

    #[test]
    fn invalid_ids_are_tracked() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let parameters = client(&connector)
            .processor("simulator", "realtime")
            .create_parameter_subscription(
                ["/a", "/missing"],
                AddOptions::default().with_abort_on_invalid(false),
                move |batch| tx.send(batch).unwrap(),
            )
            .unwrap();

        server.push(data(
            "parameters",
            CALL,
            1,
            &SubscribeParametersData {
                mapping: [(1, named("/a"))].into_iter().collect(),
                values: values(&[(1, 3.5)]),
                invalid: vec![named("/missing")],
            },
        ));
        rx.recv_timeout(TIMEOUT).unwrap();

        let invalid = parameters.invalid_ids();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].name(), "/missing");
        parameters.cancel();
    }

    #[test]
    fn data_of_another_call_is_ignored() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let parameters = client(&connector)
            .processor("simulator", "realtime")
            .create_parameter_subscription(["/a"], AddOptions::default(), move |batch| {
                tx.send(batch).unwrap();
            })
            .unwrap();

        let frame = |value| SubscribeParametersData {
            mapping: [(1, named("/a"))].into_iter().collect(),
            values: values(&[(1, value)]),
            invalid: Vec::new(),
        };
        server.push(data("parameters", CALL + 1, 1, &frame(99.0)));
        server.push(data("parameters", CALL, 1, &frame(1.0)));

        let batch = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(batch.parameters()[0].eng_value(), Some(&Value::Double(1.0)));
        assert_eq!(parameters.delivery_count(), 1);
        parameters.cancel();
    }
}

// ============================================================================
// Typed caches
// ============================================================================

mod caches {
    use super::*;

    fn entry(id: &str, attributes: &[(&str, &str)]) -> CommandHistoryEntry {
        CommandHistoryEntry {
            id: id.to_string(),
            command_name: "/YSS/SIMULATOR/SWITCH_VOLTAGE_ON".to_string(),
            attr: attributes
                .iter()
                .map(|(name, value)| CommandHistoryAttribute {
                    name: (*name).to_string(),
                    value: Some(string_value(value)),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn command_history_unions_attributes() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let history = client(&connector)
            .processor("simulator", "realtime")
            .create_command_history_subscription(false, move |command| {
                tx.send(command).unwrap();
            })
            .unwrap();

        server.push(data(
            "commands",
            CALL,
            1,
            &entry("cmd-1", &[("Acknowledge_Queued_Status", "OK")]),
        ));
        server.push(data(
            "commands",
            CALL,
            2,
            &entry(
                "cmd-1",
                &[
                    ("Acknowledge_Released_Status", "OK"),
                    ("CommandComplete_Status", "OK"),
                ],
            ),
        ));
        rx.recv_timeout(TIMEOUT).unwrap();
        let latest = rx.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(latest.attributes().len(), 3);
        assert!(latest.is_complete());
        assert!(latest.is_success());

        let cached = history.get_command("cmd-1").unwrap();
        assert_eq!(cached.attributes().len(), 3);
        assert_eq!(history.list_commands().len(), 1);
        history.cancel();
    }

    #[test]
    fn cleared_alarm_is_evicted() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let alarms = client(&connector)
            .processor("simulator", "realtime")
            .create_alarm_subscription(move |alarm| tx.send(alarm).unwrap())
            .unwrap();

        let alarm = |process_ok, triggered, acknowledged| AlarmData {
            id: Some(named("/YSS/SIMULATOR/O2")),
            process_ok,
            triggered,
            acknowledged,
            ..Default::default()
        };

        server.push(data("alarms", CALL, 1, &alarm(false, true, false)));
        rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(alarms.list_alarms().len(), 1);

        server.push(data("alarms", CALL, 2, &alarm(true, false, true)));
        let cleared = rx.recv_timeout(TIMEOUT).unwrap();
        assert!(cleared.is_cleared());
        assert!(alarms.get_alarm("/YSS/SIMULATOR/O2").is_none());
        alarms.cancel();
    }

    #[test]
    fn unregistered_link_is_removed() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let links = client(&connector)
            .create_link_subscription("simulator", move |update| tx.send(update).unwrap())
            .unwrap();

        let event = |kind: LinkEventType, name: &str| LinkEvent {
            r#type: kind as i32,
            link_info: Some(LinkInfo {
                name: name.to_string(),
                status: "OK".to_string(),
                ..Default::default()
            }),
        };

        server.push(data("links", CALL, 1, &event(LinkEventType::Registered, "tm-in")));
        server.push(data("links", CALL, 2, &event(LinkEventType::Registered, "tc-out")));
        server.push(data("links", CALL, 3, &event(LinkEventType::Unregistered, "tm-in")));
        for _ in 0..3 {
            rx.recv_timeout(TIMEOUT).unwrap();
        }

        let names: Vec<String> = links
            .list_links()
            .iter()
            .map(|link| link.name().to_string())
            .collect();
        assert_eq!(names, vec!["tc-out"]);
        links.cancel();
    }

    #[test]
    fn time_subscription_keeps_latest() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let time = client(&connector)
            .processor("simulator", "realtime")
            .create_time_subscription(move |t| tx.send(t).unwrap())
            .unwrap();

        server.push(data(
            "time",
            CALL,
            1,
            &TimeInfo {
                current_time: Some(Timestamp {
                    seconds: 1_700_000_000,
                    nanos: 0,
                }),
            },
        ));
        let received = rx.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(received.timestamp(), 1_700_000_000);
        assert_eq!(time.time(), Some(received));
        time.cancel();
    }

    #[test]
    fn undecodable_payload_is_skipped() {
        let connector = ScriptedConnector::new();
        let server = acknowledged(&connector);
        let (tx, rx) = mpsc::channel();
        let time = client(&connector)
            .create_time_subscription("simulator", move |t| tx.send(t).unwrap())
            .unwrap();

        // A link event on the time topic is not a TimeInfo
        server.push(data("time", CALL, 1, &LinkEvent::default()));
        server.push(data(
            "time",
            CALL,
            2,
            &TimeInfo {
                current_time: Some(Timestamp {
                    seconds: 42,
                    nanos: 0,
                }),
            },
        ));

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().timestamp(), 42);
        assert!(time.is_open());
        time.cancel();
    }
}
