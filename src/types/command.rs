// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command history snapshots.
//!
//! The server reports the progress of an issued command as a growing set of
//! attributes. Verifier stages follow a naming convention: a stage `X`
//! publishes `X_Status`, `X_Time` and, on failure, `X_Message`. Completion is
//! reported by the special `CommandComplete` stage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::value::{Value, to_datetime};
use crate::proto;

/// Name of the stage that reports final completion.
const COMPLETION_STAGE: &str = "CommandComplete";

/// Attribute set when the command failed before reaching any verifier.
const COMMAND_FAILED: &str = "CommandFailed";

/// A snapshot of the history of one issued command.
///
/// Snapshots are immutable: each update received by a subscription produces
/// a new snapshot holding the union of all attributes seen so far.
///
/// # Examples
///
/// ```
/// use missionlink::types::{CommandHistory, Value};
///
/// let history = CommandHistory::new("cmd-1", "/YSS/SIMULATOR/SWITCH_VOLTAGE_ON")
///     .with_attribute("CommandComplete_Status", Value::String("OK".to_string()));
///
/// assert!(history.is_complete());
/// assert!(history.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandHistory {
    id: String,
    name: String,
    origin: String,
    sequence_number: i32,
    generation_time: Option<DateTime<Utc>>,
    attributes: BTreeMap<String, Value>,
}

/// Progress of one verifier stage of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgment {
    /// Stage name, e.g. `Acknowledge_Queued`.
    pub name: String,
    /// Reported status, e.g. `OK`, `NOK`, `PENDING`.
    pub status: String,
    /// When the status was reported.
    pub time: Option<DateTime<Utc>>,
    /// Failure reason, if any.
    pub message: Option<String>,
}

impl Acknowledgment {
    /// Returns `true` if the stage succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

impl CommandHistory {
    /// Creates an empty history for a command.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds or replaces an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Converts one wire update.
    ///
    /// Attributes whose value cannot be decoded are left out.
    pub(crate) fn from_proto(entry: &proto::CommandHistoryEntry) -> Self {
        let attributes = entry
            .attr
            .iter()
            .filter_map(|attr| {
                let value = attr.value.as_ref().and_then(Value::from_proto)?;
                Some((attr.name.clone(), value))
            })
            .collect();

        Self {
            id: entry.id.clone(),
            name: entry.command_name.clone(),
            origin: entry.origin.clone(),
            sequence_number: entry.sequence_number,
            generation_time: entry.generation_time.as_ref().and_then(to_datetime),
            attributes,
        }
    }

    /// Returns a new snapshot with the attributes of `update` added to ours.
    ///
    /// Attributes present in both take the value from `update`. Identity
    /// fields missing from `update` are kept from `self`.
    #[must_use]
    pub fn merged(&self, update: &CommandHistory) -> CommandHistory {
        let mut attributes = self.attributes.clone();
        attributes.extend(
            update
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        CommandHistory {
            id: self.id.clone(),
            name: if update.name.is_empty() {
                self.name.clone()
            } else {
                update.name.clone()
            },
            origin: if update.origin.is_empty() {
                self.origin.clone()
            } else {
                update.origin.clone()
            },
            sequence_number: self.sequence_number,
            generation_time: self.generation_time.or(update.generation_time),
            attributes,
        }
    }

    /// Returns the command instance id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the qualified command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the client that issued the command.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the origin-scoped sequence number.
    #[must_use]
    pub fn sequence_number(&self) -> i32 {
        self.sequence_number
    }

    /// Returns when the command was issued.
    #[must_use]
    pub fn generation_time(&self) -> Option<DateTime<Utc>> {
        self.generation_time
    }

    /// Returns all attributes, sorted by name.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Returns one attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the progress of one verifier stage.
    #[must_use]
    pub fn acknowledgment(&self, stage: &str) -> Option<Acknowledgment> {
        let status = self.attribute(&format!("{stage}_Status"))?.to_string();
        let time = self
            .attribute(&format!("{stage}_Time"))
            .and_then(Value::as_timestamp);
        let message = self
            .attribute(&format!("{stage}_Message"))
            .map(ToString::to_string);

        Some(Acknowledgment {
            name: stage.to_string(),
            status,
            time,
            message,
        })
    }

    /// Returns the progress of every verifier stage except completion.
    #[must_use]
    pub fn acknowledgments(&self) -> Vec<Acknowledgment> {
        self.attributes
            .keys()
            .filter_map(|key| key.strip_suffix("_Status"))
            .filter(|stage| *stage != COMPLETION_STAGE)
            .filter_map(|stage| self.acknowledgment(stage))
            .collect()
    }

    fn completion_status(&self) -> Option<&str> {
        self.attribute(&format!("{COMPLETION_STAGE}_Status"))
            .and_then(Value::as_str)
    }

    /// Returns `true` once the command completed, successfully or not.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.completion_status(), Some("OK" | "NOK"))
    }

    /// Returns `true` if the command completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.completion_status() == Some("OK")
    }

    /// Returns `true` if the command completed with a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.completion_status() == Some("NOK")
    }

    /// Returns the failure reason, if the command failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        if let Some(reason) = self.attribute(COMMAND_FAILED) {
            return Some(reason.to_string());
        }
        if self.is_failure() {
            return self
                .attribute(&format!("{COMPLETION_STAGE}_Message"))
                .map(ToString::to_string);
        }
        None
    }
}
