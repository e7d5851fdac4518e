// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use super::value::to_datetime;
use crate::proto::{self, EventSeverity};

/// A mission event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    source: String,
    event_type: Option<String>,
    message: String,
    severity: EventSeverity,
    seq_number: i32,
    generation_time: Option<DateTime<Utc>>,
    reception_time: Option<DateTime<Utc>>,
}

impl Event {
    pub(crate) fn from_proto(event: &proto::Event) -> Self {
        Self {
            source: event.source.clone(),
            event_type: event.r#type.clone(),
            message: event.message.clone(),
            severity: event.severity(),
            seq_number: event.seq_number,
            generation_time: event.generation_time.as_ref().and_then(to_datetime),
            reception_time: event.reception_time.as_ref().and_then(to_datetime),
        }
    }

    /// Returns the event source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the source-specific event type.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Returns the event text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> EventSeverity {
        self.severity
    }

    /// Returns the source-scoped sequence number.
    #[must_use]
    pub fn seq_number(&self) -> i32 {
        self.seq_number
    }

    /// Returns when the event was generated.
    #[must_use]
    pub fn generation_time(&self) -> Option<DateTime<Utc>> {
        self.generation_time
    }

    /// Returns when the event was received by the server.
    #[must_use]
    pub fn reception_time(&self) -> Option<DateTime<Utc>> {
        self.reception_time
    }
}
