// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use super::value::to_datetime;
use crate::proto;

/// The latest packet extracted for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    name: String,
    generation_time: Option<DateTime<Utc>>,
    reception_time: Option<DateTime<Utc>>,
    seq_count: i32,
    binary: Vec<u8>,
}

impl Container {
    pub(crate) fn from_proto(data: &proto::ContainerData) -> Self {
        Self {
            name: data.name.clone(),
            generation_time: data.generation_time.as_ref().and_then(to_datetime),
            reception_time: data.reception_time.as_ref().and_then(to_datetime),
            seq_count: data.seq_count,
            binary: data.binary.clone(),
        }
    }

    /// Returns the qualified container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the packet was generated on board.
    #[must_use]
    pub fn generation_time(&self) -> Option<DateTime<Utc>> {
        self.generation_time
    }

    /// Returns when the packet was received on ground.
    #[must_use]
    pub fn reception_time(&self) -> Option<DateTime<Utc>> {
        self.reception_time
    }

    /// Returns the packet sequence count.
    #[must_use]
    pub fn seq_count(&self) -> i32 {
        self.seq_count
    }

    /// Returns the raw packet bytes.
    #[must_use]
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }
}
