// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data link state.

use crate::proto;

/// State of a data link, as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    instance: String,
    name: String,
    link_type: String,
    status: String,
    disabled: bool,
    data_in_count: i64,
    data_out_count: i64,
    detailed_status: String,
    parent_name: Option<String>,
}

impl Link {
    pub(crate) fn from_proto(info: &proto::LinkInfo) -> Self {
        Self {
            instance: info.instance.clone(),
            name: info.name.clone(),
            link_type: info.r#type.clone(),
            status: info.status.clone(),
            disabled: info.disabled,
            data_in_count: info.data_in_count,
            data_out_count: info.data_out_count,
            detailed_status: info.detailed_status.clone(),
            parent_name: info.parent_name.clone(),
        }
    }

    /// Returns the instance the link belongs to.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Returns the link name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the implementation type of the link.
    #[must_use]
    pub fn link_type(&self) -> &str {
        &self.link_type
    }

    /// Returns the status (`OK`, `UNAVAIL`, `DISABLED` or `FAILED`).
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns `true` unless the link was disabled by an operator.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Returns the number of inbound data units.
    #[must_use]
    pub fn data_in_count(&self) -> i64 {
        self.data_in_count
    }

    /// Returns the number of outbound data units.
    #[must_use]
    pub fn data_out_count(&self) -> i64 {
        self.data_out_count
    }

    /// Returns the free-form status detail.
    #[must_use]
    pub fn detailed_status(&self) -> &str {
        &self.detailed_status
    }

    /// Returns the parent link for sub-links.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }
}
