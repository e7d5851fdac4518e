// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File transfers and remote directory listings.

use chrono::{DateTime, Utc};

use super::value::to_datetime;
use crate::proto::{self, TransferDirection, TransferState};

/// State of one file transfer, as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    id: u64,
    state: TransferState,
    direction: TransferDirection,
    bucket: String,
    object_name: String,
    remote_path: String,
    total_size: u64,
    size_transferred: u64,
    reliable: bool,
    failure_reason: Option<String>,
    start_time: Option<DateTime<Utc>>,
}

impl FileTransfer {
    pub(crate) fn from_proto(info: &proto::TransferInfo) -> Self {
        Self {
            id: info.id,
            state: info.state(),
            direction: info.direction(),
            bucket: info.bucket.clone(),
            object_name: info.object_name.clone(),
            remote_path: info.remote_path.clone(),
            total_size: info.total_size,
            size_transferred: info.size_transferred,
            reliable: info.reliable,
            failure_reason: info.failure_reason.clone(),
            start_time: info.start_time.as_ref().and_then(to_datetime),
        }
    }

    /// Returns the transfer id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Returns the direction, seen from the server.
    #[must_use]
    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// Returns the bucket holding the local copy.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object name of the local copy.
    #[must_use]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Returns the path on the remote entity.
    #[must_use]
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Returns the total size in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Returns the number of bytes transferred so far.
    #[must_use]
    pub fn size_transferred(&self) -> u64 {
        self.size_transferred
    }

    /// Returns `true` for acknowledged-mode transfers.
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        self.reliable
    }

    /// Returns why the transfer failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns when the transfer started.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns `true` once the transfer ended, successfully or not.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, TransferState::Completed | TransferState::Failed)
    }

    /// Returns `true` if the transfer completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == TransferState::Completed
    }

    /// Returns the completed fraction in `[0, 1]`, or `None` when the size
    /// is unknown.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        if self.total_size == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.size_transferred as f64 / self.total_size as f64;
        Some(ratio.min(1.0))
    }
}

/// An entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// File name.
    pub name: String,
    /// `true` for directories.
    pub is_directory: bool,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
}

/// A remote directory listing, as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileListing {
    remote_path: String,
    destination: String,
    files: Vec<RemoteFile>,
    list_time: Option<DateTime<Utc>>,
    state: Option<String>,
}

impl RemoteFileListing {
    pub(crate) fn from_proto(listing: &proto::ListFilesResponse) -> Self {
        Self {
            remote_path: listing.remote_path.clone(),
            destination: listing.destination.clone(),
            files: listing
                .files
                .iter()
                .map(|file| RemoteFile {
                    name: file.name.clone(),
                    is_directory: file.is_directory,
                    size: file.size,
                    modified: file.modified.as_ref().and_then(to_datetime),
                })
                .collect(),
            list_time: listing.list_time.as_ref().and_then(to_datetime),
            state: listing.state.clone(),
        }
    }

    /// Returns the cache key of this listing.
    #[must_use]
    pub fn key(&self) -> (String, String) {
        (self.remote_path.clone(), self.destination.clone())
    }

    /// Returns the listed remote directory.
    #[must_use]
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Returns the remote entity that was listed.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Returns the directory entries.
    #[must_use]
    pub fn files(&self) -> &[RemoteFile] {
        &self.files
    }

    /// Returns when the listing was taken.
    #[must_use]
    pub fn list_time(&self) -> Option<DateTime<Utc>> {
        self.list_time
    }

    /// Returns the server-side state of the listing request.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(state: TransferState) -> FileTransfer {
        FileTransfer::from_proto(&proto::TransferInfo {
            id: 5,
            state: state as i32,
            total_size: 200,
            size_transferred: 50,
            ..Default::default()
        })
    }

    #[test]
    fn running_transfer_is_not_complete() {
        let t = transfer(TransferState::Running);
        assert!(!t.is_complete());
        assert!(!t.is_success());
        assert_eq!(t.progress(), Some(0.25));
    }

    #[test]
    fn failed_transfer_is_complete_but_not_success() {
        let t = transfer(TransferState::Failed);
        assert!(t.is_complete());
        assert!(!t.is_success());
    }

    #[test]
    fn completed_transfer_is_success() {
        let t = transfer(TransferState::Completed);
        assert!(t.is_complete());
        assert!(t.is_success());
    }

    #[test]
    fn progress_unknown_without_size() {
        let t = FileTransfer::from_proto(&proto::TransferInfo::default());
        assert_eq!(t.progress(), None);
    }

    #[test]
    fn listing_key() {
        let listing = RemoteFileListing::from_proto(&proto::ListFilesResponse {
            remote_path: "/logs".to_string(),
            destination: "target1".to_string(),
            ..Default::default()
        });
        assert_eq!(listing.key(), ("/logs".to_string(), "target1".to_string()));
    }
}
