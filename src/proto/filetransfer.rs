// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages of the `file-transfers` and `remote-file-list` topics.

use super::impl_name;

/// Options of a `file-transfers` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeTransfersRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub service_name: String,
    #[prost(bool, tag = "3")]
    pub ongoing_only: bool,
}

/// Lifecycle state of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransferState {
    Running = 0,
    Paused = 1,
    Failed = 2,
    Completed = 3,
    Queued = 4,
    Cancelling = 5,
}

/// Direction of a transfer, seen from the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransferDirection {
    Upload = 0,
    Download = 1,
}

/// Full state of one file transfer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferInfo {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(message, optional, tag = "2")]
    pub start_time: Option<::prost_types::Timestamp>,
    #[prost(enumeration = "TransferState", tag = "3")]
    pub state: i32,
    #[prost(string, tag = "4")]
    pub bucket: String,
    #[prost(string, tag = "5")]
    pub object_name: String,
    #[prost(string, tag = "6")]
    pub remote_path: String,
    #[prost(enumeration = "TransferDirection", tag = "7")]
    pub direction: i32,
    #[prost(uint64, tag = "8")]
    pub total_size: u64,
    #[prost(uint64, tag = "9")]
    pub size_transferred: u64,
    #[prost(bool, tag = "10")]
    pub reliable: bool,
    #[prost(string, optional, tag = "11")]
    pub failure_reason: Option<String>,
}

/// Options of a `remote-file-list` request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeFileListRequest {
    #[prost(string, tag = "1")]
    pub instance: String,
    #[prost(string, tag = "2")]
    pub service_name: String,
}

/// Listing of a remote directory.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListFilesResponse {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<RemoteFile>,
    #[prost(string, tag = "2")]
    pub destination: String,
    #[prost(string, tag = "3")]
    pub remote_path: String,
    #[prost(message, optional, tag = "4")]
    pub list_time: Option<::prost_types::Timestamp>,
    #[prost(string, optional, tag = "5")]
    pub state: Option<String>,
}

/// An entry of a remote directory listing.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoteFile {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub is_directory: bool,
    #[prost(uint64, tag = "3")]
    pub size: u64,
    #[prost(message, optional, tag = "4")]
    pub modified: Option<::prost_types::Timestamp>,
}

impl_name!(
    SubscribeTransfersRequest,
    TransferInfo,
    SubscribeFileListRequest,
    ListFilesResponse,
    RemoteFile,
);
