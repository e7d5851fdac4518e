// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File transfer and remote file listing subscriptions.

use std::sync::Arc;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{
    ListFilesResponse, SubscribeFileListRequest, SubscribeTransfersRequest, TransferInfo,
};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::{FileTransfer, RemoteFileListing};

// ============================================================================
// Transfers
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct TransferCache {
    transfers: KeyedCache<u64, FileTransfer>,
}

impl FrameHandler for TransferCache {
    type Output = Arc<FileTransfer>;

    fn handle(
        &self,
        frame: &DataFrame,
    ) -> std::result::Result<Option<Arc<FileTransfer>>, ParseError> {
        let info: TransferInfo = frame.decode()?;
        let transfer = Arc::new(FileTransfer::from_proto(&info));
        self.transfers.insert(transfer.id(), Arc::clone(&transfer));
        Ok(Some(transfer))
    }
}

/// A live subscription to the file transfers of one transfer service.
///
/// Finished transfers stay in the cache with their final state.
#[derive(Debug, Clone)]
pub struct TransferSubscription {
    future: SubscriptionFuture,
    cache: Arc<TransferCache>,
}

impl TransferSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        service: &str,
        ongoing_only: bool,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Arc<FileTransfer>) + Send + 'static,
    {
        let request = SubscribeTransfersRequest {
            instance: instance.to_string(),
            service_name: service.to_string(),
            ongoing_only,
        };
        let cache = Arc::new(TransferCache::default());
        let future = super::start(
            Topic::FILE_TRANSFERS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the latest state of a transfer.
    #[must_use]
    pub fn get_transfer(&self, id: u64) -> Option<Arc<FileTransfer>> {
        self.cache.transfers.get(&id)
    }

    /// Returns every transfer seen so far, ordered by id.
    #[must_use]
    pub fn list_transfers(&self) -> Vec<Arc<FileTransfer>> {
        let mut transfers = self.cache.transfers.values();
        transfers.sort_by_key(|t| t.id());
        transfers
    }
}

impl Subscription for TransferSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}

// ============================================================================
// Remote file listings
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct FileListCache {
    listings: KeyedCache<(String, String), RemoteFileListing>,
}

impl FrameHandler for FileListCache {
    type Output = Arc<RemoteFileListing>;

    fn handle(
        &self,
        frame: &DataFrame,
    ) -> std::result::Result<Option<Arc<RemoteFileListing>>, ParseError> {
        let response: ListFilesResponse = frame.decode()?;
        let listing = Arc::new(RemoteFileListing::from_proto(&response));
        self.listings.insert(listing.key(), Arc::clone(&listing));
        Ok(Some(listing))
    }
}

/// A live subscription to remote directory listings.
///
/// Listings are keyed by remote path and destination; a newer listing of
/// the same directory replaces the older one.
#[derive(Debug, Clone)]
pub struct FileListSubscription {
    future: SubscriptionFuture,
    cache: Arc<FileListCache>,
}

impl FileListSubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        service: &str,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Arc<RemoteFileListing>) + Send + 'static,
    {
        let request = SubscribeFileListRequest {
            instance: instance.to_string(),
            service_name: service.to_string(),
        };
        let cache = Arc::new(FileListCache::default());
        let future = super::start(
            Topic::REMOTE_FILE_LIST,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the latest listing of `remote_path` at `destination`.
    #[must_use]
    pub fn get_listing(&self, remote_path: &str, destination: &str) -> Option<Arc<RemoteFileListing>> {
        self.cache
            .listings
            .get(&(remote_path.to_string(), destination.to_string()))
    }

    /// Returns every listing received so far.
    #[must_use]
    pub fn list_listings(&self) -> Vec<Arc<RemoteFileListing>> {
        self.cache.listings.values()
    }
}

impl Subscription for FileListSubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}
