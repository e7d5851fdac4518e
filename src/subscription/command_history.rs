// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command history subscriptions.
//!
//! The server sends only the attributes that changed. Each update is merged
//! into the previous snapshot of the same command, and the merged snapshot
//! replaces it as a whole.

use std::sync::Arc;

use super::cache::KeyedCache;
use super::{FrameHandler, Subscription, SubscriptionFuture};
use crate::error::{ParseError, Result};
use crate::proto::{CommandHistoryEntry, SubscribeCommandsRequest};
use crate::protocol::codec::{DataFrame, SequenceGenerator, Topic};
use crate::protocol::transport::Connector;
use crate::types::CommandHistory;

#[derive(Debug, Default)]
pub(crate) struct CommandHistoryCache {
    commands: KeyedCache<String, CommandHistory>,
}

impl FrameHandler for CommandHistoryCache {
    type Output = Arc<CommandHistory>;

    fn handle(&self, frame: &DataFrame) -> std::result::Result<Option<Self::Output>, ParseError> {
        let entry: CommandHistoryEntry = frame.decode()?;
        if entry.id.is_empty() {
            return Err(ParseError::MissingField("command id".to_string()));
        }

        let update = CommandHistory::from_proto(&entry);
        let merged = self.commands.merge(entry.id, |previous| match previous {
            Some(previous) => previous.merged(&update),
            None => update.clone(),
        });
        Ok(Some(merged))
    }
}

/// A live subscription to the history of issued commands.
#[derive(Debug, Clone)]
pub struct CommandHistorySubscription {
    future: SubscriptionFuture,
    cache: Arc<CommandHistoryCache>,
}

impl CommandHistorySubscription {
    pub(crate) fn open<C, F>(
        connector: C,
        sequence: Arc<SequenceGenerator>,
        instance: &str,
        processor: &str,
        ignore_past_commands: bool,
        on_data: F,
    ) -> Result<Self>
    where
        C: Connector,
        F: FnMut(Arc<CommandHistory>) + Send + 'static,
    {
        let request = SubscribeCommandsRequest {
            instance: instance.to_string(),
            processor: processor.to_string(),
            ignore_past_commands,
        };
        let cache = Arc::new(CommandHistoryCache::default());
        let future = super::start(
            Topic::COMMANDS,
            &request,
            connector,
            sequence,
            Arc::clone(&cache),
            on_data,
        )?;
        Ok(Self { future, cache })
    }

    /// Returns the accumulated history of a command.
    #[must_use]
    pub fn get_command(&self, id: &str) -> Option<Arc<CommandHistory>> {
        self.cache.commands.get(id)
    }

    /// Returns the accumulated history of every command seen so far.
    #[must_use]
    pub fn list_commands(&self) -> Vec<Arc<CommandHistory>> {
        self.cache.commands.values()
    }
}

impl Subscription for CommandHistorySubscription {
    fn future(&self) -> &SubscriptionFuture {
        &self.future
    }
}
