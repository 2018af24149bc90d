//! Shard-based source pollers for Kinesis and DynamoDB Streams, grounded on
//! `pipe_worker.py`'s shard-iterator bookkeeping — both services expose the
//! same get-iterator/get-records shape, so they share one internal core,
//! but each keeps its own public type so its logging context reads
//! "Kinesis stream" or "DynamoDB stream" rather than a generic label.
//!
//! A shard's iterator only advances once the batch it produced has been
//! acknowledged. A poll that fails downstream (the worker never calls
//! [`Poller::acknowledge`] on it) is retried from the same position on the
//! next poll, matching a failed SQS batch simply not being deleted.

use super::{PollBatch, Poller};
use crate::arn::resource_name_from_arn;
use crate::clients::{ShardIteratorPosition, StreamClient};
use crate::errors::PollError;
use crate::params::StartingPosition;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct ShardBasedPoller {
    client: Arc<dyn StreamClient>,
    stream_name: String,
    stream_label: &'static str,
    starting_position: StartingPosition,
    batch_size: u32,
    iterators: Mutex<HashMap<String, ShardIteratorPosition>>,
    pending: Mutex<Option<HashMap<String, ShardIteratorPosition>>>,
}

impl ShardBasedPoller {
    fn new(
        client: Arc<dyn StreamClient>,
        stream_arn: &str,
        stream_label: &'static str,
        starting_position: StartingPosition,
        batch_size: u32,
    ) -> Self {
        Self {
            client,
            stream_name: resource_name_from_arn(stream_arn).to_string(),
            stream_label,
            starting_position,
            batch_size,
            iterators: Mutex::new(HashMap::new()),
            pending: Mutex::new(None),
        }
    }

    async fn ensure_shards_discovered(&self) -> Result<(), PollError> {
        if !self.iterators.lock().is_empty() {
            return Ok(());
        }
        let shard_ids = self
            .client
            .list_shards(&self.stream_name)
            .await
            .map_err(|e| PollError::Source(e.0))?;

        let mut discovered = HashMap::new();
        for shard_id in shard_ids {
            let iterator = self
                .client
                .get_shard_iterator(&self.stream_name, &shard_id, self.starting_position)
                .await
                .map_err(|e| PollError::Source(e.0))?;
            discovered.insert(shard_id, iterator);
        }
        debug!(
            stream = %self.stream_name,
            kind = self.stream_label,
            shards = discovered.len(),
            "discovered shards"
        );
        *self.iterators.lock() = discovered;
        Ok(())
    }

    async fn poll(&self) -> Result<PollBatch, PollError> {
        self.ensure_shards_discovered().await?;

        let snapshot: Vec<(String, ShardIteratorPosition)> = self
            .iterators
            .lock()
            .iter()
            .map(|(shard_id, iter)| (shard_id.clone(), iter.clone()))
            .collect();

        let mut events = Vec::new();
        let mut advanced = HashMap::new();
        for (shard_id, iterator) in snapshot {
            let (records, next_iterator) = self
                .client
                .get_records(&iterator, self.batch_size)
                .await
                .map_err(|e| PollError::Source(e.0))?;
            events.extend(records.into_iter().map(|r| r.data));
            advanced.insert(shard_id, next_iterator);
        }

        if events.is_empty() {
            return Err(PollError::Empty);
        }

        *self.pending.lock() = Some(advanced);
        Ok(PollBatch {
            events,
            receipt_handles: Vec::new(),
        })
    }

    fn acknowledge(&self) -> Result<(), PollError> {
        if let Some(advanced) = self.pending.lock().take() {
            self.iterators.lock().extend(advanced);
        }
        Ok(())
    }
}

/// Polls every shard of one Kinesis stream on each call.
pub struct StreamPoller(ShardBasedPoller);

impl StreamPoller {
    /// Builds a poller bound to one Kinesis stream ARN.
    #[must_use]
    pub fn new(
        client: Arc<dyn StreamClient>,
        stream_arn: &str,
        starting_position: StartingPosition,
        batch_size: u32,
    ) -> Self {
        Self(ShardBasedPoller::new(
            client,
            stream_arn,
            "Kinesis stream",
            starting_position,
            batch_size,
        ))
    }
}

#[async_trait]
impl Poller for StreamPoller {
    async fn poll(&self) -> Result<PollBatch, PollError> {
        self.0.poll().await
    }

    async fn acknowledge(&self, _batch: &PollBatch) -> Result<(), PollError> {
        self.0.acknowledge()
    }
}

/// Polls every shard of one DynamoDB stream on each call.
///
/// Identical shape to [`StreamPoller`]; kept as its own type so a
/// DynamoDB-backed pipe's logs and future parameter defaults don't read as
/// Kinesis-specific.
pub struct ChangeDataCapturePoller(ShardBasedPoller);

impl ChangeDataCapturePoller {
    /// Builds a poller bound to one DynamoDB stream ARN.
    #[must_use]
    pub fn new(
        client: Arc<dyn StreamClient>,
        stream_arn: &str,
        starting_position: StartingPosition,
        batch_size: u32,
    ) -> Self {
        Self(ShardBasedPoller::new(
            client,
            stream_arn,
            "DynamoDB stream",
            starting_position,
            batch_size,
        ))
    }
}

#[async_trait]
impl Poller for ChangeDataCapturePoller {
    async fn poll(&self) -> Result<PollBatch, PollError> {
        self.0.poll().await
    }

    async fn acknowledge(&self, _batch: &PollBatch) -> Result<(), PollError> {
        self.0.acknowledge()
    }
}
