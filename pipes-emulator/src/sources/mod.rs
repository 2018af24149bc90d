//! Source pollers: the data-plane side that pulls a batch of raw records
//! off a source service.
//!
//! Grounded on `pipe_worker.py`'s `_poll` generator pattern, adapted into
//! an object-safe async trait so sources are pluggable behind `Arc<dyn Poller>`.

mod factory;
mod sqs;
mod stream;

pub use factory::SourceFactory;
pub use sqs::SqsPoller;
pub use stream::{ChangeDataCapturePoller, StreamPoller};

use crate::errors::PollError;
use async_trait::async_trait;
use serde_json::Value;

/// One poll's worth of events, plus whatever bookkeeping is needed to
/// acknowledge successful processing.
#[derive(Debug, Clone, Default)]
pub struct PollBatch {
    /// Raw, not-yet-decoded event payloads.
    pub events: Vec<Value>,
    /// SQS receipt handles to delete on success. Empty for stream sources,
    /// which instead commit a pending shard-iterator advance from
    /// [`Poller::acknowledge`].
    pub receipt_handles: Vec<String>,
}

/// Pulls records from one configured source.
#[async_trait]
pub trait Poller: Send + Sync {
    /// Polls once. An empty result is reported as [`PollError::Empty`]
    /// rather than `Ok` with no events, so the worker can distinguish "no
    /// work" from "work, but zero records" for backoff purposes.
    async fn poll(&self) -> Result<PollBatch, PollError>;

    /// Acknowledges successful processing of a batch previously returned by
    /// [`Poller::poll`]. No-op for sources whose cursor already advanced.
    async fn acknowledge(&self, batch: &PollBatch) -> Result<(), PollError>;
}
