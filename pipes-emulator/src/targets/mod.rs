//! Target adapters: the data-plane side that turns a batch of (possibly
//! transformed) events into calls against a destination service.
//!
//! Grounded on `targets/pipe_target.py`'s `PipeTargetPlugin` port and
//! `targets/target_factory.py`'s service dispatch, exposed as an
//! object-safe async trait so targets are pluggable behind `Arc<dyn PipeTarget>`.

mod factory;
mod http_destination;
mod kinesis;
mod sqs;

pub use factory::TargetFactory;
pub use http_destination::HttpDestinationTarget;
pub use kinesis::KinesisTarget;
pub use sqs::SqsTarget;

use crate::errors::TargetError;
use async_trait::async_trait;
use serde_json::Value;

/// A destination a pipe's processed events are sent to.
///
/// Implementations translate AWS service-level failures into
/// [`TargetError::CustomerInvocation`] (permanent, attributable to the
/// customer's configuration or payload) versus
/// [`TargetError::Internal`] (transient, should be retried with backoff).
#[async_trait]
pub trait PipeTarget: Send + Sync {
    /// Sends one batch of events, already transformed if an input template
    /// was configured. Implementations attempt delivery of every event in
    /// the batch; a non-fatal per-event response (anything that isn't an
    /// auth failure) is logged rather than aborting the remaining events.
    async fn send(&self, events: &[Value]) -> Result<(), TargetError>;
}
