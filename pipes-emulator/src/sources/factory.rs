//! Dispatches a source ARN to its [`super::Poller`] implementation,
//! grounded on `pipe_worker_factory.py`'s source-kind branch.

use super::{ChangeDataCapturePoller, Poller, SqsPoller, StreamPoller};
use crate::arn::service_from_arn;
use crate::clients::ClientBundle;
use crate::errors::PipesError;
use crate::params::SourceParameters;
use std::sync::Arc;

/// Builds the [`Poller`] for a pipe's configured `source` ARN.
pub struct SourceFactory;

impl SourceFactory {
    /// Creates a poller for `source_arn`, using `source_parameters` when
    /// present or each service's defaults otherwise.
    ///
    /// # Errors
    /// Returns [`PipesError::validation`] when the ARN's service segment has
    /// no corresponding poller.
    pub fn create(
        source_arn: &str,
        source_parameters: Option<&SourceParameters>,
        clients: &ClientBundle,
    ) -> Result<Arc<dyn Poller>, PipesError> {
        match service_from_arn(source_arn) {
            "sqs" => Ok(Arc::new(SqsPoller::new(clients.queue.clone(), source_arn))),
            "kinesis" => {
                let stream_params = source_parameters.and_then(SourceParameters::as_stream);
                let starting_position = stream_params
                    .map(|p| p.starting_position)
                    .unwrap_or_default();
                let batch_size = stream_params.map_or(100, |p| p.batch_size);
                Ok(Arc::new(StreamPoller::new(
                    clients.stream.clone(),
                    source_arn,
                    starting_position,
                    batch_size,
                )))
            }
            "dynamodb" => {
                let stream_params = source_parameters.and_then(SourceParameters::as_stream);
                let starting_position = stream_params
                    .map(|p| p.starting_position)
                    .unwrap_or_default();
                let batch_size = stream_params.map_or(100, |p| p.batch_size);
                Ok(Arc::new(ChangeDataCapturePoller::new(
                    clients.stream.clone(),
                    source_arn,
                    starting_position,
                    batch_size,
                )))
            }
            other => Err(PipesError::validation(format!(
                "source service '{other}' is not supported"
            ))),
        }
    }
}
