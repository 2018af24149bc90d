//! Kinesis target adapter, grounded on `targets/kinesis_target.py`.

use super::PipeTarget;
use crate::arn::resource_name_from_arn;
use crate::clients::StreamClient;
use crate::errors::TargetError;
use crate::params::KinesisTargetParameters;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Sends each event in the batch as one `PutRecord` call, all under the
/// same configured partition key.
pub struct KinesisTarget {
    client: Arc<dyn StreamClient>,
    stream_name: String,
    params: KinesisTargetParameters,
}

impl KinesisTarget {
    /// Builds a target bound to one stream ARN.
    #[must_use]
    pub fn new(client: Arc<dyn StreamClient>, stream_arn: &str, params: KinesisTargetParameters) -> Self {
        Self {
            client,
            stream_name: resource_name_from_arn(stream_arn).to_string(),
            params,
        }
    }
}

#[async_trait]
impl PipeTarget for KinesisTarget {
    async fn send(&self, events: &[Value]) -> Result<(), TargetError> {
        for event in events {
            let data = match event {
                Value::String(s) => s.clone().into_bytes(),
                other => other.to_string().into_bytes(),
            };
            self.client
                .put_record(&self.stream_name, &self.params.partition_key, &data)
                .await
                .map_err(|e| TargetError::Internal(e.0))?;
        }
        Ok(())
    }
}
