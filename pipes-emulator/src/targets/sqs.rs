//! SQS target adapter, grounded on `targets/sqs_target.py`.

use super::PipeTarget;
use crate::arn::resource_name_from_arn;
use crate::clients::QueueClient;
use crate::errors::TargetError;
use crate::params::SqsTargetParameters;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Sends each event in the batch as one SQS `SendMessage` call.
pub struct SqsTarget {
    client: Arc<dyn QueueClient>,
    queue_url: String,
    params: SqsTargetParameters,
}

impl SqsTarget {
    /// Builds a target bound to one queue ARN.
    #[must_use]
    pub fn new(client: Arc<dyn QueueClient>, queue_arn: &str, params: SqsTargetParameters) -> Self {
        let queue_url = client.queue_url_for_arn(queue_arn);
        Self {
            client,
            queue_url,
            params,
        }
    }
}

#[async_trait]
impl PipeTarget for SqsTarget {
    async fn send(&self, events: &[Value]) -> Result<(), TargetError> {
        for event in events {
            let body = match event {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.client
                .send_message(
                    &self.queue_url,
                    &body,
                    self.params.message_group_id.as_deref(),
                    self.params.message_deduplication_id.as_deref(),
                )
                .await
                .map_err(|e| TargetError::Internal(e.0))?;
        }
        Ok(())
    }
}

/// Extracts the queue name from a queue ARN, used by in-memory doubles that
/// key on name rather than ARN.
#[must_use]
pub fn queue_name_from_arn(arn: &str) -> &str {
    resource_name_from_arn(arn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::QueueMessage;
    use crate::errors::ClientError;
    use parking_lot::Mutex;
    use serde_json::json;

    struct RecordingQueueClient {
        sent: Mutex<Vec<(String, Option<String>, Option<String>)>>,
    }

    #[async_trait]
    impl QueueClient for RecordingQueueClient {
        fn queue_url_for_arn(&self, queue_arn: &str) -> String {
            format!("https://queue.local/{}", queue_name_from_arn(queue_arn))
        }

        async fn receive_messages(
            &self,
            _queue_url: &str,
        ) -> Result<Vec<QueueMessage>, ClientError> {
            Ok(vec![])
        }

        async fn delete_messages(
            &self,
            _queue_url: &str,
            _receipt_handles: &[String],
        ) -> Result<(), ClientError> {
            Ok(())
        }

        async fn send_message(
            &self,
            _queue_url: &str,
            body: &str,
            message_group_id: Option<&str>,
            message_deduplication_id: Option<&str>,
        ) -> Result<(), ClientError> {
            self.sent.lock().push((
                body.to_string(),
                message_group_id.map(str::to_string),
                message_deduplication_id.map(str::to_string),
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn sends_each_event_as_its_own_message() {
        let client = Arc::new(RecordingQueueClient {
            sent: Mutex::new(vec![]),
        });
        let target = SqsTarget::new(
            client.clone(),
            "arn:aws:sqs:us-east-1:000000000000:dst",
            SqsTargetParameters::default(),
        );

        target
            .send(&[json!({"a": 1}), json!({"a": 2})])
            .await
            .unwrap();

        let sent = client.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn string_events_are_sent_verbatim() {
        let client = Arc::new(RecordingQueueClient {
            sent: Mutex::new(vec![]),
        });
        let target = SqsTarget::new(
            client.clone(),
            "arn:aws:sqs:us-east-1:000000000000:dst",
            SqsTargetParameters::default(),
        );

        target.send(&[json!("raw-string")]).await.unwrap();
        assert_eq!(client.sent.lock()[0].0, "raw-string");
    }

    #[tokio::test]
    async fn passes_fifo_group_and_dedup_ids() {
        let client = Arc::new(RecordingQueueClient {
            sent: Mutex::new(vec![]),
        });
        let params = SqsTargetParameters {
            message_group_id: Some("group-1".to_string()),
            message_deduplication_id: Some("dedup-1".to_string()),
        };
        let target = SqsTarget::new(
            client.clone(),
            "arn:aws:sqs:us-east-1:000000000000:dst.fifo",
            params,
        );

        target.send(&[json!({"a": 1})]).await.unwrap();

        let sent = client.sent.lock();
        assert_eq!(sent[0].1.as_deref(), Some("group-1"));
        assert_eq!(sent[0].2.as_deref(), Some("dedup-1"));
    }
}
