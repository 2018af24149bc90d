//! SQS source poller.

use super::{PollBatch, Poller};
use crate::clients::QueueClient;
use crate::errors::PollError;
use async_trait::async_trait;
use std::sync::Arc;

/// Long-polls one queue, deleting received messages only once the worker
/// confirms the batch was processed successfully.
pub struct SqsPoller {
    client: Arc<dyn QueueClient>,
    queue_url: String,
}

impl SqsPoller {
    /// Builds a poller bound to one queue ARN.
    #[must_use]
    pub fn new(client: Arc<dyn QueueClient>, queue_arn: &str) -> Self {
        let queue_url = client.queue_url_for_arn(queue_arn);
        Self { client, queue_url }
    }
}

#[async_trait]
impl Poller for SqsPoller {
    async fn poll(&self) -> Result<PollBatch, PollError> {
        let messages = self
            .client
            .receive_messages(&self.queue_url)
            .await
            .map_err(|e| PollError::Source(e.0))?;

        if messages.is_empty() {
            return Err(PollError::Empty);
        }

        let receipt_handles = messages.iter().map(|m| m.receipt_handle.clone()).collect();
        let events = messages.into_iter().map(|m| m.body).collect();
        Ok(PollBatch {
            events,
            receipt_handles,
        })
    }

    async fn acknowledge(&self, batch: &PollBatch) -> Result<(), PollError> {
        if batch.receipt_handles.is_empty() {
            return Ok(());
        }
        self.client
            .delete_messages(&self.queue_url, &batch.receipt_handles)
            .await
            .map_err(|e| PollError::Source(e.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::QueueMessage;
    use crate::errors::ClientError;
    use parking_lot::Mutex;
    use serde_json::json;

    struct FakeQueueClient {
        inbox: Mutex<Vec<QueueMessage>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueueClient for FakeQueueClient {
        fn queue_url_for_arn(&self, queue_arn: &str) -> String {
            queue_arn.to_string()
        }

        async fn receive_messages(
            &self,
            _queue_url: &str,
        ) -> Result<Vec<QueueMessage>, ClientError> {
            Ok(std::mem::take(&mut self.inbox.lock()))
        }

        async fn delete_messages(
            &self,
            _queue_url: &str,
            receipt_handles: &[String],
        ) -> Result<(), ClientError> {
            self.deleted.lock().extend_from_slice(receipt_handles);
            Ok(())
        }

        async fn send_message(
            &self,
            _queue_url: &str,
            _body: &str,
            _message_group_id: Option<&str>,
            _message_deduplication_id: Option<&str>,
        ) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_inbox_is_reported_as_poll_error_empty() {
        let client = Arc::new(FakeQueueClient {
            inbox: Mutex::new(vec![]),
            deleted: Mutex::new(vec![]),
        });
        let poller = SqsPoller::new(client, "arn:aws:sqs:us-east-1:000000000000:q");
        assert!(matches!(poller.poll().await, Err(PollError::Empty)));
    }

    #[tokio::test]
    async fn acknowledge_deletes_returned_receipt_handles() {
        let client = Arc::new(FakeQueueClient {
            inbox: Mutex::new(vec![QueueMessage {
                receipt_handle: "r1".to_string(),
                body: json!({"a": 1}),
            }]),
            deleted: Mutex::new(vec![]),
        });
        let poller = SqsPoller::new(client.clone(), "arn:aws:sqs:us-east-1:000000000000:q");

        let batch = poller.poll().await.unwrap();
        assert_eq!(batch.events.len(), 1);
        poller.acknowledge(&batch).await.unwrap();

        assert_eq!(client.deleted.lock().as_slice(), ["r1".to_string()]);
    }
}
