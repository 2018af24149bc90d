//! In-memory doubles for the client traits in [`crate::clients`], letting
//! workers and control-plane operations run end-to-end in tests without a
//! real queue/stream/events backend.

use crate::clients::{
    ApiDestinationConfig, ConnectionAuthType, ConnectionConfig, ConnectionResolver, QueueClient,
    QueueMessage, SecretsClient, ShardIteratorPosition, StreamClient, StreamRecord,
};
use crate::errors::ClientError;
use crate::params::StartingPosition;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory queue backend keyed by queue URL (== queue ARN in these
/// doubles; there is no separate URL namespace to emulate).
#[derive(Default)]
pub struct InMemoryQueueClient {
    queues: Mutex<HashMap<String, VecDeque<QueueMessage>>>,
    deleted: Mutex<Vec<String>>,
    next_receipt: AtomicU64,
}

impl InMemoryQueueClient {
    /// Enqueues a message directly, as if it had arrived from outside the
    /// emulator.
    pub fn seed(&self, queue_arn: &str, body: Value) {
        let receipt_handle = self.next_receipt.fetch_add(1, Ordering::SeqCst).to_string();
        self.queues
            .lock()
            .entry(queue_arn.to_string())
            .or_default()
            .push_back(QueueMessage {
                receipt_handle,
                body,
            });
    }

    /// Receipt handles passed to `delete_messages` so far.
    #[must_use]
    pub fn deleted_receipt_handles(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    fn queue_url_for_arn(&self, queue_arn: &str) -> String {
        queue_arn.to_string()
    }

    async fn receive_messages(&self, queue_url: &str) -> Result<Vec<QueueMessage>, ClientError> {
        let mut queues = self.queues.lock();
        Ok(queues.entry(queue_url.to_string()).or_default().drain(..).collect())
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
        queue_url: &str,
        body: &str,
        _message_group_id: Option<&str>,
        _message_deduplication_id: Option<&str>,
    ) -> Result<(), ClientError> {
        let receipt_handle = self.next_receipt.fetch_add(1, Ordering::SeqCst).to_string();
        let value = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        self.queues
            .lock()
            .entry(queue_url.to_string())
            .or_default()
            .push_back(QueueMessage {
                receipt_handle,
                body: value,
            });
        Ok(())
    }
}

/// In-memory single-shard-per-stream backend. Iterators are encoded as
/// `"<stream>:<shard>"` strings; records are consumed (not replayed) on
/// read, matching real Kinesis get-records semantics closely enough for
/// testing the worker loop.
#[derive(Default)]
pub struct InMemoryStreamClient {
    records: Mutex<HashMap<String, VecDeque<StreamRecord>>>,
    put_records: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl InMemoryStreamClient {
    /// Appends a record to a stream's single shard.
    pub fn seed(&self, stream_name: &str, data: Value) {
        self.records
            .lock()
            .entry(stream_name.to_string())
            .or_default()
            .push_back(StreamRecord { data });
    }

    /// Records passed to `put_record` so far, as `(stream, partition_key, data)`.
    #[must_use]
    pub fn put_records(&self) -> Vec<(String, String, Vec<u8>)> {
        self.put_records.lock().clone()
    }
}

#[async_trait]
impl StreamClient for InMemoryStreamClient {
    async fn list_shards(&self, stream_name: &str) -> Result<Vec<String>, ClientError> {
        Ok(vec![format!("{stream_name}-shard-0")])
    }

    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        _starting_position: StartingPosition,
    ) -> Result<ShardIteratorPosition, ClientError> {
        Ok(ShardIteratorPosition(format!("{stream_name}:{shard_id}")))
    }

    async fn get_records(
        &self,
        iterator: &ShardIteratorPosition,
        batch_size: u32,
    ) -> Result<(Vec<StreamRecord>, ShardIteratorPosition), ClientError> {
        let stream_name = iterator.0.split(':').next().unwrap_or_default().to_string();
        let mut records = self.records.lock();
        let queue = records.entry(stream_name).or_default();
        let mut batch = Vec::new();
        for _ in 0..batch_size {
            match queue.pop_front() {
                Some(record) => batch.push(record),
                None => break,
            }
        }
        Ok((batch, iterator.clone()))
    }

    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: &[u8],
    ) -> Result<(), ClientError> {
        self.put_records
            .lock()
            .push((stream_name.to_string(), partition_key.to_string(), data.to_vec()));
        Ok(())
    }
}

/// In-memory API-destination/connection directory.
#[derive(Default)]
pub struct InMemoryConnections {
    destinations: Mutex<HashMap<String, ApiDestinationConfig>>,
    connections: Mutex<HashMap<String, ConnectionConfig>>,
}

impl InMemoryConnections {
    /// Registers an API destination by name.
    pub fn register_destination(&self, name: &str, config: ApiDestinationConfig) {
        self.destinations.lock().insert(name.to_string(), config);
    }

    /// Registers a connection by ARN.
    pub fn register_connection(&self, arn: &str, config: ConnectionConfig) {
        self.connections.lock().insert(arn.to_string(), config);
    }
}

#[async_trait]
impl ConnectionResolver for InMemoryConnections {
    async fn describe_api_destination(
        &self,
        name: &str,
    ) -> Result<ApiDestinationConfig, ClientError> {
        self.destinations
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::new(format!("no such api destination: {name}")))
    }

    async fn describe_connection(&self, arn: &str) -> Result<ConnectionConfig, ClientError> {
        self.connections
            .lock()
            .get(arn)
            .cloned()
            .ok_or_else(|| ClientError::new(format!("no such connection: {arn}")))
    }
}

/// In-memory secret store.
#[derive(Default)]
pub struct InMemorySecrets {
    secrets: Mutex<HashMap<String, Value>>,
}

impl InMemorySecrets {
    /// Registers a secret's JSON value by ARN.
    pub fn register(&self, secret_arn: &str, value: Value) {
        self.secrets.lock().insert(secret_arn.to_string(), value);
    }
}

#[async_trait]
impl SecretsClient for InMemorySecrets {
    async fn get_secret_json(&self, secret_arn: &str) -> Result<Value, ClientError> {
        self.secrets
            .lock()
            .get(secret_arn)
            .cloned()
            .ok_or_else(|| ClientError::new(format!("no such secret: {secret_arn}")))
    }
}

/// Convenience: a [`ConnectionAuthType::Basic`] connection config pointing
/// at `secret_arn`.
#[must_use]
pub fn basic_auth_connection(secret_arn: &str) -> ConnectionConfig {
    ConnectionConfig {
        authorization_type: ConnectionAuthType::Basic,
        secret_arn: secret_arn.to_string(),
    }
}

/// Convenience: an [`ConnectionAuthType::ApiKey`] connection config pointing
/// at `secret_arn`.
#[must_use]
pub fn api_key_connection(secret_arn: &str) -> ConnectionConfig {
    ConnectionConfig {
        authorization_type: ConnectionAuthType::ApiKey,
        secret_arn: secret_arn.to_string(),
    }
}
