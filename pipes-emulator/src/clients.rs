//! Trait boundaries for the out-of-scope external collaborators.
//!
//! Per the design spec §1, the underlying queue/stream servers, the events
//! store's API-destination/connection lookups, the secrets service, and
//! credential issuance are all "treated as remote services behind a
//! client" — this module draws exactly that boundary as async traits, with
//! no production implementation. [`crate::testing`] provides in-memory
//! doubles sufficient to exercise the runtime end-to-end.

use crate::errors::ClientError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One message pulled off a queue poll, paired with a receipt handle used
/// to acknowledge (delete) it after successful processing.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Opaque receipt/ack handle.
    pub receipt_handle: String,
    /// The message body, already JSON-decoded.
    pub body: Value,
}

/// Queue-service client: long-poll receive, delete (ack), send.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Resolves a queue ARN to its invocation URL.
    fn queue_url_for_arn(&self, queue_arn: &str) -> String;

    /// Long-polls for a batch of messages. An empty result is a normal,
    /// non-error outcome — the caller (the poller) maps that to
    /// [`crate::errors::PollError::Empty`].
    async fn receive_messages(&self, queue_url: &str) -> Result<Vec<QueueMessage>, ClientError>;

    /// Deletes (acknowledges) a batch of messages by receipt handle.
    async fn delete_messages(
        &self,
        queue_url: &str,
        receipt_handles: &[String],
    ) -> Result<(), ClientError>;

    /// Sends one message, optionally with FIFO group/dedup ids.
    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        message_group_id: Option<&str>,
        message_deduplication_id: Option<&str>,
    ) -> Result<(), ClientError>;
}

/// One record pulled off a shard poll.
#[derive(Debug, Clone)]
pub struct StreamRecord {
    /// The record's JSON-decoded data payload.
    pub data: Value,
}

/// Opaque shard iterator position, persisted by the poller between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardIteratorPosition(pub String);

/// Stream-service client (Kinesis, or DynamoDB Streams via the same shape):
/// shard discovery, iterator-based reads, and put-record for targets.
#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Lists the shard ids for a stream.
    async fn list_shards(&self, stream_name: &str) -> Result<Vec<String>, ClientError>;

    /// Obtains a starting iterator for a shard at `TRIM_HORIZON`/`LATEST`.
    async fn get_shard_iterator(
        &self,
        stream_name: &str,
        shard_id: &str,
        starting_position: crate::params::StartingPosition,
    ) -> Result<ShardIteratorPosition, ClientError>;

    /// Reads up to `batch_size` records starting at `iterator`, returning
    /// the records and the iterator to resume from on the next poll.
    async fn get_records(
        &self,
        iterator: &ShardIteratorPosition,
        batch_size: u32,
    ) -> Result<(Vec<StreamRecord>, ShardIteratorPosition), ClientError>;

    /// Writes one record with the given partition key.
    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: &[u8],
    ) -> Result<(), ClientError>;
}

/// Authorization shape recovered from a connection, as stored (minus
/// secrets) in the events store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAuthType {
    /// `Authorization: Basic base64(user:pass)`.
    Basic,
    /// A single named API-key header.
    ApiKey,
    /// Accepted, not implemented (spec Non-goal).
    OAuthClientCredentials,
}

/// Public (non-secret) connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Authorization type for this connection.
    pub authorization_type: ConnectionAuthType,
    /// ARN of the secret holding the actual credential values.
    pub secret_arn: String,
}

/// Public API-destination configuration.
#[derive(Debug, Clone)]
pub struct ApiDestinationConfig {
    /// HTTP method to invoke.
    pub http_method: String,
    /// Invocation endpoint URL.
    pub invocation_endpoint: String,
    /// ARN of the connection providing auth, if any.
    pub connection_arn: Option<String>,
}

/// Resolves API-destination and connection configuration from the events
/// store, standing in for `events_client.describe_api_destination` and the
/// connection lookup `api_destination_target.py` performs.
#[async_trait]
pub trait ConnectionResolver: Send + Sync {
    /// Looks up an API destination by name.
    async fn describe_api_destination(
        &self,
        name: &str,
    ) -> Result<ApiDestinationConfig, ClientError>;

    /// Looks up a connection's public configuration by ARN.
    async fn describe_connection(&self, arn: &str) -> Result<ConnectionConfig, ClientError>;
}

/// Fetches the full (secret-bearing) auth parameters for a connection.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Retrieves and JSON-parses the secret at `secret_arn`.
    async fn get_secret_json(&self, secret_arn: &str) -> Result<Value, ClientError>;
}

/// Bundles the client handles a [`crate::worker_factory::WorkerFactory`]
/// needs to assemble a pipe's poller and target. Production wiring (role
/// assumption, service-principal scoping) is out of scope; this bundle is
/// what a `ClientFactory` implementation would hand back already scoped.
#[derive(Clone)]
pub struct ClientBundle {
    /// Queue client used for both `sqs` sources and targets.
    pub queue: Arc<dyn QueueClient>,
    /// Stream client used for both `kinesis`/`dynamodb` sources and `kinesis` targets.
    pub stream: Arc<dyn StreamClient>,
    /// Events-store lookups for HTTP-destination targets.
    pub connections: Arc<dyn ConnectionResolver>,
    /// Secrets lookups for HTTP-destination connection auth.
    pub secrets: Arc<dyn SecretsClient>,
    /// Shared HTTP client used by the HTTP-destination target.
    pub http: reqwest::Client,
}

/// Produces a [`ClientBundle`] scoped to a pipe's role/source/target ARNs.
///
/// Mirrors `get_internal_client(..., role_arn=..., service_principal=...,
/// source_arn=...)` from `pipe_worker_factory.py`: credential issuance and
/// per-service client construction are out of scope, so this trait is the
/// seam a real deployment would implement against STS/the target services.
pub trait ClientFactory: Send + Sync {
    /// Builds (or returns a cached) client bundle for the given role ARN.
    fn for_role(&self, role_arn: &str) -> ClientBundle;
}
