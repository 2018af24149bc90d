//! Tagged-variant parameter groups for sources and targets.
//!
//! The external request shape keys these by literal group name
//! (`SqsQueueParameters`, `KinesisStreamParameters`, ...); this module is
//! the one place that shape gets turned into a proper Rust enum, per the
//! "keep parsing centralized in the factories" guidance for dynamic
//! parameter groups.

use serde::{Deserialize, Serialize};

/// Starting position for a shard-based source (stream or change-data-capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartingPosition {
    /// Start from the oldest available record.
    TrimHorizon,
    /// Start from the newest record going forward.
    Latest,
    /// Start at a specific sequence number (not modeled further here).
    AtSequenceNumber,
}

impl Default for StartingPosition {
    fn default() -> Self {
        Self::TrimHorizon
    }
}

/// `SqsQueueParameters` source configuration (currently unused by the
/// queue poller beyond presence, kept for parity with the request shape).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqsSourceParameters {}

/// `KinesisStreamParameters` / `DynamoDBStreamParameters` source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSourceParameters {
    /// Where to start reading each shard from.
    #[serde(default)]
    pub starting_position: StartingPosition,
    /// Maximum records to pull per shard per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_batch_size() -> u32 {
    100
}

impl Default for StreamSourceParameters {
    fn default() -> Self {
        Self {
            starting_position: StartingPosition::default(),
            batch_size: default_batch_size(),
        }
    }
}

/// Per-service source parameter groups, keyed by the source ARN's service
/// segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum SourceParameters {
    /// `sqs` source.
    Sqs(SqsSourceParameters),
    /// `kinesis` source.
    Kinesis(StreamSourceParameters),
    /// `dynamodb` (change-data-capture) source.
    DynamoDb(StreamSourceParameters),
}

impl SourceParameters {
    /// The stream parameters, if this is a shard-based source.
    #[must_use]
    pub fn as_stream(&self) -> Option<&StreamSourceParameters> {
        match self {
            Self::Kinesis(p) | Self::DynamoDb(p) => Some(p),
            Self::Sqs(_) => None,
        }
    }
}

/// `SqsQueueParameters` target configuration: FIFO-queue extras.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqsTargetParameters {
    /// FIFO message group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_group_id: Option<String>,
    /// FIFO deduplication id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_deduplication_id: Option<String>,
}

/// `KinesisStreamParameters` target configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinesisTargetParameters {
    /// Partition key applied to every record sent to this target.
    #[serde(default = "default_partition_key")]
    pub partition_key: String,
}

fn default_partition_key() -> String {
    "default".to_string()
}

impl Default for KinesisTargetParameters {
    fn default() -> Self {
        Self {
            partition_key: default_partition_key(),
        }
    }
}

/// A single HTTP parameter override, applied to header, query string, or
/// path template depending on which bucket it's listed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpParameter {
    /// Parameter key (header name, query key, or path placeholder name).
    pub key: String,
    /// Parameter value.
    pub value: String,
    /// Whether this key should be removed from the final request instead
    /// of added/overridden.
    #[serde(default)]
    pub is_value_secret: bool,
}

/// `HttpParameters` target configuration for API-destination targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpTargetParameters {
    /// Extra headers to merge onto the request.
    #[serde(default)]
    pub header_parameters: Vec<HttpParameter>,
    /// Extra query-string parameters to merge onto the endpoint URL.
    #[serde(default)]
    pub query_string_parameters: Vec<HttpParameter>,
    /// Path-template parameters (`*` placeholders in the destination URL).
    #[serde(default)]
    pub path_parameter_values: Vec<String>,
}

/// Per-service target parameter groups, plus the shared `InputTemplate`
/// envelope field that sits alongside them regardless of target service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetParameters {
    /// Free-form placeholder template applied before dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_template: Option<String>,
    /// The service-specific parameter group.
    #[serde(flatten)]
    pub service: TargetServiceParameters,
}

/// The service-specific half of [`TargetParameters`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum TargetServiceParameters {
    /// `sqs` target.
    Sqs(SqsTargetParameters),
    /// `kinesis` target.
    Kinesis(KinesisTargetParameters),
    /// `events` (API destination) target.
    Http(HttpTargetParameters),
}

impl TargetParameters {
    /// Builds target parameters with no input template and the given
    /// service parameters.
    #[must_use]
    pub fn new(service: TargetServiceParameters) -> Self {
        Self {
            input_template: None,
            service,
        }
    }

    /// Attaches an input template.
    #[must_use]
    pub fn with_input_template(mut self, template: impl Into<String>) -> Self {
        self.input_template = Some(template.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_source_parameters_default_to_trim_horizon_and_100() {
        let params = StreamSourceParameters::default();
        assert_eq!(params.starting_position, StartingPosition::TrimHorizon);
        assert_eq!(params.batch_size, 100);
    }

    #[test]
    fn kinesis_target_parameters_default_partition_key() {
        let params = KinesisTargetParameters::default();
        assert_eq!(params.partition_key, "default");
    }

    #[test]
    fn target_parameters_builder_attaches_template() {
        let params = TargetParameters::new(TargetServiceParameters::Sqs(
            SqsTargetParameters::default(),
        ))
        .with_input_template("<aws.pipes.event.json>");

        assert_eq!(
            params.input_template.as_deref(),
            Some("<aws.pipes.event.json>")
        );
    }
}
