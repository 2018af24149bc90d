//! The pipe data model: [`PipeEntity`] and its state enums.

use crate::arn::pipe_arn;
use crate::params::{SourceParameters, TargetParameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-requested lifecycle target for a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestedPipeState {
    /// The pipe should have an active worker.
    Running,
    /// The pipe should have no worker.
    Stopped,
    /// The pipe has been deleted.
    Deleted,
}

/// Observed lifecycle phase of a pipe, driven by the worker and control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipeState {
    /// The entity was just created; no worker decision made yet.
    Creating,
    /// A worker is being started.
    Starting,
    /// The worker's poll loop is active.
    Running,
    /// The worker has been signaled to stop and is unwinding.
    Stopping,
    /// No worker is running.
    Stopped,
    /// An update is being applied and the worker is being rebuilt.
    Updating,
    /// The entity is being removed from the registry.
    Deleting,
    /// Worker construction failed at create time.
    CreateFailed,
    /// Worker teardown failed at stop time.
    StopFailed,
}

/// String tag map attached to a pipe, mirrored into the cross-region tag
/// service and onto the entity itself.
pub type Tags = HashMap<String, String>;

/// One pipe within an (account, region) scope.
///
/// `arn` is intentionally not a stored field (invariant 5): it is always
/// recomputed from `name`/`account_id`/`region`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeEntity {
    /// Pipe name, unique within (account, region).
    pub name: String,
    /// Owning account id.
    pub account_id: String,
    /// Owning region.
    pub region: String,
    /// Source ARN or URL.
    pub source: String,
    /// Target ARN.
    pub target: String,
    /// IAM role ARN assumed for both source and target access.
    pub role_arn: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// KMS key identifier, opaque pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_identifier: Option<String>,
    /// Log configuration, opaque pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_configuration: Option<serde_json::Value>,
    /// Enrichment target ARN. Stored but never invoked (see DESIGN.md).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<String>,
    /// Enrichment parameters, opaque pass-through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_parameters: Option<serde_json::Value>,
    /// Source-service-specific configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_parameters: Option<SourceParameters>,
    /// Target-service-specific configuration plus the input template envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_parameters: Option<TargetParameters>,
    /// User-requested lifecycle target.
    pub desired_state: RequestedPipeState,
    /// Observed lifecycle phase.
    pub current_state: PipeState,
    /// Free-text explanation for the current state, set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    /// Resource tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    /// When the pipe was created. Set once.
    pub creation_time: DateTime<Utc>,
    /// When the pipe was last mutated. Updated on every control-plane mutation.
    pub last_modified_time: DateTime<Utc>,
}

impl PipeEntity {
    /// The pipe's fully-qualified ARN, computed from `name`/`account_id`/`region`.
    #[must_use]
    pub fn arn(&self) -> String {
        pipe_arn(&self.name, &self.account_id, &self.region)
    }

    /// Marks the entity as mutated now.
    pub fn touch(&mut self) {
        self.last_modified_time = Utc::now();
    }
}
