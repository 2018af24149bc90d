//! Builders for sample pipe entities used across unit and integration tests.

use crate::model::{PipeEntity, PipeState, RequestedPipeState};
use crate::params::{SqsTargetParameters, TargetParameters, TargetServiceParameters};
use chrono::Utc;

/// A minimal valid queue-to-queue pipe, ready to hand to
/// [`crate::worker_factory::WorkerFactory`].
#[must_use]
pub fn sample_pipe(name: &str) -> PipeEntity {
    let now = Utc::now();
    PipeEntity {
        name: name.to_string(),
        account_id: "000000000000".to_string(),
        region: "us-east-1".to_string(),
        source: format!("arn:aws:sqs:us-east-1:000000000000:{name}-src"),
        target: format!("arn:aws:sqs:us-east-1:000000000000:{name}-dst"),
        role_arn: "arn:aws:iam::000000000000:role/pipes-role".to_string(),
        description: None,
        kms_key_identifier: None,
        log_configuration: None,
        enrichment: None,
        enrichment_parameters: None,
        source_parameters: None,
        target_parameters: Some(TargetParameters::new(TargetServiceParameters::Sqs(
            SqsTargetParameters::default(),
        ))),
        desired_state: RequestedPipeState::Running,
        current_state: PipeState::Creating,
        state_reason: None,
        tags: None,
        creation_time: now,
        last_modified_time: now,
    }
}
