//! Dispatches a target ARN to its [`super::PipeTarget`] implementation,
//! grounded on `targets/target_factory.py`'s `TargetServiceFactory`.

use super::{HttpDestinationTarget, KinesisTarget, PipeTarget, SqsTarget};
use crate::arn::service_from_arn;
use crate::clients::ClientBundle;
use crate::errors::PipesError;
use crate::params::{
    HttpTargetParameters, KinesisTargetParameters, SqsTargetParameters, TargetParameters,
    TargetServiceParameters,
};
use std::sync::Arc;

/// Builds the [`PipeTarget`] for a pipe's configured `target` ARN.
pub struct TargetFactory;

impl TargetFactory {
    /// Creates a target adapter for `target_arn`, using `target_parameters`
    /// when present or each service's defaults otherwise.
    ///
    /// # Errors
    /// Returns [`PipesError::validation`] when the ARN's service segment has
    /// no corresponding target adapter.
    pub fn create(
        target_arn: &str,
        target_parameters: Option<&TargetParameters>,
        clients: &ClientBundle,
    ) -> Result<Arc<dyn PipeTarget>, PipesError> {
        let service = target_parameters.map(|p| &p.service);

        match service_from_arn(target_arn) {
            "sqs" => {
                let params = match service {
                    Some(TargetServiceParameters::Sqs(p)) => p.clone(),
                    _ => SqsTargetParameters::default(),
                };
                Ok(Arc::new(SqsTarget::new(clients.queue.clone(), target_arn, params)))
            }
            "kinesis" => {
                let params = match service {
                    Some(TargetServiceParameters::Kinesis(p)) => p.clone(),
                    _ => KinesisTargetParameters::default(),
                };
                Ok(Arc::new(KinesisTarget::new(
                    clients.stream.clone(),
                    target_arn,
                    params,
                )))
            }
            "events" => {
                let params = match service {
                    Some(TargetServiceParameters::Http(p)) => p.clone(),
                    _ => HttpTargetParameters::default(),
                };
                let name = api_destination_name_from_arn(target_arn);
                Ok(Arc::new(HttpDestinationTarget::new(
                    clients.http.clone(),
                    clients.connections.clone(),
                    clients.secrets.clone(),
                    name,
                    params,
                )))
            }
            other => Err(PipesError::validation(format!(
                "target service '{other}' is not supported"
            ))),
        }
    }
}

fn api_destination_name_from_arn(arn: &str) -> String {
    arn.split("api-destination/")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(arn)
        .to_string()
}
