//! Control-plane operations: create/describe/list/update/start/stop/delete
//! a pipe, plus the cross-region tagging operations.
//!
//! Grounded on `provider.py`'s `PipesProvider`, which is itself a thin
//! adapter over the same [`crate::store::PipesRegistry`] and
//! [`crate::worker_factory::WorkerFactory`] this module drives directly.

use crate::arn::{account_from_arn, pipe_name_from_arn, region_from_arn, service_from_arn};
use crate::clients::ClientFactory;
use crate::errors::PipesError;
use crate::model::{PipeEntity, PipeState, RequestedPipeState, Tags};
use crate::store::PipesRegistry;
use crate::worker_factory::WorkerFactory;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Request payload for [`ControlPlane::create_pipe`].
pub struct CreatePipeRequest {
    /// Pipe name, unique within `(account_id, region)`.
    pub name: String,
    /// Owning account id.
    pub account_id: String,
    /// Owning region.
    pub region: String,
    /// Source ARN or URL.
    pub source: String,
    /// Target ARN.
    pub target: String,
    /// IAM role ARN assumed for source and target access.
    pub role_arn: String,
    /// Free-text description.
    pub description: Option<String>,
    /// KMS key identifier, opaque pass-through.
    pub kms_key_identifier: Option<String>,
    /// Log configuration, opaque pass-through.
    pub log_configuration: Option<Value>,
    /// Enrichment target ARN. Stored but never invoked (see DESIGN.md).
    pub enrichment: Option<String>,
    /// Enrichment parameters, opaque pass-through.
    pub enrichment_parameters: Option<Value>,
    /// Source-service-specific configuration.
    pub source_parameters: Option<crate::params::SourceParameters>,
    /// Target-service-specific configuration plus input template.
    pub target_parameters: Option<crate::params::TargetParameters>,
    /// Requested lifecycle state; defaults to `Running` if `None`.
    pub desired_state: Option<RequestedPipeState>,
    /// Resource tags applied at creation.
    pub tags: Option<Tags>,
}

/// Request payload for [`ControlPlane::update_pipe`]. Every field is an
/// optional override; `None` leaves the existing value untouched.
#[derive(Default)]
pub struct UpdatePipeRequest {
    /// New source ARN or URL.
    pub source: Option<String>,
    /// New target ARN.
    pub target: Option<String>,
    /// New role ARN.
    pub role_arn: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New KMS key identifier.
    pub kms_key_identifier: Option<String>,
    /// New log configuration.
    pub log_configuration: Option<Value>,
    /// New enrichment target ARN.
    pub enrichment: Option<String>,
    /// New enrichment parameters.
    pub enrichment_parameters: Option<Value>,
    /// New source parameters.
    pub source_parameters: Option<crate::params::SourceParameters>,
    /// New target parameters.
    pub target_parameters: Option<crate::params::TargetParameters>,
    /// New desired lifecycle state.
    pub desired_state: Option<RequestedPipeState>,
}

/// Filters accepted by [`ControlPlane::list_pipes`], applied as a
/// conjunction (all provided filters must match).
#[derive(Debug, Clone, Default)]
pub struct ListPipesFilter {
    /// Pipe name must start with this prefix.
    pub name_prefix: Option<String>,
    /// Desired state must equal this value.
    pub desired_state: Option<RequestedPipeState>,
    /// Current state must equal this value.
    pub current_state: Option<PipeState>,
    /// Source ARN must start with this prefix.
    pub source_prefix: Option<String>,
    /// Target ARN must start with this prefix.
    pub target_prefix: Option<String>,
    /// Maximum results to return; capped at 100 regardless of the value
    /// given here, matching the real API's page size ceiling.
    pub limit: Option<u32>,
}

const MAX_LIST_LIMIT: usize = 100;

/// Owns the [`PipesRegistry`] and exposes the pipe lifecycle operations
/// against it.
pub struct ControlPlane {
    registry: Arc<PipesRegistry>,
    clients: Arc<dyn ClientFactory>,
}

impl ControlPlane {
    /// Builds a control plane over a fresh, empty registry.
    #[must_use]
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            registry: Arc::new(PipesRegistry::new()),
            clients,
        }
    }

    fn locate(&self, arn: &str) -> Result<(String, String, String), PipesError> {
        if service_from_arn(arn) != "pipes" {
            return Err(PipesError::validation(format!(
                "'{arn}' is not a pipe ARN"
            )));
        }
        Ok((
            account_from_arn(arn).to_string(),
            region_from_arn(arn).to_string(),
            pipe_name_from_arn(arn),
        ))
    }

    /// Creates a pipe. If `desired_state` is `Running` (the default), a
    /// worker is started immediately; on worker-construction failure the
    /// pipe is still created, landing in `CreateFailed` with `state_reason`
    /// set, rather than failing the whole request.
    ///
    /// # Errors
    /// [`PipesError::validation`] on a malformed name; [`PipesError::conflict`]
    /// if a pipe with this name already exists in the account/region.
    pub fn create_pipe(&self, req: CreatePipeRequest) -> Result<PipeEntity, PipesError> {
        crate::arn::validate_pipe_name(&req.name)?;
        let partition = self.registry.partition(&req.account_id, &req.region);

        if partition.pipes.contains_key(&req.name) {
            return Err(PipesError::conflict(
                req.name.clone(),
                format!("Pipe {} already exists", req.name),
            ));
        }

        let now = Utc::now();
        let mut entity = PipeEntity {
            name: req.name.clone(),
            account_id: req.account_id,
            region: req.region,
            source: req.source,
            target: req.target,
            role_arn: req.role_arn,
            description: req.description,
            kms_key_identifier: req.kms_key_identifier,
            log_configuration: req.log_configuration,
            enrichment: req.enrichment,
            enrichment_parameters: req.enrichment_parameters,
            source_parameters: req.source_parameters,
            target_parameters: req.target_parameters,
            desired_state: req.desired_state.unwrap_or(RequestedPipeState::Running),
            current_state: PipeState::Creating,
            state_reason: None,
            tags: req.tags.clone(),
            creation_time: now,
            last_modified_time: now,
        };

        if let Some(tags) = req.tags {
            self.registry.put_tags(&entity.arn(), tags);
        }

        if entity.desired_state == RequestedPipeState::Running {
            match WorkerFactory::create(&entity, self.clients.as_ref()) {
                Ok(worker) => {
                    partition.workers.insert(entity.name.clone(), worker);
                    entity.current_state = PipeState::Running;
                }
                Err(err) => {
                    entity.current_state = PipeState::CreateFailed;
                    entity.state_reason = Some(err.to_string());
                }
            }
        } else {
            entity.current_state = PipeState::Stopped;
        }

        partition.pipes.insert(entity.name.clone(), entity.clone());
        Ok(entity)
    }

    /// Looks up one pipe by name.
    ///
    /// # Errors
    /// [`PipesError::not_found`] if no such pipe exists.
    pub fn describe_pipe(
        &self,
        account_id: &str,
        region: &str,
        name: &str,
    ) -> Result<PipeEntity, PipesError> {
        self.registry
            .partition(account_id, region)
            .pipes
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(name))
    }

    /// Lists pipes in `(account_id, region)` matching `filter`, sorted by
    /// name for stable pagination-free output. `next_token` is accepted by
    /// callers but this registry has no pagination state to resume from.
    #[must_use]
    pub fn list_pipes(
        &self,
        account_id: &str,
        region: &str,
        filter: &ListPipesFilter,
    ) -> Vec<PipeEntity> {
        let partition = self.registry.partition(account_id, region);
        let mut matched: Vec<PipeEntity> = partition
            .pipes
            .iter()
            .map(|e| e.value().clone())
            .filter(|p| {
                filter
                    .name_prefix
                    .as_deref()
                    .map_or(true, |prefix| p.name.starts_with(prefix))
            })
            .filter(|p| filter.desired_state.map_or(true, |s| p.desired_state == s))
            .filter(|p| filter.current_state.map_or(true, |s| p.current_state == s))
            .filter(|p| {
                filter
                    .source_prefix
                    .as_deref()
                    .map_or(true, |prefix| p.source.starts_with(prefix))
            })
            .filter(|p| {
                filter
                    .target_prefix
                    .as_deref()
                    .map_or(true, |prefix| p.target.starts_with(prefix))
            })
            .collect();

        matched.sort_by(|a, b| a.name.cmp(&b.name));
        let limit = filter
            .limit
            .map_or(MAX_LIST_LIMIT, |l| (l as usize).min(MAX_LIST_LIMIT));
        matched.truncate(limit);
        matched
    }

    /// Applies `req` to an existing pipe: the worker is stopped first (if
    /// running), the overrides are applied, and then a new worker is
    /// started if the resulting `desired_state` is `Running`.
    ///
    /// # Errors
    /// [`PipesError::not_found`] if no such pipe exists.
    pub async fn update_pipe(
        &self,
        account_id: &str,
        region: &str,
        name: &str,
        req: UpdatePipeRequest,
    ) -> Result<PipeEntity, PipesError> {
        let partition = self.registry.partition(account_id, region);
        let mut entity = partition
            .pipes
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(name))?;

        entity.current_state = PipeState::Updating;
        partition.pipes.insert(name.to_string(), entity.clone());

        if let Some((_, worker)) = partition.workers.remove(name) {
            worker.stop("pipe update").await;
        }

        if let Some(source) = req.source {
            entity.source = source;
        }
        if let Some(target) = req.target {
            entity.target = target;
        }
        if let Some(role_arn) = req.role_arn {
            entity.role_arn = role_arn;
        }
        if let Some(description) = req.description {
            entity.description = Some(description);
        }
        if let Some(kms) = req.kms_key_identifier {
            entity.kms_key_identifier = Some(kms);
        }
        if let Some(log_configuration) = req.log_configuration {
            entity.log_configuration = Some(log_configuration);
        }
        if let Some(enrichment) = req.enrichment {
            entity.enrichment = Some(enrichment);
        }
        if let Some(enrichment_parameters) = req.enrichment_parameters {
            entity.enrichment_parameters = Some(enrichment_parameters);
        }
        if let Some(source_parameters) = req.source_parameters {
            entity.source_parameters = Some(source_parameters);
        }
        if let Some(target_parameters) = req.target_parameters {
            entity.target_parameters = Some(target_parameters);
        }
        if let Some(desired_state) = req.desired_state {
            entity.desired_state = desired_state;
        }
        entity.touch();

        match entity.desired_state {
            RequestedPipeState::Running => match WorkerFactory::create(&entity, self.clients.as_ref()) {
                Ok(worker) => {
                    partition.workers.insert(name.to_string(), worker);
                    entity.current_state = PipeState::Running;
                    entity.state_reason = None;
                }
                Err(err) => {
                    entity.current_state = PipeState::CreateFailed;
                    entity.state_reason = Some(err.to_string());
                }
            },
            RequestedPipeState::Stopped | RequestedPipeState::Deleted => {
                entity.current_state = PipeState::Stopped;
            }
        }

        partition.pipes.insert(name.to_string(), entity.clone());
        Ok(entity)
    }

    /// Starts a pipe's worker.
    ///
    /// # Errors
    /// [`PipesError::not_found`] if no such pipe exists;
    /// [`PipesError::conflict`] if the pipe is already running.
    pub async fn start_pipe(
        &self,
        account_id: &str,
        region: &str,
        name: &str,
    ) -> Result<PipeEntity, PipesError> {
        let partition = self.registry.partition(account_id, region);
        let mut entity = partition
            .pipes
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(name))?;

        if entity.current_state == PipeState::Running {
            return Err(PipesError::conflict(
                name.to_string(),
                format!("Pipe {name} is already RUNNING"),
            ));
        }

        entity.current_state = PipeState::Starting;
        entity.desired_state = RequestedPipeState::Running;

        match WorkerFactory::create(&entity, self.clients.as_ref()) {
            Ok(worker) => {
                partition.workers.insert(name.to_string(), worker);
                entity.current_state = PipeState::Running;
                entity.state_reason = None;
            }
            Err(err) => {
                entity.current_state = PipeState::CreateFailed;
                entity.state_reason = Some(err.to_string());
            }
        }
        entity.touch();
        partition.pipes.insert(name.to_string(), entity.clone());
        Ok(entity)
    }

    /// Stops a pipe's worker.
    ///
    /// # Errors
    /// [`PipesError::not_found`] if no such pipe exists;
    /// [`PipesError::conflict`] if the pipe is already stopped.
    pub async fn stop_pipe(
        &self,
        account_id: &str,
        region: &str,
        name: &str,
    ) -> Result<PipeEntity, PipesError> {
        let partition = self.registry.partition(account_id, region);
        let mut entity = partition
            .pipes
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(name))?;

        if entity.current_state == PipeState::Stopped {
            return Err(PipesError::conflict(
                name.to_string(),
                format!("Pipe {name} is already STOPPED"),
            ));
        }

        entity.current_state = PipeState::Stopping;
        entity.desired_state = RequestedPipeState::Stopped;
        partition.pipes.insert(name.to_string(), entity.clone());

        if let Some((_, worker)) = partition.workers.remove(name) {
            worker.stop("stop_pipe requested").await;
        }

        entity.current_state = PipeState::Stopped;
        entity.touch();
        partition.pipes.insert(name.to_string(), entity.clone());
        Ok(entity)
    }

    /// Stops the worker (if any) and removes the pipe and its tags.
    ///
    /// # Errors
    /// [`PipesError::not_found`] if no such pipe exists.
    pub async fn delete_pipe(
        &self,
        account_id: &str,
        region: &str,
        name: &str,
    ) -> Result<PipeEntity, PipesError> {
        let partition = self.registry.partition(account_id, region);
        let mut entity = partition
            .pipes
            .get(name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(name))?;

        entity.current_state = PipeState::Deleting;
        partition.pipes.insert(name.to_string(), entity.clone());

        if let Some((_, worker)) = partition.workers.remove(name) {
            worker.stop("pipe deleted").await;
        }

        partition.pipes.remove(name);
        self.registry.clear_tags(&entity.arn());
        entity.desired_state = RequestedPipeState::Deleted;
        entity.touch();
        Ok(entity)
    }

    /// Merges `tags` onto the resource at `arn`.
    ///
    /// # Errors
    /// [`PipesError::validation`] if `arn` is not a pipe ARN;
    /// [`PipesError::not_found`] if no such pipe exists.
    pub fn tag_resource(&self, arn: &str, tags: Tags) -> Result<(), PipesError> {
        let (account_id, region, name) = self.locate(arn)?;
        let partition = self.registry.partition(&account_id, &region);
        let mut entity = partition
            .pipes
            .get(&name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(&name))?;

        self.registry.put_tags(arn, tags.clone());
        entity.tags.get_or_insert_with(HashMap::new).extend(tags);
        entity.touch();
        partition.pipes.insert(name, entity);
        Ok(())
    }

    /// Removes the given tag keys from the resource at `arn`.
    ///
    /// # Errors
    /// [`PipesError::validation`] if `arn` is not a pipe ARN;
    /// [`PipesError::not_found`] if no such pipe exists.
    pub fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<(), PipesError> {
        let (account_id, region, name) = self.locate(arn)?;
        let partition = self.registry.partition(&account_id, &region);
        let mut entity = partition
            .pipes
            .get(&name)
            .map(|e| e.clone())
            .ok_or_else(|| PipesError::not_found(&name))?;

        self.registry.remove_tags(arn, keys);
        if let Some(tags) = entity.tags.as_mut() {
            for key in keys {
                tags.remove(key);
            }
        }
        entity.touch();
        partition.pipes.insert(name, entity);
        Ok(())
    }

    /// Returns the tags currently attached to the resource at `arn`.
    ///
    /// # Errors
    /// [`PipesError::validation`] if `arn` is not a pipe ARN;
    /// [`PipesError::not_found`] if no such pipe exists.
    pub fn list_tags_for_resource(&self, arn: &str) -> Result<Tags, PipesError> {
        let (account_id, region, name) = self.locate(arn)?;
        if !self
            .registry
            .partition(&account_id, &region)
            .pipes
            .contains_key(&name)
        {
            return Err(PipesError::not_found(&name));
        }
        Ok(self.registry.tags_for(arn))
    }

    /// Stops every running worker across every account/region, running
    /// every stop regardless of whether an earlier one logged a problem.
    /// Intended as the process-shutdown lifecycle hook.
    pub async fn stop_all(&self) {
        for (_key, partition) in self.registry.partitions() {
            let names: Vec<String> = partition.workers.iter().map(|e| e.key().clone()).collect();
            for name in names {
                if let Some((_, worker)) = partition.workers.remove(&name) {
                    worker.stop("process shutting down").await;
                }
            }
        }
    }
}
