//! Assembles a [`PipeWorker`] from a [`PipeEntity`], grounded on
//! `pipe_worker_factory.py`'s `PipeWorkerFactory.create`.

use crate::clients::ClientFactory;
use crate::errors::PipesError;
use crate::model::PipeEntity;
use crate::sources::SourceFactory;
use crate::targets::TargetFactory;
use crate::transformer::InputTransformer;
use crate::worker::PipeWorker;

/// Builds a ready-to-start [`PipeWorker`] for one pipe entity.
pub struct WorkerFactory;

impl WorkerFactory {
    /// Creates a worker for `pipe`, in six steps mirroring the original
    /// factory: resolve a client bundle scoped to the pipe's role, build the
    /// source poller, build the target, build the optional input
    /// transformer, validate the combination is supported, and finally hand
    /// back a started [`PipeWorker`].
    ///
    /// # Errors
    /// Returns [`PipesError::validation`] if the source or target ARN names
    /// an unsupported service.
    pub fn create(
        pipe: &PipeEntity,
        clients: &dyn ClientFactory,
    ) -> Result<PipeWorker, PipesError> {
        let bundle = clients.for_role(&pipe.role_arn);

        let poller = SourceFactory::create(
            &pipe.source,
            pipe.source_parameters.as_ref(),
            &bundle,
        )?;

        let target = TargetFactory::create(
            &pipe.target,
            pipe.target_parameters.as_ref(),
            &bundle,
        )?;

        let transformer = pipe
            .target_parameters
            .as_ref()
            .and_then(|params| params.input_template.as_ref())
            .map(|template| {
                InputTransformer::new(
                    template.clone(),
                    pipe.arn(),
                    pipe.name.clone(),
                    pipe.source.clone(),
                    pipe.target.clone(),
                )
            });

        Ok(PipeWorker::start(
            pipe.name.clone(),
            poller,
            transformer,
            target,
        ))
    }
}
