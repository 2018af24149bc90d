//! Error taxonomy for the pipes runtime and its control plane.
//!
//! Mirrors the taxonomy in the design spec: control-plane operations surface
//! [`PipesError`]; the data plane distinguishes customer-caused target
//! failures from internal/transient ones via [`TargetError`] and
//! [`ProcessError`]; pollers distinguish an empty poll from a real failure
//! via [`PollError`].

use thiserror::Error;

/// Errors surfaced by control-plane operations (create/describe/list/...).
#[derive(Debug, Error)]
pub enum PipesError {
    /// Request failed validation (bad name, unsupported target, ...).
    #[error("{0}")]
    Validation(String),

    /// The requested mutation conflicts with existing state.
    #[error("{message}")]
    Conflict {
        /// Human-readable conflict description.
        message: String,
        /// The resource id involved (pipe name).
        resource_id: String,
    },

    /// The named pipe does not exist in this account/region.
    #[error("Pipe {0} does not exist.")]
    NotFound(String),
}

impl PipesError {
    /// Builds a [`PipesError::Validation`] error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a [`PipesError::Conflict`] error.
    #[must_use]
    pub fn conflict(resource_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Builds a [`PipesError::NotFound`] error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

/// Errors raised by a [`crate::targets::PipeTarget`].
#[derive(Debug, Error, Clone)]
pub enum TargetError {
    /// Target-side rejection caused by user misconfiguration: bad ARN,
    /// unsupported operation, 4xx-class response, auth failure. Non-retryable.
    #[error("customer invocation error: {0}")]
    CustomerInvocation(String),

    /// Anything else: network failure, serialization bug, unexpected
    /// upstream 5xx. Retryable by the worker's backoff.
    #[error("internal target error: {0}")]
    Internal(String),
}

/// Errors raised by [`crate::processor::EventProcessor::process_events_batch`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Bubbled through unchanged from the target: non-retryable for this batch.
    #[error(transparent)]
    CustomerInvocation(#[from] CustomerInvocationError),

    /// Wraps any other failure. Retryable; triggers worker backoff.
    #[error("{0}")]
    Internal(String),
}

/// Target-side error indicating user misconfiguration, kept as its own type
/// so it round-trips through [`ProcessError`] without losing its identity.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct CustomerInvocationError(pub String);

impl From<TargetError> for ProcessError {
    fn from(err: TargetError) -> Self {
        match err {
            TargetError::CustomerInvocation(msg) => {
                ProcessError::CustomerInvocation(CustomerInvocationError(msg))
            }
            TargetError::Internal(msg) => ProcessError::Internal(msg),
        }
    }
}

/// Errors raised by a [`crate::sources::Poller`].
#[derive(Debug, Error)]
pub enum PollError {
    /// The poll returned no records. Not a failure: the worker keeps the
    /// base poll interval and does not apply backoff.
    #[error("poll returned no records")]
    Empty,

    /// A [`ProcessError`] surfaced from the processor during this poll.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A failure originating in the source client itself (network, decode,
    /// throttling). Retryable; triggers worker backoff.
    #[error("source poll failed: {0}")]
    Source(String),
}

/// Errors raised by the out-of-scope client collaborators (queue/stream
/// clients, connection resolver, secrets client). Kept deliberately coarse
/// since production implementations of these are out of scope.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct ClientError(pub String);

impl ClientError {
    /// Builds a new client error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
