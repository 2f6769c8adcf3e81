//! Error types for pipeline operations

use crate::core::step::{Direction, Step, StepKey};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a step itself
#[derive(Debug, Error)]
pub enum StepError {
    /// The step has neither a closure nor an action implementation for this direction
    #[error("step has no `{direction}` behaviour: attach a closure or implement StepAction::{direction}")]
    NotImplemented { direction: Direction },
}

/// Errors returned by [`Pipeline`](crate::core::Pipeline) operations
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("The hook `{0}` doesn't exist")]
    UnknownHook(String),

    #[error("Pipeline initialization failed: {0}")]
    Initialization(anyhow::Error),

    #[error(transparent)]
    Execution(#[from] StepFailure),
}

impl PipelineError {
    /// The step failure, if this error came from a `begin`/`rollback` pass
    pub fn as_failure(&self) -> Option<&StepFailure> {
        match self {
            PipelineError::Execution(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A step or one of its hooks failed during a pass
///
/// Carries enough to identify the step (its key, name and owning pipeline)
/// and the direction the pass was running in. The original error is kept as
/// the cause.
#[derive(Debug)]
pub struct StepFailure {
    key: StepKey,
    name: Option<String>,
    pipeline: Option<Uuid>,
    direction: Direction,
    cause: anyhow::Error,
}

impl StepFailure {
    pub fn new(key: StepKey, step: &Step, direction: Direction, cause: anyhow::Error) -> Self {
        Self {
            key,
            name: step.name().map(str::to_string),
            pipeline: step.pipeline(),
            direction,
            cause,
        }
    }

    /// Registry key of the failing step
    pub fn key(&self) -> &StepKey {
        &self.key
    }

    pub fn step_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Id of the pipeline the failing step belongs to
    pub fn pipeline(&self) -> Option<Uuid> {
        self.pipeline
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_up(&self) -> bool {
        self.direction == Direction::Up
    }

    pub fn is_down(&self) -> bool {
        self.direction == Direction::Down
    }

    /// The error raised by the step action or hook
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    pub fn into_cause(self) -> anyhow::Error {
        self.cause
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {} failed while running {}: {}",
            self.key, self.direction, self.cause
        )
    }
}

impl std::error::Error for StepFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause)
    }
}
