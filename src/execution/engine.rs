//! Forward and compensating passes over a pipeline

use crate::{
    core::{Direction, HookPhase, HookRegistry, Pipeline, RunSummary, Step, StepKey},
    execution::failure::{PipelineError, StepFailure},
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Run one step with its pre and post hooks, threading the value through all three
fn apply(
    hooks: &HookRegistry,
    step: &Step,
    direction: Direction,
    previous: Value,
) -> anyhow::Result<Value> {
    let previous = hooks.run(HookPhase::Pre, direction, previous, step)?;
    let previous = step.run(direction, previous)?;
    hooks.run(HookPhase::Post, direction, previous, step)
}

impl Pipeline {
    /// Run every enabled step forward, in registration order
    ///
    /// Returns the value produced by the last step (or hook). On failure the
    /// failing step's key is remembered so that a following [`rollback`]
    /// compensates exactly the steps that completed.
    ///
    /// [`rollback`]: Pipeline::rollback
    pub fn begin(&mut self) -> Result<Value, PipelineError> {
        self.run_forward(None)
    }

    /// Run forward starting at `start` (inclusive), skipping earlier steps
    pub fn begin_from(&mut self, start: impl Into<StepKey>) -> Result<Value, PipelineError> {
        self.run_forward(Some(start.into()))
    }

    /// Run the compensating actions in reverse registration order
    ///
    /// After a failed [`begin`](Pipeline::begin) this starts just before the
    /// failing step. After a `begin_from(k)` it never goes past step `k`,
    /// whether or not `k` itself ran.
    pub fn rollback(&mut self) -> Result<Value, PipelineError> {
        self.run_backward(None)
    }

    /// Roll back only the steps registered before `stop`
    pub fn rollback_from(&mut self, stop: impl Into<StepKey>) -> Result<Value, PipelineError> {
        self.run_backward(Some(stop.into()))
    }

    fn ensure_initialized(&mut self) -> Result<(), PipelineError> {
        if self.initialized {
            return Ok(());
        }

        if let Some(mut init) = self.initializer.take() {
            debug!("Initializing pipeline: {}", self.name);
            if let Err(e) = init(self) {
                self.initializer = Some(init);
                return Err(PipelineError::Initialization(e));
            }
        }
        self.initialized = true;
        Ok(())
    }

    fn is_active(&self, step: &Step) -> bool {
        step.is_enabled() && !self.is_disabled_by_config(step)
    }

    fn run_forward(&mut self, start: Option<StepKey>) -> Result<Value, PipelineError> {
        self.ensure_initialized()?;

        let mut previous = Value::Null;
        self.last_failed_key = None;
        self.last_start_key = start.clone();

        match &start {
            Some(key) => info!("Beginning pipeline {} from step {}", self.name, key),
            None => info!("Beginning pipeline {}", self.name),
        }
        let mut run = RunSummary::start(Direction::Up);
        let mut armed = start.is_none();

        for (key, step) in self.steps.iter() {
            if !armed && start.as_ref() == Some(key) {
                armed = true;
            }

            if !self.is_active(step) || !armed {
                debug!("Skipping step {}", key);
                continue;
            }

            debug!("Running step {} up", key);
            match apply(&self.hooks, step, Direction::Up, previous) {
                Ok(value) => {
                    previous = value;
                    run.record(key.clone());
                }
                Err(cause) => {
                    warn!("Step {} failed while running up: {}", key, cause);
                    let failure = StepFailure::new(key.clone(), step, Direction::Up, cause);
                    run.fail(key.clone());
                    self.last_failed_key = Some(key.clone());
                    self.last_run = Some(run);
                    return Err(failure.into());
                }
            }
        }

        run.complete();
        info!(
            "Pipeline {} completed: {} step(s) ran",
            self.name,
            run.executed.len()
        );
        self.last_run = Some(run);
        Ok(previous)
    }

    fn run_backward(&mut self, stop: Option<StepKey>) -> Result<Value, PipelineError> {
        self.ensure_initialized()?;

        let mut previous = Value::Null;
        let stop = stop.or_else(|| self.last_failed_key.clone());

        match &stop {
            Some(key) => info!("Rolling back pipeline {} before step {}", self.name, key),
            None => info!("Rolling back pipeline {}", self.name),
        }
        let mut run = RunSummary::start(Direction::Down);
        let mut armed = stop.is_none();

        for (key, step) in self.steps.iter().rev() {
            if !armed && stop.as_ref() == Some(key) {
                // The stop step itself never runs its compensator
                armed = true;
                debug!("Skipping stop step {}", key);
            } else if !self.is_active(step) || !armed {
                debug!("Skipping step {}", key);
            } else {
                debug!("Running step {} down", key);
                match apply(&self.hooks, step, Direction::Down, previous) {
                    Ok(value) => {
                        previous = value;
                        run.record(key.clone());
                    }
                    Err(cause) => {
                        warn!("Step {} failed while running down: {}", key, cause);
                        let failure = StepFailure::new(key.clone(), step, Direction::Down, cause);
                        run.fail(key.clone());
                        self.last_run = Some(run);
                        return Err(failure.into());
                    }
                }
            }

            // Nothing before the forward start ran, whether or not this step did
            if self.last_start_key.as_ref() == Some(key) {
                debug!("Reached resume boundary {}", key);
                break;
            }
        }

        run.complete();
        info!(
            "Pipeline {} rolled back: {} step(s) compensated",
            self.name,
            run.executed.len()
        );
        self.last_run = Some(run);
        Ok(previous)
    }
}
