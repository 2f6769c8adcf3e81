//! Run state models

use crate::core::step::{Direction, StepKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single `begin` or `rollback` pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Pass is in progress
    Running,
    /// Every eligible step ran
    Completed,
    /// A step or hook failed and the pass stopped
    Failed,
}

/// Summary of the most recent pass over a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique id of this pass
    pub execution_id: Uuid,

    /// Which way the pass ran
    pub direction: Direction,

    pub status: RunStatus,

    pub started_at: DateTime<Utc>,

    /// When the pass completed or failed
    pub completed_at: Option<DateTime<Utc>>,

    /// Keys of the steps that ran to completion, in execution order
    pub executed: Vec<StepKey>,

    /// Key of the step that failed, if any
    pub failed: Option<StepKey>,
}

impl RunSummary {
    /// Start tracking a new pass
    pub fn start(direction: Direction) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            direction,
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            executed: Vec::new(),
            failed: None,
        }
    }

    pub fn record(&mut self, key: StepKey) {
        self.executed.push(key);
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, key: StepKey) {
        self.status = RunStatus::Failed;
        self.failed = Some(key);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn has_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    /// Wall-clock duration, once the pass has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}
