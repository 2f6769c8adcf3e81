//! rewind - a reversible step pipeline
//!
//! Register steps with a forward (`up`) and compensating (`down`) action,
//! run them with [`Pipeline::begin`], and undo whatever actually ran with
//! [`Pipeline::rollback`].

pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::config::PipelineConfig;
pub use crate::core::{Direction, HookPhase, HookPoint, Pipeline, RunStatus, RunSummary, Step, StepAction, StepKey};
pub use crate::execution::{PipelineError, StepError, StepFailure};
