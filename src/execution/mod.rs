//! Pipeline execution: the forward and compensating passes

pub mod engine;
pub mod failure;

pub use failure::{PipelineError, StepError, StepFailure};
