//! Core domain models
//!
//! Steps, hook points, the step registry and per-run state. The `begin` and
//! `rollback` passes live in [`crate::execution`].

pub mod config;
pub mod hooks;
pub mod pipeline;
pub mod state;
pub mod step;

pub use hooks::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
