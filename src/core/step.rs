//! Step domain model

use crate::execution::failure::StepError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Direction a pipeline pass is travelling in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward pass (`begin`)
    Up,
    /// Compensating pass (`rollback`)
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key a step is registered under
///
/// Named steps use their name; unnamed steps get the next insertion index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepKey {
    Index(usize),
    Named(String),
}

impl StepKey {
    /// The name, if this key is a named one
    pub fn as_name(&self) -> Option<&str> {
        match self {
            StepKey::Named(name) => Some(name),
            StepKey::Index(_) => None,
        }
    }
}

impl From<&str> for StepKey {
    fn from(name: &str) -> Self {
        StepKey::Named(name.to_string())
    }
}

impl From<String> for StepKey {
    fn from(name: String) -> Self {
        StepKey::Named(name)
    }
}

impl From<usize> for StepKey {
    fn from(index: usize) -> Self {
        StepKey::Index(index)
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKey::Index(index) => write!(f, "#{}", index),
            StepKey::Named(name) => f.write_str(name),
        }
    }
}

/// Closure attached to a step for one direction
pub type StepFn = Box<dyn Fn(Value, &Step) -> anyhow::Result<Value>>;

/// Behaviour of a step, for steps defined as their own type
///
/// Every method has a default, so an implementation only overrides what it
/// needs. The `up`/`down` defaults fail with [`StepError::NotImplemented`].
pub trait StepAction {
    /// Name the step is registered under when built with [`Step::from_action`]
    fn name(&self) -> Option<&str> {
        None
    }

    /// Whether the step should run in the current environment.
    ///
    /// Checked on every pass, never cached.
    fn is_enabled(&self) -> bool {
        true
    }

    fn up(&self, _previous: Value, _step: &Step) -> anyhow::Result<Value> {
        Err(StepError::NotImplemented {
            direction: Direction::Up,
        }
        .into())
    }

    fn down(&self, _previous: Value, _step: &Step) -> anyhow::Result<Value> {
        Err(StepError::NotImplemented {
            direction: Direction::Down,
        }
        .into())
    }
}

/// Action of a step that has only closures (or nothing) attached
#[derive(Debug, Clone, Copy, Default)]
pub struct Unimplemented;

impl StepAction for Unimplemented {}

/// A single reversible step in a pipeline
pub struct Step {
    /// Step name (unnamed steps are positional)
    name: Option<String>,

    /// Behaviour used when no closure is attached
    action: Box<dyn StepAction>,

    /// Overrides `action.up` when set
    up_fn: Option<StepFn>,

    /// Overrides `action.down` when set
    down_fn: Option<StepFn>,

    /// Id of the pipeline the step was added to
    pipeline: Option<Uuid>,
}

impl Step {
    /// Create an unnamed step with no behaviour attached
    pub fn new() -> Self {
        Self {
            name: None,
            action: Box::new(Unimplemented),
            up_fn: None,
            down_fn: None,
            pipeline: None,
        }
    }

    /// Create a named step with no behaviour attached
    pub fn named(name: impl Into<String>) -> Self {
        let mut step = Self::new();
        step.name = Some(name.into());
        step
    }

    /// Create a step backed by a [`StepAction`] implementation
    pub fn from_action<A: StepAction + 'static>(action: A) -> Self {
        let name = action.name().map(str::to_string);
        Self {
            name,
            action: Box::new(action),
            up_fn: None,
            down_fn: None,
            pipeline: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Id of the owning pipeline, once the step has been added to one
    pub fn pipeline(&self) -> Option<Uuid> {
        self.pipeline
    }

    pub(crate) fn set_pipeline(&mut self, id: Uuid) {
        self.pipeline = Some(id);
    }

    pub fn is_enabled(&self) -> bool {
        self.action.is_enabled()
    }

    /// Attach the forward closure, replacing the action's `up`
    pub fn on_up<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &Step) -> anyhow::Result<Value> + 'static,
    {
        self.up_fn = Some(Box::new(f));
        self
    }

    /// Attach the compensating closure, replacing the action's `down`
    pub fn on_down<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &Step) -> anyhow::Result<Value> + 'static,
    {
        self.down_fn = Some(Box::new(f));
        self
    }

    /// Owned variant of [`Step::on_up`] for building steps before adding them
    pub fn with_up<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &Step) -> anyhow::Result<Value> + 'static,
    {
        self.on_up(f);
        self
    }

    /// Owned variant of [`Step::on_down`]
    pub fn with_down<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &Step) -> anyhow::Result<Value> + 'static,
    {
        self.on_down(f);
        self
    }

    /// Run the step in the given direction
    ///
    /// An attached closure wins over the action's method.
    pub fn run(&self, direction: Direction, previous: Value) -> anyhow::Result<Value> {
        match direction {
            Direction::Up => match &self.up_fn {
                Some(f) => f(previous, self),
                None => self.action.up(previous, self),
            },
            Direction::Down => match &self.down_fn {
                Some(f) => f(previous, self),
                None => self.action.down(previous, self),
            },
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("has_up", &self.up_fn.is_some())
            .field("has_down", &self.down_fn.is_some())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
