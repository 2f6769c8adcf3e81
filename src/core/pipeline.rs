//! Pipeline domain model

use crate::core::{
    config::PipelineConfig,
    hooks::{HookPoint, HookRegistry},
    state::RunSummary,
    step::{Direction, Step, StepKey},
};
use crate::execution::failure::PipelineError;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// One-time setup run before the first `begin` or `rollback`
pub type Initializer = Box<dyn FnMut(&mut Pipeline) -> anyhow::Result<()>>;

/// Ordered step registry
///
/// Behaves like an ordered map: adding a named step whose name is already
/// registered replaces the old step at its original position. Unnamed steps
/// are keyed by an insertion counter that only counts unnamed steps.
#[derive(Debug, Default)]
pub struct StepRegistry {
    entries: Vec<(StepKey, Step)>,
    next_index: usize,
}

impl StepRegistry {
    fn insert(&mut self, step: Step) -> &mut Step {
        let key = match step.name() {
            Some(name) => StepKey::Named(name.to_string()),
            None => {
                let key = StepKey::Index(self.next_index);
                self.next_index += 1;
                key
            }
        };

        let slot = match self.position(&key) {
            Some(pos) => {
                self.entries[pos].1 = step;
                pos
            }
            None => {
                self.entries.push((key, step));
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    /// Position of a key in registration order
    pub fn position(&self, key: &StepKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &StepKey) -> Option<&Step> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn get_named(&self, name: &str) -> Option<&Step> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_name() == Some(name))
            .map(|(_, s)| s)
    }

    pub fn contains(&self, key: &StepKey) -> bool {
        self.position(key).is_some()
    }

    /// Steps in registration order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&StepKey, &Step)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &StepKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A reversible pipeline of steps
pub struct Pipeline {
    /// Identity handed to every step on registration
    pub(crate) id: Uuid,

    /// Pipeline name
    pub name: String,

    pub(crate) steps: StepRegistry,

    pub(crate) hooks: HookRegistry,

    /// Step names forced off by configuration
    pub(crate) disabled: HashSet<String>,

    /// Key of the step that failed during the last `begin`
    pub(crate) last_failed_key: Option<StepKey>,

    /// Resume offset passed to the last `begin`
    pub(crate) last_start_key: Option<StepKey>,

    pub(crate) initialized: bool,

    pub(crate) initializer: Option<Initializer>,

    pub(crate) last_run: Option<RunSummary>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            steps: StepRegistry::default(),
            hooks: HookRegistry::new(),
            disabled: HashSet::new(),
            last_failed_key: None,
            last_start_key: None,
            initialized: false,
            initializer: None,
            last_run: None,
        }
    }

    /// Create an empty pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut pipeline = Self::new(config.name.clone());
        pipeline.disabled = config.disabled.iter().cloned().collect();
        pipeline
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Set the one-time setup closure.
    ///
    /// It runs lazily before the first `begin` or `rollback`. If it fails the
    /// pipeline stays uninitialized and the closure is tried again next time.
    pub fn on_initialize<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Pipeline) -> anyhow::Result<()> + 'static,
    {
        self.initializer = Some(Box::new(f));
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create a named step, add it, and return it for configuration
    pub fn register(&mut self, name: impl Into<String>) -> &mut Step {
        self.add(Step::named(name))
    }

    /// Create an unnamed step keyed by position
    pub fn register_unnamed(&mut self) -> &mut Step {
        self.add(Step::new())
    }

    /// Add a pre-built step under its name, or the next index if unnamed
    pub fn add(&mut self, mut step: Step) -> &mut Step {
        step.set_pipeline(self.id);
        self.steps.insert(step)
    }

    pub fn add_all<I>(&mut self, steps: I)
    where
        I: IntoIterator<Item = Step>,
    {
        for step in steps {
            self.add(step);
        }
    }

    /// The live step registry
    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.get_named(name)
    }

    /// Attach a hook to one of the six hook points
    pub fn add_hook<F>(&mut self, point: HookPoint, hook: F) -> &mut Self
    where
        F: Fn(Value, &Step, Direction) -> anyhow::Result<Value> + 'static,
    {
        self.hooks.register(point, Box::new(hook));
        self
    }

    /// Attach a hook by hook point name (`pre`, `postDown`, ...)
    pub fn add_hook_named<F>(&mut self, point: &str, hook: F) -> Result<&mut Self, PipelineError>
    where
        F: Fn(Value, &Step, Direction) -> anyhow::Result<Value> + 'static,
    {
        let point: HookPoint = point.parse()?;
        Ok(self.add_hook(point, hook))
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Whether configuration forces this step off
    pub fn is_disabled_by_config(&self, step: &Step) -> bool {
        step.name().is_some_and(|name| self.disabled.contains(name))
    }

    pub fn last_failed_key(&self) -> Option<&StepKey> {
        self.last_failed_key.as_ref()
    }

    pub fn last_start_key(&self) -> Option<&StepKey> {
        self.last_start_key.as_ref()
    }

    /// Summary of the most recent `begin` or `rollback`
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new("pipeline")
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("hooks", &self.hooks)
            .field("disabled", &self.disabled)
            .field("last_failed_key", &self.last_failed_key)
            .field("last_start_key", &self.last_start_key)
            .field("initialized", &self.initialized)
            .finish()
    }
}
