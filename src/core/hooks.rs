//! Hook points wrapped around every step
//!
//! Hooks run in registration order. The direction-agnostic list of a phase
//! always runs before the direction-specific one, and each hook receives the
//! value returned by the one before it.

use crate::core::step::{Direction, Step};
use crate::execution::failure::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The six places a hook can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPoint {
    /// Before every step, both directions
    Pre,
    /// After every step, both directions
    Post,
    PreUp,
    PreDown,
    PostUp,
    PostDown,
}

impl HookPoint {
    pub const ALL: [HookPoint; 6] = [
        HookPoint::Pre,
        HookPoint::Post,
        HookPoint::PreUp,
        HookPoint::PreDown,
        HookPoint::PostUp,
        HookPoint::PostDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::Pre => "pre",
            HookPoint::Post => "post",
            HookPoint::PreUp => "preUp",
            HookPoint::PreDown => "preDown",
            HookPoint::PostUp => "postUp",
            HookPoint::PostDown => "postDown",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookPoint {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookPoint::ALL
            .into_iter()
            .find(|point| point.as_str() == s)
            .ok_or_else(|| PipelineError::UnknownHook(s.to_string()))
    }
}

/// Whether hooks run before or after the step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Pre,
    Post,
}

impl HookPhase {
    /// The hook point firing in this phase regardless of direction
    pub fn agnostic(&self) -> HookPoint {
        match self {
            HookPhase::Pre => HookPoint::Pre,
            HookPhase::Post => HookPoint::Post,
        }
    }

    /// The hook point firing in this phase for one direction only
    pub fn directed(&self, direction: Direction) -> HookPoint {
        match (self, direction) {
            (HookPhase::Pre, Direction::Up) => HookPoint::PreUp,
            (HookPhase::Pre, Direction::Down) => HookPoint::PreDown,
            (HookPhase::Post, Direction::Up) => HookPoint::PostUp,
            (HookPhase::Post, Direction::Down) => HookPoint::PostDown,
        }
    }
}

/// A hook: `(previous, step, direction) -> next`
pub type Hook = Box<dyn Fn(Value, &Step, Direction) -> anyhow::Result<Value>>;

/// Ordered hook lists, one per [`HookPoint`]
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookPoint, Vec<Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to a point. No de-duplication.
    pub fn register(&mut self, point: HookPoint, hook: Hook) {
        self.hooks.entry(point).or_default().push(hook);
    }

    /// Number of hooks attached to a point
    pub fn count(&self, point: HookPoint) -> usize {
        self.hooks.get(&point).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    fn at(&self, point: HookPoint) -> &[Hook] {
        self.hooks.get(&point).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hooks applying to a phase and direction: agnostic first, then directed
    pub fn resolve(&self, phase: HookPhase, direction: Direction) -> impl Iterator<Item = &Hook> {
        self.at(phase.agnostic())
            .iter()
            .chain(self.at(phase.directed(direction)).iter())
    }

    /// Run the resolved hooks, threading the value through each one.
    ///
    /// The first error stops the chain and is returned as-is.
    pub fn run(
        &self,
        phase: HookPhase,
        direction: Direction,
        previous: Value,
        step: &Step,
    ) -> anyhow::Result<Value> {
        let mut value = previous;
        for (i, hook) in self.resolve(phase, direction).enumerate() {
            debug!(
                "Running {:?} hook {} for step {:?} ({})",
                phase,
                i,
                step.name(),
                direction
            );
            value = hook(value, step, direction)?;
        }
        Ok(value)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in HookPoint::ALL {
            map.entry(&point.as_str(), &self.count(point));
        }
        map.finish()
    }
}
