//! Test utility functions for rewind

#![allow(dead_code)]

use rewind::{Direction, Pipeline, Step, StepKey};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared log of `(step, direction)` pairs, in the order actions ran
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Add `n` to the chained value, treating null as 0
pub fn add(previous: &Value, n: i64) -> Value {
    json!(previous.as_i64().unwrap_or(0) + n)
}

/// Step adding `n` in both directions and logging `name:up` / `name:down`
pub fn recording_step(name: &str, n: i64, log: &CallLog) -> Step {
    let up_log = log.clone();
    let down_log = log.clone();
    let up_name = format!("{}:up", name);
    let down_name = format!("{}:down", name);

    Step::named(name)
        .with_up(move |prev, _| {
            up_log.push(up_name.clone());
            Ok(add(&prev, n))
        })
        .with_down(move |prev, _| {
            down_log.push(down_name.clone());
            Ok(add(&prev, n))
        })
}

/// Step whose forward action always fails
pub fn failing_step(name: &str, log: &CallLog) -> Step {
    let up_log = log.clone();
    let down_log = log.clone();
    let up_name = format!("{}:up", name);
    let down_name = format!("{}:down", name);

    Step::named(name)
        .with_up(move |_, _| {
            up_log.push(up_name.clone());
            anyhow::bail!("step failed")
        })
        .with_down(move |prev, _| {
            down_log.push(down_name.clone());
            Ok(prev)
        })
}

/// Pipeline of named steps "1".."n", step `k` adding `k` both ways
pub fn counting_pipeline(n: i64, log: &CallLog) -> Pipeline {
    let mut pipeline = Pipeline::new("counting");
    for k in 1..=n {
        pipeline.add(recording_step(&k.to_string(), k, log));
    }
    pipeline
}

/// Install a hook on every hook point that logs `point:step:direction`
pub fn trace_all_hooks(pipeline: &mut Pipeline, log: &CallLog) {
    for point in rewind::HookPoint::ALL {
        let log = log.clone();
        pipeline.add_hook(point, move |prev, step, direction: Direction| {
            log.push(format!(
                "{}:{}:{}",
                point,
                step.name().unwrap_or("?"),
                direction
            ));
            Ok(prev)
        });
    }
}

/// Assert the keys recorded by the last pass, in order
pub fn assert_executed(pipeline: &Pipeline, expected: &[&str]) {
    let run = pipeline
        .last_run()
        .unwrap_or_else(|| panic!("Pipeline '{}' has not run yet", pipeline.name));

    let expected: Vec<StepKey> = expected.iter().map(|k| StepKey::from(*k)).collect();
    assert_eq!(
        run.executed, expected,
        "Unexpected steps executed in {} pass",
        run.direction
    );
}

/// Initialize tracing output for a test (respects RUST_LOG)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
