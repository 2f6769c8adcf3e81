//! Test: Resuming from an offset and symmetric rollback

use crate::helpers::*;
use rewind::{Step, StepAction, StepKey};
use serde_json::json;

/// begin_from(k) runs k and everything after it, nothing before
#[test]
fn test_begin_from_skips_earlier_steps() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(4, &log);

    assert_eq!(pipeline.begin_from("3").unwrap(), json!(7));
    assert_eq!(log.entries(), vec!["3:up", "4:up"]);
    assert_eq!(pipeline.last_start_key(), Some(&StepKey::from("3")));
}

/// Rollback after begin_from(k) stops once k is compensated
#[test]
fn test_rollback_stops_at_resume_boundary() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(4, &log);

    pipeline.begin_from("3").unwrap();
    log.clear();

    assert_eq!(pipeline.rollback().unwrap(), json!(7));
    assert_eq!(log.entries(), vec!["4:down", "3:down"]);
    assert_executed(&pipeline, &["4", "3"]);
}

/// A failure after a resumed start: rollback stays inside the resumed range
#[test]
fn test_failure_after_resume() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(5, &log);
    pipeline.add(failing_step("4", &log));

    assert!(pipeline.begin_from("2").is_err());
    log.clear();

    assert_eq!(pipeline.rollback().unwrap(), json!(5));
    assert_eq!(log.entries(), vec!["3:down", "2:down"]);
}

/// The resumed step failing: nothing ran, so rollback compensates nothing
#[test]
fn test_failing_resume_step_rolls_back_nothing() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(3, &log);
    pipeline.add(failing_step("2", &log));

    assert!(pipeline.begin_from("2").is_err());
    log.clear();

    assert_eq!(pipeline.rollback().unwrap(), json!(null));
    assert!(log.entries().is_empty());
    assert_executed(&pipeline, &[]);
}

struct Switched;

impl StepAction for Switched {
    fn name(&self) -> Option<&str> {
        Some("2")
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// A disabled resume step still bounds the rollback
#[test]
fn test_disabled_resume_step_bounds_rollback() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(3, &log);
    pipeline.add(Step::from_action(Switched));

    assert_eq!(pipeline.begin_from("2").unwrap(), json!(3));
    log.clear();

    assert_eq!(pipeline.rollback().unwrap(), json!(3));
    assert_eq!(log.entries(), vec!["3:down"]);
}

/// An unknown start key arms nothing, so no step runs
#[test]
fn test_unknown_start_key_runs_nothing() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(3, &log);

    assert_eq!(pipeline.begin_from("missing").unwrap(), json!(null));
    assert!(log.entries().is_empty());
}

/// A full begin clears the resume boundary of an earlier partial one
#[test]
fn test_full_begin_clears_start_key() {
    let log = CallLog::new();
    let mut pipeline = counting_pipeline(3, &log);

    pipeline.begin_from("2").unwrap();
    pipeline.begin().unwrap();
    assert_eq!(pipeline.last_start_key(), None);

    log.clear();
    assert_eq!(pipeline.rollback().unwrap(), json!(6));
    assert_eq!(log.entries(), vec!["3:down", "2:down", "1:down"]);
}

/// Positional keys work as offsets too
#[test]
fn test_index_offset() {
    let log = CallLog::new();
    let mut pipeline = rewind::Pipeline::new("positional");
    for n in 1..=3 {
        let log = log.clone();
        pipeline.register_unnamed().on_up(move |prev, _| {
            log.push(format!("{}:up", n));
            Ok(add(&prev, n))
        });
    }

    assert_eq!(pipeline.begin_from(1usize).unwrap(), json!(5));
    assert_eq!(log.entries(), vec!["2:up", "3:up"]);
}
