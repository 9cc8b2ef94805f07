//! Animation engine: per-element FIFO parameter interpolation and cycling.
//!
//! All animation state lives on the elements themselves; this module only
//! advances it. Time enters exclusively through [`tick`] — the host calls it
//! with its own clock at whatever frame rate it likes, which keeps the whole
//! engine deterministic under test.
//!
//! Queue semantics (preserved contract): a job appended while the queue is
//! non-empty starts from the *previously queued target*, not the live value,
//! so chained animations stay smooth even before earlier ones finish. When a
//! job completes outside cycle mode the whole queue is cleared; in cycle mode
//! the completed job is popped and the next one starts on the same tick.
//!
//! Cycling re-arms on a fixed period equal to the sum of the sequence's
//! durations. Cancellation is cooperative: `stop_cycle` clears the flag, the
//! timer is dropped at the next tick boundary, and an in-flight job finishes
//! naturally.

#[cfg(test)]
#[path = "animate_test.rs"]
mod animate_test;

use serde_json::{Number, Value};
use tracing::{debug, trace};

use crate::color::Color;
use crate::element::{validate_patch, AnimationJob, CycleAnimation, CycleState, Element, Params};
use crate::error::Error;
use crate::scene::SceneStore;

/// Queue a transition of `target` params over `duration` time units.
///
/// An empty queue starts interpolating from the element's current params on
/// the next tick; a busy queue chains from the last queued target. Unknown
/// names are a silent no-op.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] when `target` carries a value that can
/// be neither number-lerped, color-lerped, nor pair-lerped.
pub fn animate(scene: &mut SceneStore, name: &str, target: Params, duration: f64) -> Result<(), Error> {
    validate_patch(name, &target)?;
    let Some(element) = scene.element_mut(name) else {
        return Ok(());
    };
    enqueue(element, target, duration);
    Ok(())
}

/// Mark the element cycling and enqueue `animations` once; the tick driver
/// re-enqueues the same sequence every `sum(durations)` time units until
/// [`stop_cycle`] clears the flag. Empty sequences and unknown names are
/// silent no-ops.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] when any step carries an unusable value;
/// nothing is enqueued in that case.
pub fn start_cycle(scene: &mut SceneStore, name: &str, animations: Vec<CycleAnimation>) -> Result<(), Error> {
    for animation in &animations {
        validate_patch(name, &animation.params)?;
    }
    if animations.is_empty() {
        return Ok(());
    }
    let Some(element) = scene.element_mut(name) else {
        return Ok(());
    };
    element.in_cycle = true;
    let period: f64 = animations.iter().map(|animation| animation.duration).sum();
    for animation in &animations {
        enqueue(element, animation.params.clone(), animation.duration);
    }
    element.cycle = Some(CycleState { animations, period, next_fire: None });
    debug!(name, period, "animation cycle started");
    Ok(())
}

/// Clear the cycle flag; the timer is dropped at the next tick boundary.
/// With `clear_queue`, pending jobs are dropped too — the running job (if
/// any) is left to finish naturally. Unknown names are a silent no-op.
pub fn stop_cycle(scene: &mut SceneStore, name: &str, clear_queue: bool) {
    let Some(element) = scene.element_mut(name) else {
        return;
    };
    element.in_cycle = false;
    if clear_queue {
        if element.queue.front().is_some_and(|job| job.started_at.is_some()) {
            element.queue.truncate(1);
        } else {
            element.queue.clear();
        }
    }
    debug!(name, clear_queue, "animation cycle stopped");
}

/// Advance every element's cycle timer and front animation job to `now`.
/// Returns whether any params changed (the caller's repaint trigger).
pub fn tick(scene: &mut SceneStore, now: f64) -> bool {
    let mut dirty = false;
    for element in scene.elements_mut() {
        service_cycle(element, now);
        dirty |= advance(element, now);
    }
    dirty
}

/// Append a job, chaining its start params from the tail of the queue.
fn enqueue(element: &mut Element, target: Params, duration: f64) {
    let start = match element.queue.back() {
        Some(previous) => previous.target.clone(),
        None => element.params.clone(),
    };
    element.queue.push_back(AnimationJob {
        target,
        start,
        duration: duration.max(0.0),
        started_at: None,
    });
}

/// Arm, fire, or drop the element's cycle timer for this tick.
fn service_cycle(element: &mut Element, now: f64) {
    if !element.in_cycle {
        if element.cycle.take().is_some() {
            trace!(name = element.name(), "cycle timer cancelled");
        }
        return;
    }
    let Some(cycle) = element.cycle.as_mut() else {
        return;
    };
    let Some(deadline) = cycle.next_fire else {
        cycle.next_fire = Some(now + cycle.period);
        return;
    };
    if now < deadline {
        return;
    }
    cycle.next_fire = Some(now + cycle.period);
    let animations = cycle.animations.clone();
    for animation in animations {
        enqueue(element, animation.params, animation.duration);
    }
    trace!(name = element.name(), "cycle sequence re-enqueued");
}

/// Interpolate the front job to `now`. Returns whether params changed.
fn advance(element: &mut Element, now: f64) -> bool {
    let Element { params, queue, in_cycle, .. } = element;
    let Some(job) = queue.front_mut() else {
        return false;
    };
    let started = match job.started_at {
        Some(at) => at,
        None => {
            start_job(job, params, now);
            now
        }
    };
    let progress = if job.duration <= 0.0 {
        1.0
    } else {
        ((now - started) / job.duration).clamp(0.0, 1.0)
    };
    apply_step(params, &job.start, &job.target, progress);
    if progress >= 1.0 {
        if *in_cycle {
            queue.pop_front();
            if let Some(next) = queue.front_mut() {
                start_job(next, params, now);
            }
        } else {
            queue.clear();
        }
    }
    true
}

/// Stamp the job's start time and fill start values missing for target keys
/// from the live params (chained jobs carry only the previous target).
fn start_job(job: &mut AnimationJob, current: &Params, now: f64) {
    job.started_at = Some(now);
    let missing: Vec<String> = job
        .target
        .keys()
        .filter(|key| !job.start.contains_key(*key))
        .cloned()
        .collect();
    for key in missing {
        if let Some(value) = current.get(&key) {
            job.start.insert(key, value.clone());
        }
    }
}

/// Write the interpolated value of every target key into `params`.
fn apply_step(params: &mut Params, start: &Params, target: &Params, progress: f64) {
    for (key, target_value) in target {
        let start_value = start.get(key);
        let next = match target_value {
            Value::Number(_) => {
                let Some(end) = target_value.as_f64() else {
                    continue;
                };
                let begin = start_value.and_then(Value::as_f64).unwrap_or(end);
                number_value(lerp_step(begin, end, progress))
            }
            Value::Array(items) if items.first().is_some_and(Value::is_array) => {
                lerp_pairs(start_value, items, progress)
            }
            Value::String(_) | Value::Array(_) => lerp_color(start_value, target_value, progress),
            _ => None,
        };
        if let Some(value) = next {
            params.insert(key.clone(), value);
        }
    }
}

/// `floor(progress · (end − start) + start)` — the interpolation step shared
/// by numeric, color-channel, and coordinate lerping.
pub(crate) fn lerp_step(start: f64, end: f64, progress: f64) -> f64 {
    (progress * (end - start) + start).floor()
}

fn number_value(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

/// Channel-wise color lerp, re-encoded as a `#rrggbb` string.
fn lerp_color(start_value: Option<&Value>, target_value: &Value, progress: f64) -> Option<Value> {
    let Ok(end) = Color::from_value(target_value) else {
        return None;
    };
    let begin = match start_value {
        Some(value) => Color::from_value(value).unwrap_or(end),
        None => end,
    };
    Some(Value::String(begin.lerp_floor(end, progress).to_hex()))
}

/// Per-coordinate lerp over a list of `[x, y]` pairs (polygon vertices).
fn lerp_pairs(start_value: Option<&Value>, target_pairs: &[Value], progress: f64) -> Option<Value> {
    let start_pairs = start_value.and_then(Value::as_array);
    let mut out = Vec::with_capacity(target_pairs.len());
    for (i, pair) in target_pairs.iter().enumerate() {
        let xy = pair.as_array()?;
        let end_x = xy.first()?.as_f64()?;
        let end_y = xy.get(1)?.as_f64()?;
        let (begin_x, begin_y) = start_pairs
            .and_then(|pairs| pairs.get(i))
            .and_then(Value::as_array)
            .and_then(|sxy| Some((sxy.first()?.as_f64()?, sxy.get(1)?.as_f64()?)))
            .unwrap_or((end_x, end_y));
        out.push(Value::Array(vec![
            number_value(lerp_step(begin_x, end_x, progress))?,
            number_value(lerp_step(begin_y, end_y, progress))?,
        ]));
    }
    Some(Value::Array(out))
}
