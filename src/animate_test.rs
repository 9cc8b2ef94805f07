#![allow(clippy::float_cmp)]

use serde_json::{json, Value};

use super::*;
use crate::element::ShapeKind;

// =============================================================
// Helpers
// =============================================================

fn obj(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn circle_scene(name: &str) -> SceneStore {
    let mut scene = SceneStore::new();
    scene.create(name, ShapeKind::Circle, Params::new()).expect("create");
    scene
}

fn num(scene: &SceneStore, name: &str, key: &str) -> f64 {
    scene
        .element(name)
        .and_then(|el| el.params().get(key))
        .and_then(Value::as_f64)
        .unwrap_or(f64::NAN)
}

fn text(scene: &SceneStore, name: &str, key: &str) -> String {
    scene
        .element(name)
        .and_then(|el| el.params().get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn queue_len(scene: &SceneStore, name: &str) -> usize {
    scene.element(name).map_or(0, Element::queue_len)
}

fn step(params: Value, duration: f64) -> CycleAnimation {
    CycleAnimation { params: obj(params), duration }
}

// =============================================================
// lerp_step
// =============================================================

#[test]
fn lerp_step_endpoints_are_exact_for_integers() {
    assert_eq!(lerp_step(0.0, 10.0, 0.0), 0.0);
    assert_eq!(lerp_step(0.0, 10.0, 1.0), 10.0);
}

#[test]
fn lerp_step_floors_the_midpoint() {
    // 127.5 floors to 127.
    assert_eq!(lerp_step(0.0, 255.0, 0.5), 127.0);
    assert_eq!(lerp_step(15.0, 40.0, 0.5), 27.0);
}

#[test]
fn lerp_step_works_downward() {
    assert_eq!(lerp_step(40.0, 10.0, 0.5), 25.0);
    assert_eq!(lerp_step(40.0, 10.0, 1.0), 10.0);
}

// =============================================================
// Single animations
// =============================================================

#[test]
fn animate_starts_from_current_params() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("animate");
    assert_eq!(queue_len(&scene, "a"), 1);

    assert!(tick(&mut scene, 0.0));
    assert_eq!(num(&scene, "a", "radius"), 15.0);
}

#[test]
fn animate_midpoint_and_completion() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("animate");
    tick(&mut scene, 0.0);
    tick(&mut scene, 50.0);
    assert_eq!(num(&scene, "a", "radius"), 27.0);
    tick(&mut scene, 100.0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
    assert_eq!(queue_len(&scene, "a"), 0);
}

#[test]
fn progress_clamps_past_the_duration() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("animate");
    tick(&mut scene, 0.0);
    tick(&mut scene, 5000.0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
}

#[test]
fn zero_duration_completes_on_the_first_tick() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 0.0).expect("animate");
    tick(&mut scene, 7.0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
    assert_eq!(queue_len(&scene, "a"), 0);
}

#[test]
fn untouched_params_survive_an_animation() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("animate");
    tick(&mut scene, 0.0);
    tick(&mut scene, 100.0);
    assert_eq!(num(&scene, "a", "centerX"), 15.0);
    assert_eq!(text(&scene, "a", "fillColor"), "#000000");
}

#[test]
fn animate_unknown_name_is_a_silent_no_op() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "ghost", obj(json!({"radius": 40.0})), 100.0).expect("no-op");
    assert!(!tick(&mut scene, 0.0));
}

#[test]
fn animate_rejects_unusable_target_values() {
    let mut scene = circle_scene("a");
    let err = animate(&mut scene, "a", obj(json!({"radius": {"deep": 1}})), 100.0)
        .expect_err("bad target");
    assert!(matches!(err, Error::InvalidParams { .. }));
    assert_eq!(queue_len(&scene, "a"), 0);
}

// =============================================================
// Color and vertex interpolation
// =============================================================

#[test]
fn color_animation_floors_each_channel() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"fillColor": "#ffffff"})), 100.0).expect("animate");
    tick(&mut scene, 0.0);
    assert_eq!(text(&scene, "a", "fillColor"), "#000000");
    tick(&mut scene, 50.0);
    assert_eq!(text(&scene, "a", "fillColor"), "#7f7f7f");
    tick(&mut scene, 100.0);
    assert_eq!(text(&scene, "a", "fillColor"), "#ffffff");
}

#[test]
fn color_animation_accepts_named_targets() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"fillColor": "white"})), 100.0).expect("animate");
    tick(&mut scene, 0.0);
    tick(&mut scene, 100.0);
    assert_eq!(text(&scene, "a", "fillColor"), "#ffffff");
}

#[test]
fn vertex_animation_lerps_every_coordinate() {
    let mut scene = SceneStore::new();
    scene.create("p", ShapeKind::Polygon, Params::new()).expect("create");
    // Default vertex starts at [[15,15],[25,25],[50,50]].
    animate(
        &mut scene,
        "p",
        obj(json!({"vertex": [[115.0, 15.0], [125.0, 25.0], [150.0, 50.0]]})),
        100.0,
    )
    .expect("animate");
    tick(&mut scene, 0.0);
    tick(&mut scene, 50.0);
    let snapshot = scene.get("p").expect("snapshot");
    let pairs = snapshot.params.get("vertex").and_then(Value::as_array).expect("vertex");
    let first = pairs[0].as_array().expect("pair");
    assert_eq!(first[0].as_f64(), Some(65.0));
    assert_eq!(first[1].as_f64(), Some(15.0));
}

// =============================================================
// Queue chaining
// =============================================================

#[test]
fn chained_job_starts_from_the_previous_target() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("first");
    animate(&mut scene, "a", obj(json!({"radius": 10.0})), 100.0).expect("second");

    let element = scene.element("a").expect("element");
    assert_eq!(element.queue_len(), 2);
    let second = element.queue.get(1).expect("second job");
    assert_eq!(second.start.get("radius").and_then(Value::as_f64), Some(40.0));
}

#[test]
fn completion_outside_cycle_mode_drops_the_rest_of_the_queue() {
    let mut scene = circle_scene("a");
    animate(&mut scene, "a", obj(json!({"radius": 40.0})), 100.0).expect("first");
    animate(&mut scene, "a", obj(json!({"radius": 99.0})), 100.0).expect("second");
    tick(&mut scene, 0.0);
    tick(&mut scene, 100.0);
    // The queued second job never runs: the queue is cleared wholesale.
    assert_eq!(queue_len(&scene, "a"), 0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
    tick(&mut scene, 200.0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
}

// =============================================================
// Cycles
// =============================================================

#[test]
fn start_cycle_enqueues_the_sequence_and_rearms_on_the_period() {
    let mut scene = circle_scene("a");
    start_cycle(
        &mut scene,
        "a",
        vec![step(json!({"radius": 40.0}), 100.0), step(json!({"radius": 15.0}), 100.0)],
    )
    .expect("cycle");
    assert!(scene.element("a").is_some_and(Element::in_cycle));
    assert_eq!(queue_len(&scene, "a"), 2);

    tick(&mut scene, 0.0);
    tick(&mut scene, 100.0); // first job completes, second starts
    assert_eq!(num(&scene, "a", "radius"), 40.0);
    assert_eq!(queue_len(&scene, "a"), 1);

    // Period (200) elapses: the two-job sequence is enqueued again while the
    // second job completes.
    tick(&mut scene, 200.0);
    assert_eq!(num(&scene, "a", "radius"), 15.0);
    assert_eq!(queue_len(&scene, "a"), 2);

    tick(&mut scene, 300.0);
    assert_eq!(num(&scene, "a", "radius"), 40.0);
}

#[test]
fn stop_cycle_prevents_further_rearming() {
    let mut scene = circle_scene("a");
    start_cycle(
        &mut scene,
        "a",
        vec![step(json!({"radius": 40.0}), 100.0), step(json!({"radius": 15.0}), 100.0)],
    )
    .expect("cycle");
    tick(&mut scene, 0.0);
    tick(&mut scene, 200.0); // one re-arm has happened

    stop_cycle(&mut scene, "a", false);
    assert!(!scene.element("a").is_some_and(Element::in_cycle));

    // The in-flight job finishes naturally, then the queue dies with the
    // cycle; no further auto-enqueue.
    tick(&mut scene, 300.0);
    tick(&mut scene, 400.0);
    assert_eq!(queue_len(&scene, "a"), 0);
    tick(&mut scene, 600.0);
    assert_eq!(queue_len(&scene, "a"), 0);
}

#[test]
fn cycle_chains_missing_start_values_from_the_live_params() {
    let mut scene = circle_scene("a");
    start_cycle(
        &mut scene,
        "a",
        vec![step(json!({"radius": 40.0}), 100.0), step(json!({"centerX": 100.0}), 100.0)],
    )
    .expect("cycle");
    tick(&mut scene, 0.0);
    tick(&mut scene, 100.0); // radius done; centerX job starts from live 15
    tick(&mut scene, 150.0);
    assert_eq!(num(&scene, "a", "centerX"), 57.0); // floor(15 + 0.5 * 85)
}

#[test]
fn stop_cycle_with_clear_queue_keeps_only_the_running_job() {
    let mut scene = circle_scene("a");
    start_cycle(
        &mut scene,
        "a",
        vec![
            step(json!({"radius": 40.0}), 100.0),
            step(json!({"radius": 15.0}), 100.0),
            step(json!({"radius": 80.0}), 100.0),
        ],
    )
    .expect("cycle");
    tick(&mut scene, 0.0); // first job is now in flight
    stop_cycle(&mut scene, "a", true);
    assert_eq!(queue_len(&scene, "a"), 1);

    // Without a started job the clear empties everything.
    let mut scene = circle_scene("b");
    start_cycle(&mut scene, "b", vec![step(json!({"radius": 40.0}), 100.0)]).expect("cycle");
    stop_cycle(&mut scene, "b", true);
    assert_eq!(queue_len(&scene, "b"), 0);
}

#[test]
fn start_cycle_with_an_empty_sequence_is_a_no_op() {
    let mut scene = circle_scene("a");
    start_cycle(&mut scene, "a", Vec::new()).expect("no-op");
    assert!(!scene.element("a").is_some_and(Element::in_cycle));
    assert_eq!(queue_len(&scene, "a"), 0);
}

#[test]
fn cycle_timer_is_dropped_at_the_next_tick_after_stop() {
    let mut scene = circle_scene("a");
    start_cycle(&mut scene, "a", vec![step(json!({"radius": 40.0}), 100.0)]).expect("cycle");
    tick(&mut scene, 0.0);
    stop_cycle(&mut scene, "a", false);
    tick(&mut scene, 50.0);
    let element = scene.element("a").expect("element");
    assert!(element.cycle.is_none());
}
