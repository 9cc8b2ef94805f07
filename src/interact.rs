//! Interaction dispatcher: resolves pointer events against the painted
//! outline cache and invokes element listeners.
//!
//! Hit-testing walks the cache from the last-painted element to the first
//! (top to bottom) and stops at the first hit — only one element may react
//! per event. Listener callbacks receive a deep [`ElementSnapshot`]; they
//! run after the scan has settled on an element, so a callback can never
//! corrupt the paint order or the outline cache mid-dispatch.
//!
//! Mouse-out is level-triggered: an element with a `mouseout` listener fires
//! on *every* move event the pointer spends outside it, not just on the
//! leave edge. Callbacks must therefore be idempotent and cheap.

#[cfg(test)]
#[path = "interact_test.rs"]
mod interact_test;

use crate::element::EventKind;
use crate::outline::Point;
use crate::render::PaintedOutline;
use crate::scene::SceneStore;

/// Dispatch a click at `point`.
///
/// The topmost containing element wins; its `click` listener is invoked if
/// present. Elements beneath it never see the event, listener or not.
pub fn click(scene: &mut SceneStore, outlines: &[PaintedOutline], point: Point) {
    for painted in outlines.iter().rev() {
        if painted.outline.contains(point) {
            fire(scene, &painted.name, EventKind::Click);
            return;
        }
    }
}

/// Dispatch a pointer move at `point`.
///
/// Scanning top to bottom: elements not containing the point fire their
/// `mouseout` listener (every move event). The first containing element has
/// its animation cycle stopped (hover interrupts cycling), then fires
/// `mouseover` if registered and `mouseout` otherwise; the scan stops there.
pub fn pointer_move(scene: &mut SceneStore, outlines: &[PaintedOutline], point: Point) {
    for painted in outlines.iter().rev() {
        if painted.outline.contains(point) {
            if let Some(element) = scene.element_mut(&painted.name) {
                element.in_cycle = false;
            }
            if !fire(scene, &painted.name, EventKind::MouseOver) {
                fire(scene, &painted.name, EventKind::MouseOut);
            }
            return;
        }
        fire(scene, &painted.name, EventKind::MouseOut);
    }
}

/// Dispatch a surface-wide pointer leave: a global mouse-out sweep over
/// every element with a `mouseout` listener.
pub fn pointer_leave(scene: &mut SceneStore) {
    let names: Vec<String> = scene
        .elements()
        .iter()
        .map(|element| element.name().to_owned())
        .collect();
    for name in names {
        fire(scene, &name, EventKind::MouseOut);
    }
}

/// Invoke the first listener of `event` on the named element, if both exist.
/// Returns whether a callback ran.
fn fire(scene: &mut SceneStore, name: &str, event: EventKind) -> bool {
    let Some(element) = scene.element_mut(name) else {
        return false;
    };
    let snapshot = element.snapshot();
    let Some(callback) = element.first_listener_mut(event) else {
        return false;
    };
    callback(&snapshot);
    true
}
