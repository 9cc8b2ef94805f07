//! Element model: shape kinds, the params bag, listeners, and animation state.
//!
//! An element's parameters live in an open-ended JSON object so the same
//! merge/interpolate machinery works for every shape kind. Per-kind defaults
//! are merged at creation time, a typed accessor ([`Props`]) resolves common
//! fields with fallbacks, and validation checks the merged result before it
//! enters the store.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::Color;
use crate::error::Error;

/// The open-ended parameter bag carried by every element.
pub type Params = serde_json::Map<String, Value>;

/// The kind of a scene element.
///
/// Pie is not a stored kind: a pie composition expands into circle slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Circle, or a pie slice when the angle span subtends less than 360°.
    Circle,
    /// Axis-aligned rectangle.
    Rect,
    /// Closed polygon through an ordered vertex list.
    Polygon,
}

/// Interaction event kinds an element listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Pointer press-and-release inside the element.
    Click,
    /// Pointer moved while inside the element.
    MouseOver,
    /// Pointer is outside the element (level-triggered, see the dispatcher).
    MouseOut,
}

/// Callback invoked by the interaction dispatcher with an element snapshot.
pub type ListenerCallback = Box<dyn FnMut(&ElementSnapshot)>;

/// A registered `(event, callback)` pair.
///
/// Only the first listener of a given kind ever fires; later registrations
/// for the same kind are dead entries (preserved contract).
pub struct Listener {
    pub(crate) event: EventKind,
    pub(crate) callback: ListenerCallback,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("event", &self.event).finish_non_exhaustive()
    }
}

/// A queued parameter transition.
///
/// `start` holds the values interpolation begins from. For the first job in
/// a queue this is a snapshot of the live params; for chained jobs it is the
/// previous job's target, with missing keys filled from the live value when
/// the job actually starts.
#[derive(Debug, Clone)]
pub struct AnimationJob {
    pub(crate) target: Params,
    pub(crate) start: Params,
    pub(crate) duration: f64,
    pub(crate) started_at: Option<f64>,
}

/// One step of a cycle sequence: a target params patch and its duration.
#[derive(Debug, Clone)]
pub struct CycleAnimation {
    /// Target params for this step.
    pub params: Params,
    /// Step duration in host time units.
    pub duration: f64,
}

/// Re-arm state for a cycling element.
///
/// The deadline is armed on the first tick after `start_cycle` and advanced
/// by `period` on each firing; it is dropped as soon as the cycle flag is
/// observed cleared.
#[derive(Debug, Clone)]
pub(crate) struct CycleState {
    pub(crate) animations: Vec<CycleAnimation>,
    pub(crate) period: f64,
    pub(crate) next_fire: Option<f64>,
}

/// A live scene element. Owned exclusively by the scene store.
pub struct Element {
    pub(crate) name: String,
    pub(crate) kind: ShapeKind,
    pub(crate) params: Params,
    pub(crate) listeners: Vec<Listener>,
    pub(crate) queue: VecDeque<AnimationJob>,
    pub(crate) in_cycle: bool,
    pub(crate) cycle: Option<CycleState>,
}

impl Element {
    pub(crate) fn new(name: String, kind: ShapeKind, params: Params) -> Self {
        Self {
            name,
            kind,
            params,
            listeners: Vec::new(),
            queue: VecDeque::new(),
            in_cycle: false,
            cycle: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of animation jobs currently queued (including the running one).
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the cycle driver will re-enqueue this element's sequence.
    #[must_use]
    pub fn in_cycle(&self) -> bool {
        self.in_cycle
    }

    /// Deep, independent copy of the element's observable state.
    #[must_use]
    pub fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            params: self.params.clone(),
            in_cycle: self.in_cycle,
        }
    }

    /// The first listener registered for `event`, if any.
    pub(crate) fn first_listener_mut(&mut self, event: EventKind) -> Option<&mut ListenerCallback> {
        self.listeners
            .iter_mut()
            .find(|listener| listener.event == event)
            .map(|listener| &mut listener.callback)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("listeners", &self.listeners.len())
            .field("queue", &self.queue.len())
            .field("in_cycle", &self.in_cycle)
            .finish_non_exhaustive()
    }
}

/// A deep copy of an element's observable state, safe to hand to callers and
/// listener callbacks. Mutating a snapshot never affects the stored element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Unique element name.
    pub name: String,
    /// Shape kind.
    pub kind: ShapeKind,
    /// Current params, defaults included.
    pub params: Params,
    /// Whether the element is cycling.
    pub in_cycle: bool,
}

// =============================================================
// Defaults and merging
// =============================================================

/// Per-kind default params. Angles are in degrees.
#[must_use]
pub fn default_params(kind: ShapeKind) -> Params {
    let value = match kind {
        ShapeKind::Circle => json!({
            "centerX": 15.0,
            "centerY": 15.0,
            "radius": 15.0,
            "startAngle": 0.0,
            "endAngle": 360.0,
            "strokeColor": "#000000",
            "strokeWidth": 1.0,
            "fillColor": "#000000",
        }),
        ShapeKind::Rect => json!({
            "x": 15.0,
            "y": 15.0,
            "width": 15.0,
            "height": 15.0,
            "strokeColor": "#000000",
            "strokeWidth": 1.0,
            "fillColor": "#000000",
        }),
        ShapeKind::Polygon => json!({
            "vertex": [[15.0, 15.0], [25.0, 25.0], [50.0, 50.0]],
            "strokeColor": "#000000",
            "strokeWidth": 1.0,
            "fillColor": "#000000",
        }),
    };
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Shallow per-key overwrite of `overrides` into `base`. Nested structures
/// (vertex lists, color triples) are replaced wholesale, not merged.
#[must_use]
pub fn merge_params(mut base: Params, overrides: Params) -> Params {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

// =============================================================
// Validation
// =============================================================

/// Check a fully merged params bag against the requirements of `kind`.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] naming the first offending field.
pub fn validate_params(name: &str, kind: ShapeKind, params: &Params) -> Result<(), Error> {
    let numeric_fields: &[&str] = match kind {
        ShapeKind::Circle => &["centerX", "centerY", "radius", "startAngle", "endAngle", "strokeWidth"],
        ShapeKind::Rect => &["x", "y", "width", "height", "strokeWidth"],
        ShapeKind::Polygon => &["strokeWidth"],
    };
    for field in numeric_fields {
        let valid = params.get(*field).and_then(Value::as_f64).is_some_and(f64::is_finite);
        if !valid {
            return Err(invalid(name, format!("{field} must be a finite number")));
        }
    }
    for field in ["strokeColor", "fillColor"] {
        let Some(value) = params.get(field) else {
            return Err(invalid(name, format!("{field} is missing")));
        };
        if let Err(err) = Color::from_value(value) {
            return Err(invalid(name, format!("{field}: {err}")));
        }
    }
    if kind == ShapeKind::Polygon {
        let Some(pairs) = params.get("vertex").and_then(Value::as_array) else {
            return Err(invalid(name, "vertex must be a list of [x, y] pairs".to_owned()));
        };
        if pairs.len() < 3 {
            return Err(invalid(name, "vertex needs at least 3 points".to_owned()));
        }
        for pair in pairs {
            let ok = pair.as_array().is_some_and(|xy| {
                xy.len() == 2 && xy.iter().all(|n| n.as_f64().is_some_and(f64::is_finite))
            });
            if !ok {
                return Err(invalid(name, "vertex entries must be [x, y] number pairs".to_owned()));
            }
        }
    }
    Ok(())
}

/// Check a params patch destined for `set`/`animate`: every value must be a
/// finite number, a resolvable color, a coordinate-pair list, or a bool.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] naming the first offending key.
pub fn validate_patch(name: &str, patch: &Params) -> Result<(), Error> {
    for (key, value) in patch {
        let ok = match value {
            Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
            Value::Bool(_) => true,
            Value::String(_) => Color::from_value(value).is_ok(),
            Value::Array(items) => {
                if items.first().is_some_and(Value::is_array) {
                    items.iter().all(|pair| {
                        pair.as_array().is_some_and(|xy| {
                            xy.len() == 2 && xy.iter().all(|n| n.as_f64().is_some_and(f64::is_finite))
                        })
                    })
                } else {
                    Color::from_value(value).is_ok()
                }
            }
            _ => false,
        };
        if !ok {
            return Err(invalid(name, format!("{key} carries an unusable value")));
        }
    }
    Ok(())
}

fn invalid(name: &str, reason: String) -> Error {
    Error::InvalidParams { name: name.to_owned(), reason }
}

// =============================================================
// Typed access
// =============================================================

/// Typed access to common params fields, with per-kind defaults as fallback.
pub struct Props<'a> {
    value: &'a Params,
}

impl<'a> Props<'a> {
    /// Wrap a params bag for typed access.
    #[must_use]
    pub fn new(value: &'a Params) -> Self {
        Self { value }
    }

    fn num(&self, key: &str, fallback: f64) -> f64 {
        self.value.get(key).and_then(Value::as_f64).unwrap_or(fallback)
    }

    fn color(&self, key: &str) -> Color {
        match self.value.get(key) {
            Some(value) => Color::from_value(value).unwrap_or(Color::BLACK),
            None => Color::BLACK,
        }
    }

    /// Circle center x. Defaults to `15.0`.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.num("centerX", 15.0)
    }

    /// Circle center y. Defaults to `15.0`.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.num("centerY", 15.0)
    }

    /// Circle radius. Defaults to `15.0`.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.num("radius", 15.0)
    }

    /// Arc start angle in degrees. Defaults to `0`.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.num("startAngle", 0.0)
    }

    /// Arc end angle in degrees. Defaults to `360`.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.num("endAngle", crate::consts::FULL_TURN_DEG)
    }

    /// Rect left edge. Defaults to `15.0`.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.num("x", 15.0)
    }

    /// Rect top edge. Defaults to `15.0`.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.num("y", 15.0)
    }

    /// Rect width. Defaults to `15.0`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.num("width", 15.0)
    }

    /// Rect height. Defaults to `15.0`.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.num("height", 15.0)
    }

    /// Stroke line width. Defaults to `1.0`.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.num("strokeWidth", 1.0)
    }

    /// Fill color resolved through the codec. Defaults to black.
    #[must_use]
    pub fn fill_color(&self) -> Color {
        self.color("fillColor")
    }

    /// Stroke color resolved through the codec. Defaults to black.
    #[must_use]
    pub fn stroke_color(&self) -> Color {
        self.color("strokeColor")
    }

    /// Polygon vertex list as `(x, y)` pairs. Malformed entries are skipped.
    #[must_use]
    pub fn vertex(&self) -> Vec<(f64, f64)> {
        self.value
            .get("vertex")
            .and_then(Value::as_array)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter_map(|pair| {
                        let xy = pair.as_array()?;
                        Some((xy.first()?.as_f64()?, xy.get(1)?.as_f64()?))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
