//! Pie composer: expands proportional data into chained circle-slice
//! elements, plus an optional hole disk for ring charts.
//!
//! A pie is not a stored shape kind — composition is a convenience layer that
//! delegates every slice to the scene store's `create` with kind circle. The
//! slices share a name prefix; the hole (painted above the slices) is named
//! `{prefix}InnerHole`.

#[cfg(test)]
#[path = "pie_test.rs"]
mod pie_test;

use serde_json::{json, Value};

use crate::color::Color;
use crate::consts::FULL_TURN_DEG;
use crate::element::{merge_params, Params, ShapeKind};
use crate::error::Error;
use crate::scene::SceneStore;

/// Default params for a pie composition. Angles in degrees.
#[must_use]
pub fn default_pie_params() -> Params {
    let value = json!({
        "centerX": 300.0,
        "centerY": 250.0,
        "radius": 150.0,
        "startAngle": 0.0,
        "endAngle": 360.0,
        "strokeColor": "#000000",
        "strokeWidth": 1.0,
        "fillColors": ["#ff0000", "#00ff00", "#0000ff"],
        "data": [100.0, 200.0, 300.0],
        "hole": true,
        "holeRadius": 130.0,
        "holeFillColor": "#ffffff",
        "holeStrokeColor": "#ffffff",
        "holeStrokeWidth": 0.0,
    });
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Compose a pie chart: one circle slice per data value, spans proportional
/// to `data[i] / sum`, chained from `startAngle`, named `{prefix}{i}`.
///
/// Data and colors are validated up front, so a failed composition leaves
/// the scene untouched. Fill colors cycle through `fillColors` when the data
/// list is longer.
///
/// # Errors
///
/// [`Error::InvalidName`] for an empty prefix; [`Error::DuplicatePrefix`] if
/// any existing element name starts with `prefix`; [`Error::InvalidParams`]
/// for empty or non-positive data, or an empty fill-color list.
pub fn draw_pie(scene: &mut SceneStore, prefix: &str, params: Params) -> Result<(), Error> {
    if prefix.is_empty() {
        return Err(Error::InvalidName(prefix.to_owned()));
    }
    if scene.has_prefix(prefix) {
        return Err(Error::DuplicatePrefix(prefix.to_owned()));
    }
    let merged = merge_params(default_pie_params(), params);

    let data = numbers(&merged, "data")
        .ok_or_else(|| invalid(prefix, "data must be a list of finite numbers"))?;
    let total: f64 = data.iter().sum();
    if data.is_empty() || total <= 0.0 || data.iter().any(|value| *value < 0.0) {
        return Err(invalid(prefix, "data values must be non-negative and sum above zero"));
    }
    let fill_colors = merged
        .get("fillColors")
        .and_then(Value::as_array)
        .filter(|colors| !colors.is_empty())
        .ok_or_else(|| invalid(prefix, "fillColors must be a non-empty list"))?
        .clone();

    // Resolve every color up front so a bad value cannot fail the
    // composition after some slices have already been created.
    for value in &fill_colors {
        if let Err(err) = Color::from_value(value) {
            return Err(invalid(prefix, &format!("fillColors: {err}")));
        }
    }
    for key in ["strokeColor", "holeFillColor", "holeStrokeColor"] {
        if let Some(value) = merged.get(key) {
            if let Err(err) = Color::from_value(value) {
                return Err(invalid(prefix, &format!("{key}: {err}")));
            }
        }
    }

    let number = |key: &str| merged.get(key).and_then(Value::as_f64).unwrap_or_default();
    let color = |key: &str| merged.get(key).cloned().unwrap_or(Value::Null);

    let mut last_end = number("startAngle");
    for (i, value) in data.iter().enumerate() {
        let span = value * FULL_TURN_DEG / total;
        let slice = json!({
            "fillColor": fill_colors[i % fill_colors.len()],
            "radius": number("radius"),
            "centerX": number("centerX"),
            "centerY": number("centerY"),
            "strokeWidth": number("strokeWidth"),
            "strokeColor": color("strokeColor"),
            "startAngle": last_end,
            "endAngle": last_end + span,
        });
        scene.create(&format!("{prefix}{i}"), ShapeKind::Circle, into_params(slice))?;
        last_end += span;
    }

    if merged.get("hole").and_then(Value::as_bool).unwrap_or(true) {
        let hole = json!({
            "fillColor": color("holeFillColor"),
            "radius": number("holeRadius"),
            "centerX": number("centerX"),
            "centerY": number("centerY"),
            "strokeWidth": number("holeStrokeWidth"),
            "strokeColor": color("holeStrokeColor"),
            "startAngle": 0.0,
            "endAngle": 360.0,
        });
        scene.create(&format!("{prefix}InnerHole"), ShapeKind::Circle, into_params(hole))?;
    }
    Ok(())
}

fn numbers(params: &Params, key: &str) -> Option<Vec<f64>> {
    let items = params.get(key)?.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let value = item.as_f64()?;
        if !value.is_finite() {
            return None;
        }
        out.push(value);
    }
    Some(out)
}

fn into_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn invalid(prefix: &str, reason: &str) -> Error {
    Error::InvalidParams { name: prefix.to_owned(), reason: reason.to_owned() }
}
