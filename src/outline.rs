//! Geometry builder: turns a shape kind plus params into a path outline, and
//! tests outlines for point containment.
//!
//! Outlines serve double duty. The renderer hands them to the surface to fill
//! and stroke; the interaction dispatcher tests pointer coordinates against
//! the outlines cached by the last repaint. Containment is computed here in
//! pure math (arcs are flattened, then an even-odd ray cast runs over the
//! resulting rings) so hit-testing needs no surface support and stays fully
//! testable.

#[cfg(test)]
#[path = "outline_test.rs"]
mod outline_test;

use std::f64::consts::TAU;

use crate::consts::ARC_SEGMENTS_PER_TURN;
use crate::element::{Params, Props, ShapeKind};

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A primitive path command. Angles are radians; arcs sweep in the positive
/// angular direction (clockwise with a y-down surface).
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    /// Start a new subpath at the point.
    MoveTo(Point),
    /// Straight segment from the current point.
    LineTo(Point),
    /// Circular arc around `center`, connected to the current point.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// Close the current subpath back to its starting point.
    Close,
}

/// The computed geometric path for a shape, used for both painting and
/// hit-testing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    commands: Vec<PathCommand>,
}

impl Outline {
    /// The primitive commands, in order.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Even-odd containment test against the flattened outline.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.flatten()
            .iter()
            .fold(false, |inside, ring| inside ^ point_in_ring(point, ring))
    }

    /// Flatten commands into polygon rings, sampling arcs.
    fn flatten(&self) -> Vec<Vec<Point>> {
        let mut rings = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(point) => {
                    finish_ring(&mut rings, &mut current);
                    current.push(*point);
                }
                PathCommand::LineTo(point) => current.push(*point),
                PathCommand::Arc { center, radius, start_angle, end_angle } => {
                    sample_arc(&mut current, *center, *radius, *start_angle, *end_angle);
                }
                PathCommand::Close => finish_ring(&mut rings, &mut current),
            }
        }
        finish_ring(&mut rings, &mut current);
        rings
    }
}

fn finish_ring(rings: &mut Vec<Vec<Point>>, current: &mut Vec<Point>) {
    if current.len() >= 3 {
        rings.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Sample an arc into line segments, appended to the current ring.
///
/// Sweep semantics follow the 2D-canvas convention for a non-anticlockwise
/// arc: a span of a full turn or more draws the whole circle, and a negative
/// raw span wraps into `[0, 2π)`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_arc(current: &mut Vec<Point>, center: Point, radius: f64, start: f64, end: f64) {
    let raw = end - start;
    let span = if raw >= TAU - 1e-9 { TAU } else { raw.rem_euclid(TAU) };
    let segments = ((span / TAU) * ARC_SEGMENTS_PER_TURN as f64).ceil().max(2.0) as usize;
    for i in 0..=segments {
        let angle = start + span * (i as f64 / segments as f64);
        current.push(Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
}

/// Standard even-odd ray cast against one ring.
fn point_in_ring(point: Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Build the outline for a shape from its current params.
///
/// Circle: move to center, arc from start to end angle (degrees, converted
/// here), line back to center, close. The silhouette is a pie slice when the
/// span subtends less than a full turn, a disk otherwise.
#[must_use]
pub fn build_outline(kind: ShapeKind, params: &Params) -> Outline {
    let props = Props::new(params);
    let commands = match kind {
        ShapeKind::Circle => {
            let center = Point::new(props.center_x(), props.center_y());
            vec![
                PathCommand::MoveTo(center),
                PathCommand::Arc {
                    center,
                    radius: props.radius(),
                    start_angle: props.start_angle().to_radians(),
                    end_angle: props.end_angle().to_radians(),
                },
                PathCommand::LineTo(center),
                PathCommand::Close,
            ]
        }
        ShapeKind::Rect => {
            let (x, y) = (props.x(), props.y());
            let (w, h) = (props.width(), props.height());
            vec![
                PathCommand::MoveTo(Point::new(x, y)),
                PathCommand::LineTo(Point::new(x + w, y)),
                PathCommand::LineTo(Point::new(x + w, y + h)),
                PathCommand::LineTo(Point::new(x, y + h)),
                PathCommand::Close,
            ]
        }
        ShapeKind::Polygon => {
            let vertex = props.vertex();
            let mut commands = Vec::with_capacity(vertex.len() + 2);
            if let Some(&(x0, y0)) = vertex.first() {
                commands.push(PathCommand::MoveTo(Point::new(x0, y0)));
                for &(x, y) in &vertex[1..] {
                    commands.push(PathCommand::LineTo(Point::new(x, y)));
                }
                commands.push(PathCommand::LineTo(Point::new(x0, y0)));
                commands.push(PathCommand::Close);
            }
            commands
        }
    };
    Outline { commands }
}
