//! Renderer: repaints the full surface from the scene, back to front.
//!
//! Every repaint clears the surface, rebuilds each element's outline from its
//! current params, fills then strokes it, and replaces the outline cache
//! wholesale — there is no per-element invalidation. The cache is what the
//! interaction dispatcher hit-tests, so hit-testing always sees the
//! last-painted geometry.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use tracing::trace;

use crate::element::{Element, Props};
use crate::outline::{build_outline, Outline, Point};
use crate::surface::Surface;

/// An element's outline as painted by the most recent repaint.
#[derive(Debug, Clone)]
pub struct PaintedOutline {
    /// Name of the element the outline belongs to.
    pub name: String,
    /// The geometry that was filled and stroked.
    pub outline: Outline,
}

/// Repaints the scene and owns the painted-outline cache.
#[derive(Debug, Default)]
pub struct Renderer {
    cache: Vec<PaintedOutline>,
}

impl Renderer {
    /// Create a renderer with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the surface and repaint every element in ascending paint order.
    ///
    /// Idempotent: repainting unchanged elements produces the same surface
    /// calls and the same cache.
    pub fn repaint<S: Surface>(&mut self, surface: &mut S, elements: &[Element]) {
        let (width, height) = surface.size();
        surface.clear(0.0, 0.0, width, height);
        self.cache.clear();
        for element in elements {
            let props = Props::new(element.params());
            let outline = build_outline(element.kind(), element.params());
            surface.fill(&outline, props.fill_color());
            surface.stroke(&outline, props.stroke_color(), props.stroke_width());
            self.cache.push(PaintedOutline { name: element.name().to_owned(), outline });
        }
        trace!(elements = elements.len(), "scene repainted");
    }

    /// The painted outlines from the last repaint, in paint order.
    #[must_use]
    pub fn outlines(&self) -> &[PaintedOutline] {
        &self.cache
    }

    /// Name of the topmost element whose painted outline contains `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&str> {
        self.cache
            .iter()
            .rev()
            .find(|painted| painted.outline.contains(point))
            .map(|painted| painted.name.as_str())
    }
}
