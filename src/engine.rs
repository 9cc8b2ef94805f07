//! Top-level engine: composes the scene store, renderer, interaction
//! dispatcher, and animation engine over an injected drawing surface.
//!
//! Every mutation marks the scene dirty; the next [`Engine::tick`] (or an
//! explicit [`Engine::render`]) flushes a single repaint, so a burst of
//! mutations costs one redraw. Scene state itself is correct immediately
//! after every call — only pixels and the hit-testing cache are deferred,
//! and the cache is by contract the *last-painted* geometry.
//!
//! The host owns the event loop: it forwards pointer events with
//! surface-local coordinates and calls `tick` with its own monotonic clock
//! (milliseconds under a `requestAnimationFrame`-style driver).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::animate;
use crate::element::{CycleAnimation, ElementSnapshot, EventKind, Params, ShapeKind};
use crate::error::Error;
use crate::interact;
use crate::outline::Point;
use crate::pie;
use crate::render::Renderer;
use crate::scene::SceneStore;
use crate::surface::Surface;

/// The full scene engine bound to a drawing surface.
pub struct Engine<S: Surface> {
    surface: S,
    scene: SceneStore,
    renderer: Renderer,
    dirty: bool,
}

impl<S: Surface> Engine<S> {
    /// Create an engine painting to `surface`.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            scene: SceneStore::new(),
            renderer: Renderer::new(),
            dirty: false,
        }
    }

    // --- Shape creation ---

    /// Create a circle element on top of the scene.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::create`].
    pub fn draw_circle(&mut self, name: &str, params: Params) -> Result<(), Error> {
        self.scene.create(name, ShapeKind::Circle, params)?;
        self.dirty = true;
        Ok(())
    }

    /// Create a rectangle element on top of the scene.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::create`].
    pub fn draw_rect(&mut self, name: &str, params: Params) -> Result<(), Error> {
        self.scene.create(name, ShapeKind::Rect, params)?;
        self.dirty = true;
        Ok(())
    }

    /// Create a polygon element on top of the scene.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::create`].
    pub fn draw_polygon(&mut self, name: &str, params: Params) -> Result<(), Error> {
        self.scene.create(name, ShapeKind::Polygon, params)?;
        self.dirty = true;
        Ok(())
    }

    /// Compose a pie chart from proportional data values.
    ///
    /// # Errors
    ///
    /// See [`pie::draw_pie`].
    pub fn draw_pie(&mut self, prefix: &str, params: Params) -> Result<(), Error> {
        pie::draw_pie(&mut self.scene, prefix, params)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove an element. Silent no-op when the name is absent.
    pub fn remove(&mut self, name: &str) {
        if self.scene.remove(name) {
            self.dirty = true;
        }
    }

    // --- Queries ---

    /// Deep snapshot of an element, or `None` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ElementSnapshot> {
        self.scene.get(name)
    }

    /// The scene store, for read access to elements and paint order.
    #[must_use]
    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    /// The injected surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the injected surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // --- Params and listeners ---

    /// Shallow-merge `patch` into an element's params. Unknown names no-op.
    ///
    /// # Errors
    ///
    /// See [`SceneStore::set_params`].
    pub fn set(&mut self, name: &str, patch: Params) -> Result<(), Error> {
        if self.scene.set_params(name, patch)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// Register an interaction listener. Unknown names no-op. Only the first
    /// listener per event kind ever fires.
    pub fn on(
        &mut self,
        name: &str,
        event: EventKind,
        callback: impl FnMut(&ElementSnapshot) + 'static,
    ) {
        self.scene.add_listener(name, event, Box::new(callback));
    }

    // --- Paint-order manipulation ---

    /// Move an element one level toward the top.
    pub fn level_up(&mut self, name: &str) {
        if self.scene.level_up(name) {
            self.dirty = true;
        }
    }

    /// Move an element one level toward the bottom.
    pub fn level_down(&mut self, name: &str) {
        if self.scene.level_down(name) {
            self.dirty = true;
        }
    }

    /// Move an element to the top of the paint order.
    pub fn to_top(&mut self, name: &str) {
        if self.scene.to_top(name) {
            self.dirty = true;
        }
    }

    /// Move an element to the bottom of the paint order.
    pub fn to_bottom(&mut self, name: &str) {
        if self.scene.to_bottom(name) {
            self.dirty = true;
        }
    }

    /// Move an element to an absolute level, clamped to the scene bounds.
    pub fn set_level(&mut self, name: &str, level: i64) {
        if self.scene.set_level(name, level) {
            self.dirty = true;
        }
    }

    // --- Animation ---

    /// Queue a params transition over `duration` time units
    /// ([`crate::consts::DEFAULT_DURATION`] matches the classic default).
    ///
    /// # Errors
    ///
    /// See [`animate::animate`].
    pub fn animate(&mut self, name: &str, target: Params, duration: f64) -> Result<(), Error> {
        animate::animate(&mut self.scene, name, target, duration)
    }

    /// Start cycling a sequence of animations on an element.
    ///
    /// # Errors
    ///
    /// See [`animate::start_cycle`].
    pub fn start_cycle(&mut self, name: &str, animations: Vec<CycleAnimation>) -> Result<(), Error> {
        animate::start_cycle(&mut self.scene, name, animations)
    }

    /// Stop cycling; with `clear_queue`, drop pending jobs too.
    pub fn stop_cycle(&mut self, name: &str, clear_queue: bool) {
        animate::stop_cycle(&mut self.scene, name, clear_queue);
    }

    // --- Pointer events ---

    /// Dispatch a click at surface-local `point`.
    pub fn on_click(&mut self, point: Point) {
        interact::click(&mut self.scene, self.renderer.outlines(), point);
    }

    /// Dispatch a pointer move at surface-local `point`.
    pub fn on_pointer_move(&mut self, point: Point) {
        interact::pointer_move(&mut self.scene, self.renderer.outlines(), point);
    }

    /// Dispatch a surface-wide pointer leave.
    pub fn on_pointer_leave(&mut self) {
        interact::pointer_leave(&mut self.scene);
    }

    // --- Frame driving ---

    /// Advance animations and cycle timers to `now`, then repaint if
    /// anything changed since the last flush.
    pub fn tick(&mut self, now: f64) {
        if animate::tick(&mut self.scene, now) {
            self.dirty = true;
        }
        self.render();
    }

    /// Repaint immediately if the scene is dirty. Returns whether a repaint
    /// happened.
    pub fn render(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.renderer.repaint(&mut self.surface, self.scene.elements());
        self.dirty = false;
        true
    }
}
