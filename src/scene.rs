//! Scene store: the ordered collection of named elements.
//!
//! Element order encodes paint order — index 0 paints first (bottom), the
//! last index paints on top. Hit-testing walks the same order in reverse. An
//! auxiliary name→index map gives O(1) lookup and is rebuilt after any
//! structural change (create, remove, reorder).
//!
//! Mutators addressed to an unknown name are silent no-ops and report "no
//! change"; only construction and malformed values error. Every reorder
//! method returns whether the scene actually changed, so callers can skip
//! redundant repaints.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use tracing::debug;

use crate::element::{
    default_params, merge_params, validate_params, validate_patch, Element, ElementSnapshot,
    EventKind, Listener, ListenerCallback, Params, ShapeKind,
};
use crate::error::Error;

/// In-memory store of scene elements, in paint order.
#[derive(Debug, Default)]
pub struct SceneStore {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
}

impl SceneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    /// Look up an element by name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.index.get(name).and_then(|&i| self.elements.get(i))
    }

    pub(crate) fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        match self.index.get(name) {
            Some(&i) => self.elements.get_mut(i),
            None => None,
        }
    }

    /// Whether any live element name starts with `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.elements.iter().any(|el| el.name().starts_with(prefix))
    }

    // --- Construction / destruction ---

    /// Create a new element on top of the scene.
    ///
    /// Per-kind defaults are merged under `params` first; the merged bag is
    /// validated before anything is stored, so a failed create leaves the
    /// scene untouched.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for an empty name, [`Error::DuplicateName`] if
    /// the name is taken, [`Error::InvalidParams`] if the merged params fail
    /// validation for `kind`.
    pub fn create(&mut self, name: &str, kind: ShapeKind, params: Params) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::InvalidName(name.to_owned()));
        }
        if self.index.contains_key(name) {
            return Err(Error::DuplicateName(name.to_owned()));
        }
        let merged = merge_params(default_params(kind), params);
        validate_params(name, kind, &merged)?;

        self.index.insert(name.to_owned(), self.elements.len());
        self.elements.push(Element::new(name.to_owned(), kind, merged));
        debug!(name, ?kind, "element created");
        Ok(())
    }

    /// Remove an element. Silent no-op when the name is absent; returns
    /// whether the scene changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(&i) = self.index.get(name) else {
            return false;
        };
        self.elements.remove(i);
        self.rebuild_index();
        debug!(name, "element removed");
        true
    }

    /// Deep snapshot of an element's observable state.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ElementSnapshot> {
        self.element(name).map(Element::snapshot)
    }

    // --- Listeners ---

    /// Register a listener. Returns `false` (no-op) for an unknown name.
    ///
    /// Only the first listener registered for a given event kind ever fires;
    /// later registrations are dead entries.
    pub fn add_listener(&mut self, name: &str, event: EventKind, callback: ListenerCallback) -> bool {
        let Some(element) = self.element_mut(name) else {
            return false;
        };
        element.listeners.push(Listener { event, callback });
        true
    }

    // --- Params ---

    /// Shallow-merge `patch` into an element's params (per-key overwrite;
    /// nested values are replaced wholesale). Returns whether the scene
    /// changed; unknown names are a silent no-op.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParams`] if the merged result no longer validates for
    /// the element's kind; the element is left unchanged in that case.
    pub fn set_params(&mut self, name: &str, patch: Params) -> Result<bool, Error> {
        validate_patch(name, &patch)?;
        let Some(&i) = self.index.get(name) else {
            return Ok(false);
        };
        let element = &mut self.elements[i];
        let merged = merge_params(element.params.clone(), patch);
        validate_params(name, element.kind, &merged)?;
        element.params = merged;
        Ok(true)
    }

    // --- Paint-order manipulation ---

    /// Move an element one level toward the top. No-op on the top element or
    /// an unknown name; returns whether the scene changed.
    pub fn level_up(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&i) if i + 1 < self.elements.len() => {
                self.elements.swap(i, i + 1);
                self.rebuild_index();
                true
            }
            _ => false,
        }
    }

    /// Move an element one level toward the bottom. No-op on the bottom
    /// element or an unknown name; returns whether the scene changed.
    pub fn level_down(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&i) if i > 0 => {
                self.elements.swap(i, i - 1);
                self.rebuild_index();
                true
            }
            _ => false,
        }
    }

    /// Move an element to the top of the paint order.
    pub fn to_top(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&i) if i + 1 < self.elements.len() => {
                let element = self.elements.remove(i);
                self.elements.push(element);
                self.rebuild_index();
                true
            }
            _ => false,
        }
    }

    /// Move an element to the bottom of the paint order.
    pub fn to_bottom(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&i) if i > 0 => {
                let element = self.elements.remove(i);
                self.elements.insert(0, element);
                self.rebuild_index();
                true
            }
            _ => false,
        }
    }

    /// Move an element to an absolute level, clamped to `[0, len - 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_level(&mut self, name: &str, level: i64) -> bool {
        let Some(&i) = self.index.get(name) else {
            return false;
        };
        let top = self.elements.len() as i64 - 1;
        let target = level.clamp(0, top) as usize;
        if target == i {
            return false;
        }
        let element = self.elements.remove(i);
        self.elements.insert(target, element);
        self.rebuild_index();
        true
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, element) in self.elements.iter().enumerate() {
            self.index.insert(element.name().to_owned(), i);
        }
    }
}
