//! Component registry for a single unit of work.
//!
//! The registry maps component ids to the components created in a
//! [`Scope`](crate::Scope). Any template rendered in that scope can embed a
//! registered component by referencing its id, without the component being a
//! field of the one being rendered.
//!
//! # Collision Handling
//!
//! Components are created freely while building a page, so duplicate ids are
//! tolerated: the later registration wins and a warning is logged. Entries
//! are never removed individually; [`Registry::clear`] resets everything.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::component::Component;

/// Mapping from component id to component.
#[derive(Default)]
pub struct Registry {
    components: BTreeMap<String, Rc<dyn Component>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component under its id, replacing any previous entry.
    ///
    /// Replacing an existing id logs a warning; it is not an error.
    pub fn register(&mut self, component: Rc<dyn Component>) {
        let id = component.id().to_string();
        if let Some(existing) = self.components.get(&id) {
            warn!(
                id = %id,
                component = component.type_name(),
                existing = existing.type_name(),
                "while registering {}(id={}) found an existing component with the same id; overwriting",
                component.type_name(),
                id
            );
        } else {
            trace!(id = %id, component = component.type_name(), "registered component");
        }
        self.components.insert(id, component);
    }

    /// Returns the full id-to-component mapping.
    pub fn entries(&self) -> &BTreeMap<String, Rc<dyn Component>> {
        &self.components
    }

    /// Looks up a component by id.
    pub fn get(&self, id: &str) -> Option<Rc<dyn Component>> {
        self.components.get(id).cloned()
    }

    /// Returns true if a component is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Registered ids, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|s| s.as_str())
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Removes every registered component.
    pub fn clear(&mut self) {
        trace!(count = self.components.len(), "clearing component registry");
        self.components.clear();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
