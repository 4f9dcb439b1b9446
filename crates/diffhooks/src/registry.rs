//! Hook class registry — hook types are registered by name before any of
//! them can be enabled.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::hook::HookClass;

/// Registry of known hook classes, keyed by class name.
///
/// Entries are only ever added; there is no unregister operation.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → registered class.
    classes: HashMap<String, HookClass>,
}

impl HookRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook class under its name, overwriting any previous
    /// registration with the same name.
    pub fn register(&mut self, class: HookClass) {
        let name = class.name();

        if self.classes.insert(name.to_string(), class).is_some() {
            warn!(hook = %name, "Hook class re-registered, previous class replaced");
        } else {
            info!(hook = %name, "Hook class registered");
        }
    }

    /// Returns the class registered under `name`.
    pub fn get(&self, name: &str) -> Option<&HookClass> {
        self.classes.get(name)
    }

    /// Returns whether a class is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns all registered class names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
