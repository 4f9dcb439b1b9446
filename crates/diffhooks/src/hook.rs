//! The `Hook` trait and the `HookClass` registration unit.

use std::fmt;

use diffhooks_core::HookResult;

use crate::store::{HookStore, Retention, StoredValue};

/// An observer of the diffusion sampling loop.
///
/// Every hook carries a [`HookStore`] for the values the pipeline publishes
/// to it. The lifecycle callbacks default to no-ops; concrete hooks
/// override the ones they care about (flush buffers in
/// [`close`](Self::close), emit artifacts in
/// [`after_diffusion_step`](Self::after_diffusion_step), and so on).
pub trait Hook: Send + fmt::Debug {
    /// The registry name of this hook's class.
    fn name(&self) -> &'static str;

    /// The hook's key-value store.
    fn store(&self) -> &HookStore;

    /// Mutable access to the hook's key-value store.
    fn store_mut(&mut self) -> &mut HookStore;

    /// Looks up a previously published value.
    ///
    /// Checks the weak map first, then the strong map. Fails with
    /// not-found when the key is absent from both, including when a
    /// weakly-retained value has already been dropped by its last owner.
    fn get(&self, key: &str) -> HookResult<StoredValue> {
        self.store().get(key)
    }

    /// Publishes a value to this hook.
    fn set(&mut self, key: &str, value: StoredValue, retention: Retention) -> HookResult<()> {
        self.store_mut().set(key, value, retention);
        Ok(())
    }

    /// Releases any resources owned by the hook. Called at most once per
    /// instance at the end of a run.
    fn close(&mut self) -> HookResult<()> {
        Ok(())
    }

    /// Notification that one generation step has completed.
    fn after_diffusion_step(&mut self) -> HookResult<()> {
        Ok(())
    }
}

/// A registered hook type: its registry name plus a constructor.
///
/// The class is registered once and instantiated each time its name is
/// enabled, so a hook type must be constructible with no arguments.
#[derive(Clone)]
pub struct HookClass {
    /// Registry name, unique per hook type.
    name: &'static str,
    /// Builds a fresh instance of the hook.
    constructor: fn() -> Box<dyn Hook>,
}

impl HookClass {
    /// Creates a hook class from a name and a constructor.
    pub fn new(name: &'static str, constructor: fn() -> Box<dyn Hook>) -> Self {
        Self { name, constructor }
    }

    /// Returns the registry name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a fresh instance of the hook.
    pub fn instantiate(&self) -> Box<dyn Hook> {
        (self.constructor)()
    }
}

impl fmt::Debug for HookClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookClass")
            .field("name", &self.name)
            .field("constructor", &"<fn>")
            .finish()
    }
}
