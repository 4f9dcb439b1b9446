//! Builtin hook classes shipped with the crate.

use crate::hook::{Hook, HookClass};
use crate::store::HookStore;

/// Hook intended to snapshot every value the pipeline publishes.
///
/// Currently a stub that inherits every default behavior; it exists as the
/// template concrete hooks follow.
// TODO: override after_diffusion_step to persist the published values once
// an artifact format is settled.
#[derive(Debug, Default)]
pub struct SaveEverythingHook {
    /// Published values.
    store: HookStore,
}

impl SaveEverythingHook {
    /// Registry name of this hook class.
    pub const NAME: &'static str = "save_everything";

    /// Creates a new instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registrable class for this hook.
    pub fn class() -> HookClass {
        HookClass::new(Self::NAME, || Box::new(Self::new()))
    }
}

impl Hook for SaveEverythingHook {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn store(&self) -> &HookStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut HookStore {
        &mut self.store
    }
}

/// Returns the classes registered by [`HookDispatcher::with_builtins`].
///
/// [`HookDispatcher::with_builtins`]: crate::dispatcher::HookDispatcher::with_builtins
pub fn builtin_classes() -> Vec<HookClass> {
    vec![SaveEverythingHook::class()]
}
