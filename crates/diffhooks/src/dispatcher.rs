//! Hook dispatcher — owns the class registry and the enabled instances,
//! and fans lifecycle calls out to every enabled hook.
//!
//! Fan-out (`set`, `close`, `after_diffusion_step`) runs in enable order.
//! There is no per-hook error isolation: the first hook that fails aborts
//! delivery to the hooks after it, and the error surfaces to the caller.
//!
//! The dispatcher is itself a [`Hook`] so it can stand wherever a single
//! hook is expected, but its `get` is unsupported (a broadcast read has no
//! single return value) and its own store is unused.

use tracing::{debug, info, warn};

use diffhooks_core::{HookError, HookResult};

use crate::hook::{Hook, HookClass};
#[cfg(feature = "dynamic")]
use crate::loader::DynamicLoader;
use crate::registry::HookRegistry;
use crate::store::{HookStore, Retention, StoredValue};

/// One enabled hook instance, tagged with the class name it was enabled
/// under.
#[derive(Debug)]
struct EnabledHook {
    /// Class name this instance was enabled under.
    name: String,
    /// The instance.
    hook: Box<dyn Hook>,
}

/// Registry of hook classes plus the currently enabled instances.
///
/// Construct one per sampling run and pass it by reference to whatever
/// drives the pipeline; there is no process-wide instance.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Known hook classes.
    registry: HookRegistry,
    /// Enabled instances, in enable order. At most one per class name.
    /// Declared before the loader so instances drop before any library
    /// they came from is unloaded.
    enabled: Vec<EnabledHook>,
    /// Dynamic library loader. Keeps loaded libraries alive for the
    /// dispatcher's lifetime.
    #[cfg(feature = "dynamic")]
    loader: DynamicLoader,
    /// Unused in broadcast mode; present because the dispatcher is a
    /// `Hook` itself.
    store: HookStore,
}

impl HookDispatcher {
    /// Creates a dispatcher with an empty class registry.
    pub fn new() -> Self {
        Self {
            registry: HookRegistry::new(),
            enabled: Vec::new(),
            #[cfg(feature = "dynamic")]
            loader: DynamicLoader::new(),
            store: HookStore::new(),
        }
    }

    /// Creates a dispatcher with the builtin hook classes already
    /// registered.
    pub fn with_builtins() -> Self {
        let mut dispatcher = Self::new();
        for class in crate::builtin::builtin_classes() {
            dispatcher.register_hook_class(class);
        }
        dispatcher
    }

    /// Registers a hook class, overwriting any previous registration under
    /// the same name.
    pub fn register_hook_class(&mut self, class: HookClass) {
        self.registry.register(class);
    }

    /// Instantiates the class registered under `name` and adds the
    /// instance to the enabled set.
    ///
    /// Fails with not-found when no class is registered under `name`; the
    /// error message lists the registered names. Re-enabling an enabled
    /// name replaces the instance in place; the previous instance is
    /// dropped without `close` being called on it.
    pub fn enable(&mut self, name: &str) -> HookResult<()> {
        let class = self.registry.get(name).ok_or_else(|| {
            HookError::not_found(format!(
                "hook '{}' not found, registered hooks: [{}]",
                name,
                self.registry.names().join(", ")
            ))
        })?;

        let hook = class.instantiate();

        if let Some(entry) = self.enabled.iter_mut().find(|e| e.name == name) {
            warn!(hook = %name, "Hook already enabled, previous instance dropped without close");
            entry.hook = hook;
        } else {
            info!(hook = %name, "Hook enabled");
            self.enabled.push(EnabledHook {
                name: name.to_string(),
                hook,
            });
        }

        Ok(())
    }

    /// Broadcasts one `set` per entry, in the entries' iteration order.
    pub fn set_many<I>(&mut self, entries: I, retention: Retention) -> HookResult<()>
    where
        I: IntoIterator<Item = (String, StoredValue)>,
    {
        for (key, value) in entries {
            self.set(&key, value, retention)?;
        }
        Ok(())
    }

    /// Returns the enabled hook names, in enable order.
    pub fn enabled_names(&self) -> Vec<&str> {
        self.enabled.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns whether a hook is enabled under `name`.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|e| e.name == name)
    }

    /// Returns the enabled instance under `name`, if any.
    pub fn hook(&self, name: &str) -> Option<&dyn Hook> {
        self.enabled
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.hook.as_ref())
    }

    /// Mutable access to the enabled instance under `name`, if any.
    pub fn hook_mut(&mut self, name: &str) -> Option<&mut (dyn Hook + 'static)> {
        self.enabled
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| e.hook.as_mut())
    }

    /// Returns the class registry.
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    #[cfg(feature = "dynamic")]
    pub(crate) fn loader_mut(&mut self) -> &mut DynamicLoader {
        &mut self.loader
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hook for HookDispatcher {
    fn name(&self) -> &'static str {
        "dispatcher"
    }

    fn store(&self) -> &HookStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut HookStore {
        &mut self.store
    }

    /// Always fails: a read broadcast to multiple hooks has no
    /// well-defined single return value. Read from an individual hook via
    /// [`HookDispatcher::hook`] instead.
    fn get(&self, _key: &str) -> HookResult<StoredValue> {
        Err(HookError::not_implemented(
            "the dispatcher does not support get, read from an individual enabled hook",
        ))
    }

    /// Broadcasts the value to every enabled hook, in enable order.
    fn set(&mut self, key: &str, value: StoredValue, retention: Retention) -> HookResult<()> {
        debug!(key = %key, hooks = self.enabled.len(), "Broadcasting set");

        for entry in &mut self.enabled {
            entry.hook.set(key, value.clone(), retention)?;
        }
        Ok(())
    }

    /// Calls `close` on every enabled hook, in enable order.
    ///
    /// The enabled set is not cleared afterward; instances stay enabled
    /// from the registry's point of view even though closed.
    fn close(&mut self) -> HookResult<()> {
        debug!(hooks = self.enabled.len(), "Closing enabled hooks");

        for entry in &mut self.enabled {
            entry.hook.close()?;
        }
        Ok(())
    }

    /// Notifies every enabled hook that one generation step completed, in
    /// enable order.
    fn after_diffusion_step(&mut self) -> HookResult<()> {
        debug!(hooks = self.enabled.len(), "Dispatching after_diffusion_step");

        for entry in &mut self.enabled {
            entry.hook.after_diffusion_step()?;
        }
        Ok(())
    }
}
