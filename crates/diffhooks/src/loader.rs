//! Dynamic hook class loader using `libloading` (feature-gated).

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::Path;

    use tracing::info;

    use diffhooks_core::{HookError, HookResult};

    use crate::hook::HookClass;

    /// Type of the class creation function exported by dynamic hook
    /// libraries.
    ///
    /// Dynamic libraries must export:
    /// `extern "C" fn create_hook_class() -> *mut HookClass`
    pub type CreateHookClassFn = unsafe extern "C" fn() -> *mut HookClass;

    /// Loads hook classes from shared libraries (.so / .dll / .dylib).
    pub struct DynamicLoader {
        /// Loaded libraries (kept alive for the lifetime of the loader).
        _libraries: Vec<libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                _libraries: Vec::new(),
            }
        }

        /// Loads a hook class from the given shared library path.
        ///
        /// # Safety
        /// This function loads arbitrary code from a shared library.
        /// Only load trusted libraries.
        pub unsafe fn load_from_path(&mut self, path: &Path) -> HookResult<HookClass> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                HookError::plugin(format!(
                    "failed to load hook library '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let create_fn: libloading::Symbol<CreateHookClassFn> =
                unsafe { lib.get(b"create_hook_class") }.map_err(|e| {
                    HookError::plugin(format!(
                        "hook library '{}' missing 'create_hook_class' symbol: {}",
                        path.display(),
                        e
                    ))
                })?;

            let class = unsafe { *Box::from_raw(create_fn()) };

            info!(
                path = %path.display(),
                hook = %class.name(),
                "Dynamic hook class loaded"
            );

            self._libraries.push(lib);

            Ok(class)
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &self._libraries.len())
                .finish()
        }
    }
}

/// Stub loader when the dynamic feature is not enabled.
#[cfg(not(feature = "dynamic"))]
pub mod dynamic_loader {
    /// Stub dynamic loader.
    #[derive(Debug)]
    pub struct DynamicLoader;

    impl DynamicLoader {
        /// Creates a stub loader.
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub use dynamic_loader::DynamicLoader;
