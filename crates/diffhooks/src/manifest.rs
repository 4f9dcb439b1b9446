//! Declarative hook manifests.
//!
//! A manifest is a trusted TOML file naming the hook libraries to load and
//! the hooks to enable, replacing any form of executable plugin
//! description:
//!
//! ```toml
//! enable = ["save_everything"]
//!
//! [[libraries]]
//! path = "plugins/libstep_recorder.so"
//! ```
//!
//! Libraries require the `dynamic` feature; a manifest naming libraries
//! without it is a configuration error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use diffhooks_core::HookResult;

use crate::dispatcher::HookDispatcher;

/// One dynamic library entry in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    /// Path to the shared library, relative to the process working
    /// directory unless absolute.
    pub path: PathBuf,
}

/// Parsed hook manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookManifest {
    /// Hook names to enable, in order. Names must resolve against the
    /// dispatcher's registry after the manifest's libraries are loaded.
    #[serde(default)]
    pub enable: Vec<String>,
    /// Dynamic libraries to load and register before enabling.
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

impl HookManifest {
    /// Loads a manifest from a TOML file.
    ///
    /// Fails with a configuration error when the file is missing or not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> HookResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?;

        let manifest: HookManifest = settings.try_deserialize()?;

        info!(
            path = %path.display(),
            libraries = manifest.libraries.len(),
            enable = manifest.enable.len(),
            "Hook manifest loaded"
        );

        Ok(manifest)
    }
}

impl HookDispatcher {
    /// Loads a manifest file, registers the classes from its libraries,
    /// then enables each name in its `enable` list, in order.
    ///
    /// Errors propagate immediately: a missing or malformed manifest, a
    /// library that fails to load, or an `enable` name with no registered
    /// class all abort the remainder of the manifest.
    ///
    /// # Safety (libraries)
    /// Library contents are fully trusted, as with
    /// [`DynamicLoader`](crate::loader::DynamicLoader).
    pub fn apply_manifest(&mut self, path: &Path) -> HookResult<()> {
        let manifest = HookManifest::load(path)?;

        self.register_manifest_libraries(&manifest)?;

        for name in &manifest.enable {
            self.enable(name)?;
        }

        Ok(())
    }

    #[cfg(feature = "dynamic")]
    fn register_manifest_libraries(&mut self, manifest: &HookManifest) -> HookResult<()> {
        for library in &manifest.libraries {
            // Manifest files are trusted input, same as the libraries they
            // point at.
            let class = unsafe { self.loader_mut().load_from_path(&library.path) }?;
            self.register_hook_class(class);
        }
        Ok(())
    }

    #[cfg(not(feature = "dynamic"))]
    fn register_manifest_libraries(&mut self, manifest: &HookManifest) -> HookResult<()> {
        if !manifest.libraries.is_empty() {
            return Err(diffhooks_core::HookError::configuration(
                "manifest lists hook libraries but the 'dynamic' feature is not enabled",
            ));
        }
        Ok(())
    }
}
