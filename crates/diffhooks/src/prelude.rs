//! Prelude for convenient imports.

pub use diffhooks_core::{ErrorKind, HookError, HookResult};

pub use crate::builtin::SaveEverythingHook;
pub use crate::dispatcher::HookDispatcher;
pub use crate::hook::{Hook, HookClass};
pub use crate::manifest::HookManifest;
pub use crate::registry::HookRegistry;
pub use crate::store::{HookStore, Retention, StoredValue};
