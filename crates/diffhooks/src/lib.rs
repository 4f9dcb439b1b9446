//! # diffhooks
//!
//! Extension-point registry for diffusion sampling pipelines. Provides:
//!
//! - A weak/strong dual key-value store for per-step intermediate values
//! - The `Hook` trait with default lifecycle callbacks
//! - A registry of hook classes keyed by name
//! - A dispatcher that fans out `set` / `after_diffusion_step` / `close`
//!   to every enabled hook
//! - Declarative hook manifests, with optional dynamic loading via
//!   `libloading`
//!
//! The host sampling loop constructs one [`HookDispatcher`], enables the
//! hooks it wants, publishes intermediate values with
//! [`HookDispatcher::set_many`], and notifies the end of each generation
//! step through [`Hook::after_diffusion_step`].

pub mod builtin;
pub mod dispatcher;
pub mod hook;
pub mod loader;
pub mod manifest;
pub mod prelude;
pub mod registry;
pub mod store;

pub use builtin::SaveEverythingHook;
pub use dispatcher::HookDispatcher;
pub use hook::{Hook, HookClass};
pub use manifest::HookManifest;
pub use registry::HookRegistry;
pub use store::{HookStore, Retention, StoredValue};
