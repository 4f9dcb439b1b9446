//! # diffhooks-core
//!
//! Core crate for diffhooks. Contains the unified error system and the
//! result alias used by every other crate in the workspace.
//!
//! This crate has **no** internal dependencies on other diffhooks crates.

pub mod error;
pub mod result;

pub use error::{ErrorKind, HookError};
pub use result::HookResult;
