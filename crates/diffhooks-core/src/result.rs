//! Convenience result type alias for diffhooks.

use crate::error::HookError;

/// A specialized `Result` type for diffhooks operations.
///
/// Defined as a convenience so that every crate does not need to write
/// `Result<T, HookError>` explicitly.
pub type HookResult<T> = Result<T, HookError>;
