//! Weak/strong dual key-value store backing every hook.
//!
//! Large transient values (latents, attention maps) are published with
//! [`Retention::Weak`] so the store never keeps them alive on its own;
//! values the hook must outlive the sampling loop with use
//! [`Retention::Strong`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use diffhooks_core::{HookError, HookResult};

/// Type-erased value stored by a hook.
///
/// Values are not copied on publication; a weakly-retained value stays
/// reachable only while some other owner holds an `Arc` clone of it.
pub type StoredValue = Arc<dyn Any + Send + Sync>;

/// How long the store keeps a published value alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// The store holds a non-owning reference; the value disappears once
    /// its last external owner drops it.
    Weak,
    /// The store keeps the value alive for its own lifetime.
    Strong,
}

/// Two typed maps: a non-owning weak map consulted first, and an owning
/// strong map used as the fallback.
///
/// A key may exist in either or both maps independently. Writing to one
/// map never removes the key from the other.
#[derive(Default)]
pub struct HookStore {
    /// Key → non-owning reference. A dead entry behaves as absent.
    weak: HashMap<String, Weak<dyn Any + Send + Sync>>,
    /// Key → owned value.
    strong: HashMap<String, StoredValue>,
}

impl HookStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, consulting the weak map first and falling back to
    /// the strong map.
    ///
    /// A weak entry whose value has already been dropped counts as absent;
    /// that is the normal end of life for a weakly-retained value, not an
    /// error. Fails with [`diffhooks_core::ErrorKind::NotFound`] when the
    /// key is absent from both maps.
    pub fn get(&self, key: &str) -> HookResult<StoredValue> {
        if let Some(entry) = self.weak.get(key) {
            if let Some(value) = entry.upgrade() {
                return Ok(value);
            }
        }

        self.strong
            .get(key)
            .cloned()
            .ok_or_else(|| HookError::not_found(format!("key '{key}' not set")))
    }

    /// Typed lookup. Fails with a validation error when the stored value
    /// is not a `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> HookResult<Arc<T>> {
        self.get(key)?.downcast::<T>().map_err(|_| {
            HookError::validation(format!("key '{key}' holds a value of a different type"))
        })
    }

    /// Inserts or overwrites `key` in the map selected by `retention`.
    ///
    /// Last write wins within a map. The other map is left untouched, so a
    /// key written to both maps can yield whichever value is still live on
    /// a later [`get`](Self::get).
    pub fn set(&mut self, key: impl Into<String>, value: StoredValue, retention: Retention) {
        match retention {
            Retention::Weak => {
                self.weak.insert(key.into(), Arc::downgrade(&value));
            }
            Retention::Strong => {
                self.strong.insert(key.into(), value);
            }
        }
    }

    /// Removes weak entries whose value is gone and returns how many were
    /// evicted.
    ///
    /// Dead entries are already invisible to [`get`](Self::get); this only
    /// reclaims the map slots.
    pub fn evict_dead(&mut self) -> usize {
        let before = self.weak.len();
        self.weak.retain(|_, entry| entry.upgrade().is_some());
        before - self.weak.len()
    }

    /// Returns whether `key` currently resolves to a live value.
    pub fn contains(&self, key: &str) -> bool {
        self.weak
            .get(key)
            .is_some_and(|entry| entry.upgrade().is_some())
            || self.strong.contains_key(key)
    }

    /// Returns whether both maps are empty.
    pub fn is_empty(&self) -> bool {
        self.weak.is_empty() && self.strong.is_empty()
    }
}

impl fmt::Debug for HookStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookStore")
            .field("weak_keys", &self.weak.len())
            .field("strong_keys", &self.strong.len())
            .finish()
    }
}
