//! Backing stores for persisted scroll state.
//!
//! A backing store is a flat string-to-string map in the shape of the
//! browser's `sessionStorage`. Every operation may fail (storage disabled,
//! quota exceeded, IO errors); callers above this layer decide how to
//! degrade.
//!
//! Two implementations ship with the crate:
//! - [`MemoryBackend`]: lives as long as the process, like a browsing session
//! - [`FileBackend`]: snapshot file on disk, survives restarts

mod file;
mod memory;

pub use file::{FileBackend, FileBackendConfig};
pub use memory::MemoryBackend;

use crate::error::Result;
use std::sync::Arc;

/// String key/value store with `sessionStorage` semantics.
pub trait BackingStore: Send + Sync {
    /// Look up a value. A missing key is `Ok(None)`, not an error.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value if present.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every value.
    fn clear(&self) -> Result<()>;

    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<B: BackingStore + ?Sized> BackingStore for Arc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Bytes an entry counts against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
