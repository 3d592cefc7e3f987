//! In-memory backing store.

use super::{entry_size, BackingStore};
use crate::error::{Result, StorageError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-lifetime store, the equivalent of one browsing session.
///
/// An optional byte quota and a disable switch reproduce the ways a real
/// `sessionStorage` refuses writes.
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    /// Max bytes of keys + values (None = unlimited).
    quota: Option<usize>,
    disabled: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty, unlimited store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: None,
            disabled: AtomicBool::new(false),
        }
    }

    /// Create an empty store that rejects writes past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Turn every subsequent operation into `StorageError::Unavailable`.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .map(|(k, v)| entry_size(k, v))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn check_enabled(&self) -> Result<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory storage disabled".into()));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingStore for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.check_enabled()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_enabled()?;
        let mut entries = self.entries.lock();

        if let Some(quota) = self.quota {
            let current: usize = entries.iter().map(|(k, v)| entry_size(k, v)).sum();
            let replaced = entries.get(key).map_or(0, |old| entry_size(key, old));
            let used = current - replaced + entry_size(key, value);
            if used > quota {
                return Err(StorageError::QuotaExceeded { used, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_enabled()?;
        self.entries.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_enabled()?;
        self.entries.lock().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_enabled()?;
        Ok(self.entries.lock().keys().cloned().collect())
    }
}
