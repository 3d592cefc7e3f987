//! Snapshot-file backing store.
//!
//! Entries live in memory and are written to a single snapshot file:
//!
//! ```text
//! magic "SCR\0" | version u8 | len u64 LE | JSON object bytes | crc32 u32 LE
//! ```
//!
//! The snapshot is replaced atomically (write temp file, then rename). A
//! `LOCK` file held with `fs2` keeps two processes from sharing a directory.

use super::{entry_size, BackingStore};
use crate::error::{Result, StorageError};
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for snapshot files.
const SNAPSHOT_MAGIC: &[u8; 4] = b"SCR\0";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

const SNAPSHOT_FILE: &str = "scroll.bin";
const SNAPSHOT_TMP_FILE: &str = "scroll.bin.tmp";
const LOCK_FILE: &str = "LOCK";

/// File backend configuration.
#[derive(Clone, Debug)]
pub struct FileBackendConfig {
    /// Directory holding the snapshot and lock file.
    pub path: PathBuf,

    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Max bytes of keys + values (None = unlimited).
    pub quota_bytes: Option<usize>,

    /// Rewrite the snapshot on every mutation. When false, call
    /// [`FileBackend::flush`] (also attempted on drop).
    pub sync_on_write: bool,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./scroll-state"),
            create_if_missing: true,
            quota_bytes: Some(5 * 1024 * 1024), // 5MB, the usual browser limit
            sync_on_write: true,
        }
    }
}

/// Durable backing store persisted to a snapshot file.
pub struct FileBackend {
    config: FileBackendConfig,

    /// Lock file for exclusive access.
    _lock_file: File,

    entries: Mutex<BTreeMap<String, String>>,

    /// Set when memory holds changes not yet in the snapshot.
    dirty: Mutex<bool>,
}

impl FileBackend {
    /// Open an existing directory or create a new one.
    ///
    /// A damaged snapshot is an error; see [`FileBackend::open_or_recover`].
    pub fn open(config: FileBackendConfig) -> Result<Self> {
        if !config.path.exists() {
            if !config.create_if_missing {
                return Err(StorageError::NotInitialized);
            }
            fs::create_dir_all(&config.path)?;
        }

        let lock_file = Self::acquire_lock(&config.path)?;
        let entries = Self::read_snapshot(&config.path.join(SNAPSHOT_FILE))?;

        Ok(Self {
            config,
            _lock_file: lock_file,
            entries: Mutex::new(entries),
            dirty: Mutex::new(false),
        })
    }

    /// Like [`FileBackend::open`], but a damaged snapshot is logged and
    /// replaced by an empty store instead of failing.
    pub fn open_or_recover(config: FileBackendConfig) -> Result<Self> {
        match Self::open(config.clone()) {
            Err(
                e @ (StorageError::Corruption(_)
                | StorageError::ChecksumMismatch { .. }
                | StorageError::InvalidFormat(_)),
            ) => {
                tracing::warn!(
                    path = %config.path.display(),
                    error = %e,
                    "discarding unreadable scroll snapshot"
                );
                fs::remove_file(config.path.join(SNAPSHOT_FILE))?;
                Self::open(config)
            }
            other => other,
        }
    }

    /// Directory this backend persists to.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Write pending changes to the snapshot file.
    pub fn flush(&self) -> Result<()> {
        // Same lock order as `commit`: entries, then dirty
        let entries = self.entries.lock();
        let mut dirty = self.dirty.lock();
        if !*dirty {
            return Ok(());
        }
        self.write_snapshot(&entries)?;
        *dirty = false;
        Ok(())
    }

    /// Persist after a mutation, or just mark dirty.
    fn commit(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if self.config.sync_on_write {
            self.write_snapshot(entries)
        } else {
            *self.dirty.lock() = true;
            Ok(())
        }
    }

    fn write_snapshot(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let body = serde_json::to_vec(entries)?;

        let tmp_path = self.config.path.join(SNAPSHOT_TMP_FILE);
        let mut file = File::create(&tmp_path)?;

        file.write_all(SNAPSHOT_MAGIC)?;
        file.write_all(&[SNAPSHOT_VERSION])?;
        file.write_all(&(body.len() as u64).to_le_bytes())?;
        file.write_all(&body)?;
        file.write_all(&crc32fast::hash(&body).to_le_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, self.config.path.join(SNAPSHOT_FILE))?;
        Ok(())
    }

    fn read_snapshot(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let mut file = File::open(path)?;

        // Read and verify magic
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)
            .map_err(|_| StorageError::Corruption("truncated snapshot header".into()))?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(StorageError::InvalidFormat("Invalid snapshot magic".into()));
        }

        let mut version = [0u8; 1];
        file.read_exact(&mut version)
            .map_err(|_| StorageError::Corruption("truncated snapshot header".into()))?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(StorageError::InvalidFormat(format!(
                "Unsupported snapshot version: {}",
                version[0]
            )));
        }

        let mut len_bytes = [0u8; 8];
        file.read_exact(&mut len_bytes)
            .map_err(|_| StorageError::Corruption("truncated snapshot length".into()))?;
        let len = u64::from_le_bytes(len_bytes) as usize;

        let file_len = file.metadata()?.len() as usize;
        if len > file_len {
            return Err(StorageError::Corruption(format!(
                "snapshot claims {} bytes, file has {}",
                len, file_len
            )));
        }

        let mut body = vec![0u8; len];
        file.read_exact(&mut body)
            .map_err(|_| StorageError::Corruption("truncated snapshot body".into()))?;

        let mut checksum_bytes = [0u8; 4];
        file.read_exact(&mut checksum_bytes)
            .map_err(|_| StorageError::Corruption("missing snapshot checksum".into()))?;
        let stored_checksum = u32::from_le_bytes(checksum_bytes);
        let computed_checksum = crc32fast::hash(&body);

        if stored_checksum != computed_checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: stored_checksum,
                got: computed_checksum,
            });
        }

        serde_json::from_slice(&body).map_err(|e| StorageError::Corruption(e.to_string()))
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = File::create(path.join(LOCK_FILE))?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| StorageError::Locked)?;

        Ok(lock_file)
    }
}

impl BackingStore for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();

        if let Some(quota) = self.config.quota_bytes {
            let current: usize = entries.iter().map(|(k, v)| entry_size(k, v)).sum();
            let replaced = entries.get(key).map_or(0, |old| entry_size(key, old));
            let used = current - replaced + entry_size(key, value);
            if used > quota {
                return Err(StorageError::QuotaExceeded { used, quota });
            }
        }

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.commit(&entries) {
            // Keep memory consistent with what is on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.commit(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock();
        let previous = std::mem::take(&mut *entries);
        if let Err(e) = self.commit(&entries) {
            *entries = previous;
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        // Best-effort flush on drop
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> FileBackendConfig {
        FileBackendConfig {
            path: dir.path().join("scroll"),
            ..Default::default()
        }
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileBackend::open(config(&dir)).unwrap();
            store.set_item("@@scroll|k1", "[0,120]").unwrap();
        }

        let store = FileBackend::open(config(&dir)).unwrap();
        assert_eq!(
            store.get_item("@@scroll|k1").unwrap().as_deref(),
            Some("[0,120]")
        );
    }

    #[test]
    fn test_missing_dir_without_create() {
        let dir = TempDir::new().unwrap();
        let result = FileBackend::open(FileBackendConfig {
            create_if_missing: false,
            ..config(&dir)
        });
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }

    #[test]
    fn test_second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let _first = FileBackend::open(config(&dir)).unwrap();

        let second = FileBackend::open(config(&dir));
        assert!(matches!(second, Err(StorageError::Locked)));
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileBackend::open(config(&dir)).unwrap();
            store.set_item("a", "1").unwrap();
        }

        // Flip a byte inside the JSON body
        let snapshot = dir.path().join("scroll").join(SNAPSHOT_FILE);
        let mut bytes = fs::read(&snapshot).unwrap();
        bytes[14] ^= 0xFF;
        fs::write(&snapshot, bytes).unwrap();

        let result = FileBackend::open(config(&dir));
        assert!(matches!(result, Err(StorageError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_open_or_recover_discards_garbage() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scroll")).unwrap();
        fs::write(dir.path().join("scroll").join(SNAPSHOT_FILE), b"not a snapshot").unwrap();

        assert!(FileBackend::open(config(&dir)).is_err());

        let store = FileBackend::open_or_recover(config(&dir)).unwrap();
        assert!(store.keys().unwrap().is_empty());
        store.set_item("a", "1").unwrap();
    }

    #[test]
    fn test_deferred_sync_flushes_on_drop() {
        let dir = TempDir::new().unwrap();
        let cfg = FileBackendConfig {
            sync_on_write: false,
            ..config(&dir)
        };
        {
            let store = FileBackend::open(cfg.clone()).unwrap();
            store.set_item("a", "1").unwrap();
            assert!(!dir.path().join("scroll").join(SNAPSHOT_FILE).exists());
        }

        let store = FileBackend::open(cfg).unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_failed_remove_keeps_entry() {
        let dir = TempDir::new().unwrap();
        let store = FileBackend::open(config(&dir)).unwrap();
        store.set_item("k1", "[0,1]").unwrap();
        store.set_item("k2", "[0,2]").unwrap();

        // A directory in the temp file's place makes every snapshot write fail
        fs::create_dir(dir.path().join("scroll").join(SNAPSHOT_TMP_FILE)).unwrap();

        assert!(store.remove_item("k1").is_err());
        assert_eq!(store.get_item("k1").unwrap().as_deref(), Some("[0,1]"));

        assert!(store.clear().is_err());
        assert_eq!(store.keys().unwrap(), vec!["k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_failed_clear_matches_disk_after_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileBackend::open(config(&dir)).unwrap();
            store.set_item("k1", "[0,1]").unwrap();
            fs::create_dir(dir.path().join("scroll").join(SNAPSHOT_TMP_FILE)).unwrap();
            assert!(store.clear().is_err());
            assert_eq!(store.keys().unwrap().len(), 1);
        }

        fs::remove_dir(dir.path().join("scroll").join(SNAPSHOT_TMP_FILE)).unwrap();
        let store = FileBackend::open(config(&dir)).unwrap();
        assert_eq!(store.get_item("k1").unwrap().as_deref(), Some("[0,1]"));
    }

    #[test]
    fn test_quota_enforced() {
        let dir = TempDir::new().unwrap();
        let store = FileBackend::open(FileBackendConfig {
            quota_bytes: Some(4),
            ..config(&dir)
        })
        .unwrap();

        assert!(matches!(
            store.set_item("key", "value"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert!(store.get_item("key").unwrap().is_none());
    }
}
