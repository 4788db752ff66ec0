//! Persisted key/value state that survives restarts.
//!
//! The storefront keeps two small pieces of state across runs: the
//! "remembered user" snapshot and the theme preference. Both are plain
//! strings stored under fixed keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{StorefrontError, StorefrontResult};

/// Key of the serialized [`User`](bookstore_core::models::User) snapshot.
pub const REMEMBERED_USER_KEY: &str = "rememberedUser";

/// Key of the theme preference (`"dark"` or `"light"`).
pub const THEME_KEY: &str = "theme";

/// A string key/value store.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorefrontResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorefrontResult<()>;
    fn remove(&self, key: &str) -> StorefrontResult<()>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorefrontResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorefrontResult<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorefrontResult<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Storage backed by a single JSON object file.
///
/// The whole map is held in memory and rewritten on every change. Writes
/// go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write never leaves a truncated file behind. The in-memory map
/// only changes once the write has succeeded.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A file that is not a JSON object of strings is treated as empty
    /// and overwritten on the next change.
    pub fn open(path: impl Into<PathBuf>) -> StorefrontResult<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt storage file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened storage file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorefrontResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorefrontResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorefrontResult<()> {
        let mut entries = lock(&self.entries)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorefrontResult<()> {
        let mut entries = lock(&self.entries)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

// ---- private helpers ----

fn lock<T>(mutex: &Mutex<T>) -> StorefrontResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StorefrontError::Storage("storage lock poisoned".to_string()))
}
