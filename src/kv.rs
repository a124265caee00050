//! Persistent key/value slots.
//!
//! Every piece of local state (site content, upload history, session flag,
//! deploy credentials) lives in a named string slot. Values are opaque
//! strings; callers serialize their own JSON into them.
//!
//! ## Storage
//!
//! [`FileKvStore`] keeps all slots in one JSON object at
//! `<data_dir>/storage.json`:
//!
//! ```text
//! {
//!   "shield_cms_data": "{\"assets\":{...},...}",
//!   "sfs_previous_uploads": "[...]",
//!   "shield_session_active": "true"
//! }
//! ```
//!
//! Each `set`/`remove` rewrites the whole file through a temp file and a
//! rename, so a single write either lands completely or not at all. There is
//! no locking across processes: the last writer wins.
//!
//! [`MemoryKvStore`] holds the same map in memory for tests.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Name of the slot file within the data directory.
pub const STORAGE_FILENAME: &str = "storage.json";

/// Well-known slot names.
pub mod keys {
    /// Serialized `SiteContent` blob.
    pub const SITE_CONTENT: &str = "shield_cms_data";
    /// Serialized upload history list (at most six entries).
    pub const UPLOAD_HISTORY: &str = "sfs_previous_uploads";
    /// `"true"` while an admin session is active.
    pub const SESSION_ACTIVE: &str = "shield_session_active";
    pub const GIT_TOKEN: &str = "sfs_git_token";
    pub const GIT_OWNER: &str = "sfs_git_owner";
    pub const GIT_REPO: &str = "sfs_git_repo";
}

#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-to-string slot storage shared by all components.
///
/// Methods take `&self` so one store can back the content store, the upload
/// history, the access gate and the credentials at the same time.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

/// File-backed slot store.
pub struct FileKvStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileKvStore {
    /// Open (or lazily create) the slot file inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, KvError> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(STORAGE_FILENAME),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all slots. A missing file is an empty store and a corrupt file
    /// is logged and also treated as empty. Any other read failure is
    /// returned so a write never replaces slots it could not see.
    fn read_all(&self) -> Result<BTreeMap<String, String>, KvError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "slot file unreadable, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> Result<(), KvError> {
        let json = serde_json::to_string_pretty(slots)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), KvError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut slots = self.read_all()?;
        f(&mut slots);
        self.write_all(&slots)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut slots) => slots.remove(key),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, key, "cannot read slot file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.modify(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.modify(|slots| {
            slots.remove(key);
        })
    }
}

/// In-memory slot store (no persistence).
#[derive(Default)]
pub struct MemoryKvStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.slots().remove(key);
        Ok(())
    }
}
