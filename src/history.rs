//! Upload history cache.
//!
//! Keeps the most recent images a visitor attached on the contact page so
//! they can be reused without re-selecting the file. Entries hold the image
//! inline as a base64 data URL, which inflates the binary by about a third,
//! and the slot store lives in a size-limited medium. The list is therefore
//! capped at [`HISTORY_CAPACITY`] entries.
//!
//! Ordering is insertion order only: new entries are prepended and the list
//! is truncated, so the oldest entry falls off. Reusing an entry does not
//! move it to the front. The whole list is persisted on every mutation.

use crate::kv::{KeyValueStore, KvError, keys};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of cached uploads.
pub const HISTORY_CAPACITY: usize = 6;

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A cached upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    /// Random short token. Collisions are not checked.
    pub id: String,
    pub name: String,
    /// Inline `data:<mime>;base64,...` URL.
    pub data: String,
    /// Original file size in bytes.
    pub size: u64,
    /// Display date (`D/M/YYYY`), not meant to be parsed.
    pub date: String,
}

/// Name and size of a selected file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

/// A cached entry re-hydrated as if it had just been selected.
///
/// There is no binary handle; the image only exists as its data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub meta: FileMeta,
    pub data: String,
}

pub struct UploadHistory {
    kv: Arc<dyn KeyValueStore>,
    entries: Vec<StoredImage>,
}

impl UploadHistory {
    /// Load the persisted list. An unreadable list is logged and replaced by
    /// an empty one.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let entries = match kv.get(keys::UPLOAD_HISTORY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to parse upload history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { kv, entries }
    }

    /// Most recent first.
    pub fn entries(&self) -> &[StoredImage] {
        &self.entries
    }

    /// Record a new upload at the front of the list.
    pub fn add(&mut self, meta: &FileMeta, data_url: String) -> Result<StoredImage, HistoryError> {
        let image = StoredImage {
            id: generate_id(),
            name: meta.name.clone(),
            data: data_url,
            size: meta.size,
            date: chrono::Local::now().format("%-d/%-m/%Y").to_string(),
        };

        let mut updated = Vec::with_capacity(HISTORY_CAPACITY);
        updated.push(image.clone());
        updated.extend(self.entries.iter().cloned());
        updated.truncate(HISTORY_CAPACITY);

        self.persist(&updated)?;
        self.entries = updated;
        Ok(image)
    }

    /// Remove an entry by id. Removing an unknown id changes nothing.
    pub fn remove(&mut self, id: &str) -> Result<(), HistoryError> {
        let updated: Vec<StoredImage> = self
            .entries
            .iter()
            .filter(|img| img.id != id)
            .cloned()
            .collect();
        self.persist(&updated)?;
        self.entries = updated;
        Ok(())
    }

    /// Look up an entry for reuse.
    pub fn select(&self, id: &str) -> Option<SelectedFile> {
        self.entries
            .iter()
            .find(|img| img.id == id)
            .map(|img| SelectedFile {
                meta: FileMeta {
                    name: img.name.clone(),
                    size: img.size,
                },
                data: img.data.clone(),
            })
    }

    fn persist(&self, entries: &[StoredImage]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(entries)?;
        self.kv.set(keys::UPLOAD_HISTORY, &json)?;
        Ok(())
    }
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
