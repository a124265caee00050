//! Content store.
//!
//! Holds the current [`SiteContent`] in memory and mirrors it into the
//! `shield_cms_data` slot. Two operations:
//!
//! - [`ContentStore::load`] reads the slot. Nothing persisted, or a blob that
//!   fails to parse, yields the built-in default. Parse failures are logged
//!   and never reach the caller.
//! - [`ContentStore::commit`] replaces the whole value and persists it as one
//!   write, then pushes the new value to every subscriber.
//!
//! Subscribers are plain `mpsc` receivers; a dropped receiver is pruned on
//! the next commit.

use crate::content::SiteContent;
use crate::kv::{KeyValueStore, KvError, keys};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ContentStore {
    kv: Arc<dyn KeyValueStore>,
    current: SiteContent,
    subscribers: Vec<Sender<SiteContent>>,
}

impl ContentStore {
    /// Open the store, loading whatever is persisted.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let current = Self::load(kv.as_ref());
        Self {
            kv,
            current,
            subscribers: Vec::new(),
        }
    }

    /// Read the persisted content, falling back to the default.
    pub fn load(kv: &dyn KeyValueStore) -> SiteContent {
        let Some(raw) = kv.get(keys::SITE_CONTENT) else {
            return SiteContent::default();
        };
        match serde_json::from_str(&raw) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "content restore failed, using defaults");
                SiteContent::default()
            }
        }
    }

    pub fn current(&self) -> &SiteContent {
        &self.current
    }

    /// Replace the content wholesale and persist it.
    ///
    /// State is only replaced once the write succeeded, so a failed commit
    /// leaves memory and storage in agreement.
    pub fn commit(&mut self, new_content: SiteContent) -> Result<(), StoreError> {
        let json = serde_json::to_string(&new_content)?;
        self.kv.set(keys::SITE_CONTENT, &json)?;
        self.current = new_content;
        tracing::info!(
            services = self.current.services.len(),
            gallery = self.current.gallery.len(),
            "content committed"
        );
        self.notify();
        Ok(())
    }

    /// Drop any persisted content and return to the default.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.commit(SiteContent::default())
    }

    /// Receive every content value committed from now on.
    pub fn subscribe(&mut self) -> Receiver<SiteContent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self) {
        let current = &self.current;
        self.subscribers.retain(|tx| tx.send(current.clone()).is_ok());
    }
}
