//! Contact-page image upload simulation.
//!
//! There is no upload backend. Selecting a file runs a local state machine
//! that validates it, inlines it as a data URL, waits a fixed delay to stand
//! in for network latency, and then records it in the [`UploadHistory`]:
//!
//! ```text
//! idle ──select──▶ uploading ──delay──▶ success
//!   │                  │
//!   └─ too large ─▶ error ◀── read failure
//! ```
//!
//! The size check happens before `uploading` is entered and never reads the
//! file. There is no retry transition; selecting another file starts over.
//! Nothing is transmitted when the quote form is submitted.

use crate::history::{FileMeta, HistoryError, SelectedFile, UploadHistory};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

/// Largest accepted upload: 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(1500);

/// Rejection message at the default limit.
pub const TOO_LARGE_MESSAGE: &str = "File too large (Maximum size is 5MB)";
pub const PROCESS_FAILED_MESSAGE: &str = "Failed to process image";

/// Rejection message naming the configured limit.
pub fn too_large_message(max_bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;
    let limit = if max_bytes % MB == 0 {
        format!("{}MB", max_bytes / MB)
    } else if max_bytes % KB == 0 {
        format!("{}KB", max_bytes / KB)
    } else {
        format!("{max_bytes} bytes")
    };
    format!("File too large (Maximum size is {limit})")
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_bytes: u64,
    pub simulated_delay: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            simulated_delay: DEFAULT_SIMULATED_DELAY,
        }
    }
}

/// One contact-form attachment slot.
pub struct UploadSession {
    settings: UploadSettings,
    status: UploadStatus,
    error_message: Option<String>,
    selected: Option<FileMeta>,
    preview: Option<String>,
    events: Option<Sender<UploadStatus>>,
}

impl UploadSession {
    pub fn new(settings: UploadSettings) -> Self {
        Self {
            settings,
            status: UploadStatus::Idle,
            error_message: None,
            selected: None,
            preview: None,
            events: None,
        }
    }

    /// Report every status transition on `tx`.
    pub fn with_events(mut self, tx: Sender<UploadStatus>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn selected(&self) -> Option<&FileMeta> {
        self.selected.as_ref()
    }

    /// Data URL of the current selection, once it has been read.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Select a file from disk and run the simulated upload.
    ///
    /// Validation problems end in [`UploadStatus::Error`] with a message and
    /// are not returned as `Err`; only a failure to persist the history is.
    pub async fn select_file(
        &mut self,
        path: &Path,
        history: &mut UploadHistory,
    ) -> Result<UploadStatus, UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.error_message = None;
        self.preview = None;

        let size = match tokio::fs::metadata(path).await {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat upload");
                self.selected = Some(FileMeta { name, size: 0 });
                self.fail(PROCESS_FAILED_MESSAGE);
                return Ok(self.status);
            }
        };
        let meta = FileMeta { name, size };
        self.selected = Some(meta.clone());

        if size > self.settings.max_bytes {
            self.fail(&too_large_message(self.settings.max_bytes));
            return Ok(self.status);
        }

        self.transition(UploadStatus::Uploading);

        let data_url = match tokio::fs::read(path).await {
            Ok(bytes) => to_data_url(&meta.name, &bytes),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read upload");
                self.fail(PROCESS_FAILED_MESSAGE);
                return Ok(self.status);
            }
        };
        self.preview = Some(data_url.clone());

        tokio::time::sleep(self.settings.simulated_delay).await;

        if let Err(e) = history.add(&meta, data_url) {
            self.fail(PROCESS_FAILED_MESSAGE);
            return Err(e.into());
        }
        self.transition(UploadStatus::Success);
        Ok(self.status)
    }

    /// Reuse a cached upload as the current selection.
    ///
    /// Returns `None` (and leaves the session untouched) for an unknown id.
    pub fn use_history_image(&mut self, history: &UploadHistory, id: &str) -> Option<SelectedFile> {
        let selected = history.select(id)?;
        self.selected = Some(selected.meta.clone());
        self.preview = Some(selected.data.clone());
        self.error_message = None;
        self.transition(UploadStatus::Success);
        Some(selected)
    }

    /// Clear the selection and return to idle.
    pub fn remove_file(&mut self) {
        self.selected = None;
        self.preview = None;
        self.error_message = None;
        self.transition(UploadStatus::Idle);
    }

    fn fail(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
        self.transition(UploadStatus::Error);
    }

    fn transition(&mut self, status: UploadStatus) {
        self.status = status;
        if let Some(tx) = &self.events {
            // A dropped listener must not break the upload.
            let _ = tx.send(status);
        }
    }
}

/// Encode bytes as a `data:` URL, typed by the file extension.
pub fn to_data_url(filename: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(filename), STANDARD.encode(bytes))
}

fn mime_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_kv;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn instant() -> UploadSettings {
        UploadSettings {
            max_bytes: MAX_UPLOAD_BYTES,
            simulated_delay: Duration::ZERO,
        }
    }

    fn empty_history() -> UploadHistory {
        UploadHistory::load(memory_kv())
    }

    fn sized_file(dir: &TempDir, name: &str, len: u64) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(len).unwrap();
        path
    }

    #[tokio::test]
    async fn oversized_file_errors_without_history_entry() {
        let tmp = TempDir::new().unwrap();
        let path = sized_file(&tmp, "big.jpg", 6 * 1024 * 1024);
        let mut history = empty_history();
        let (tx, rx) = mpsc::channel();
        let mut session = UploadSession::new(instant()).with_events(tx);

        let status = session.select_file(&path, &mut history).await.unwrap();

        assert_eq!(status, UploadStatus::Error);
        assert_eq!(session.error_message(), Some(TOO_LARGE_MESSAGE));
        assert!(history.entries().is_empty());
        // Never entered the uploading state.
        let seen: Vec<UploadStatus> = rx.try_iter().collect();
        assert_eq!(seen, vec![UploadStatus::Error]);
    }

    #[tokio::test]
    async fn configured_limit_is_named_in_message() {
        let tmp = TempDir::new().unwrap();
        let path = sized_file(&tmp, "medium.jpg", 3 * 1024 * 1024);
        let mut history = empty_history();
        let mut session = UploadSession::new(UploadSettings {
            max_bytes: 2 * 1024 * 1024,
            simulated_delay: Duration::ZERO,
        });

        session.select_file(&path, &mut history).await.unwrap();

        assert_eq!(session.status(), UploadStatus::Error);
        assert_eq!(
            session.error_message(),
            Some("File too large (Maximum size is 2MB)")
        );
        assert!(history.entries().is_empty());
    }

    #[test]
    fn too_large_message_units() {
        assert_eq!(too_large_message(MAX_UPLOAD_BYTES), TOO_LARGE_MESSAGE);
        assert_eq!(too_large_message(512 * 1024), "File too large (Maximum size is 512KB)");
        assert_eq!(too_large_message(1000), "File too large (Maximum size is 1000 bytes)");
    }

    #[tokio::test]
    async fn exactly_max_size_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = sized_file(&tmp, "edge.png", MAX_UPLOAD_BYTES);
        let mut history = empty_history();
        let mut session = UploadSession::new(instant());

        let status = session.select_file(&path, &mut history).await.unwrap();

        assert_eq!(status, UploadStatus::Success);
        assert_eq!(history.entries().len(), 1);
    }

    #[tokio::test]
    async fn small_file_reaches_success_after_delay() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wall.jpg");
        std::fs::write(&path, b"\xff\xd8\xff").unwrap();
        let mut history = empty_history();
        let (tx, rx) = mpsc::channel();
        let settings = UploadSettings {
            max_bytes: MAX_UPLOAD_BYTES,
            simulated_delay: Duration::from_millis(20),
        };
        let mut session = UploadSession::new(settings).with_events(tx);

        let started = std::time::Instant::now();
        let status = session.select_file(&path, &mut history).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(status, UploadStatus::Success);
        let seen: Vec<UploadStatus> = rx.try_iter().collect();
        assert_eq!(seen, vec![UploadStatus::Uploading, UploadStatus::Success]);
        assert_eq!(session.preview(), Some("data:image/jpeg;base64,/9j/"));
        assert_eq!(history.entries()[0].name, "wall.jpg");
        assert_eq!(history.entries()[0].size, 3);
    }

    #[tokio::test]
    async fn missing_file_is_a_processing_error() {
        let tmp = TempDir::new().unwrap();
        let mut history = empty_history();
        let mut session = UploadSession::new(instant());

        let status = session
            .select_file(&tmp.path().join("gone.jpg"), &mut history)
            .await
            .unwrap();

        assert_eq!(status, UploadStatus::Error);
        assert_eq!(session.error_message(), Some(PROCESS_FAILED_MESSAGE));
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn reselecting_after_error_clears_message() {
        let tmp = TempDir::new().unwrap();
        let big = sized_file(&tmp, "big.jpg", MAX_UPLOAD_BYTES + 1);
        let small = tmp.path().join("small.png");
        std::fs::write(&small, b"png").unwrap();
        let mut history = empty_history();
        let mut session = UploadSession::new(instant());

        session.select_file(&big, &mut history).await.unwrap();
        session.select_file(&small, &mut history).await.unwrap();

        assert_eq!(session.status(), UploadStatus::Success);
        assert_eq!(session.error_message(), None);
    }

    #[test]
    fn use_history_image_sets_success() {
        let mut history = empty_history();
        let image = history
            .add(
                &FileMeta {
                    name: "old.jpg".into(),
                    size: 10,
                },
                "data:x".into(),
            )
            .unwrap();
        let mut session = UploadSession::new(instant());

        let selected = session.use_history_image(&history, &image.id).unwrap();

        assert_eq!(selected.meta.name, "old.jpg");
        assert_eq!(session.status(), UploadStatus::Success);
        assert_eq!(session.preview(), Some("data:x"));
        assert!(session.use_history_image(&history, "unknown").is_none());
    }

    #[test]
    fn remove_file_returns_to_idle() {
        let mut session = UploadSession::new(instant());
        session.fail(TOO_LARGE_MESSAGE);
        session.remove_file();
        assert_eq!(session.status(), UploadStatus::Idle);
        assert_eq!(session.error_message(), None);
        assert!(session.selected().is_none());
    }

    #[test]
    fn data_url_uses_extension_mime() {
        assert_eq!(to_data_url("a.PNG", b"hi"), "data:image/png;base64,aGk=");
        assert!(to_data_url("a.bin", b"").starts_with("data:application/octet-stream;"));
    }
}
