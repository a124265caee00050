//! Push generated sources to the site repository.
//!
//! Each generated file is written through the repository contents API. For
//! every path the current blob `sha` is looked up first, because updating an
//! existing file requires it; a failed lookup is treated as "file does not
//! exist yet". Files are pushed strictly one after another and the first
//! failed write aborts the run. Earlier writes are not rolled back.
//!
//! A push to the repository is what triggers the hosting provider to rebuild
//! the live site, so a successful [`sync`] is a deploy.

use crate::content::SiteContent;
use crate::credentials::DeployCredentials;
use crate::export::{ExportError, GeneratedFile, build_file_set};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_secs(5);

const AGENT: &str = concat!("shield-cms/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Please provide GitHub Token, Username, and Repo Name.")]
    MissingCredentials,
    #[error("Failed to push {path}. Check permissions.")]
    PushFailed { path: String },
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedFile {
    pub path: String,
    pub action: PushAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub message: String,
    pub files: Vec<PushedFile>,
}

#[derive(Deserialize)]
struct ContentsEntry {
    sha: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Client for the repository contents endpoint.
#[derive(Debug, Clone)]
pub struct RepoClient {
    client: reqwest::Client,
    base_url: String,
}

impl RepoClient {
    pub fn new() -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));
        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        })
    }

    /// Point the client at another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contents_url(&self, creds: &DeployCredentials, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url.trim_end_matches('/'),
            creds.owner,
            creds.repo,
            path
        )
    }

    /// Current blob sha of `path`, or `None` when it cannot be determined.
    pub async fn get_sha(&self, creds: &DeployCredentials, path: &str) -> Option<String> {
        let response = self
            .client
            .get(self.contents_url(creds, path))
            .bearer_auth(&creds.token)
            .send()
            .await;
        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(path, error = %e, "sha lookup failed, treating file as new");
                return None;
            }
        };
        let status = response.status();
        debug!(path, status = %status, "sha lookup");
        if !status.is_success() {
            return None;
        }
        match response.json::<ContentsEntry>().await {
            Ok(entry) => Some(entry.sha),
            Err(e) => {
                warn!(path, error = %e, "unreadable contents response");
                None
            }
        }
    }

    /// Create or overwrite `path` with `content`.
    pub async fn put_file(
        &self,
        creds: &DeployCredentials,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), SyncError> {
        let body = PutContents {
            message,
            content: STANDARD.encode(content.as_bytes()),
            sha,
        };
        let failed = || SyncError::PushFailed {
            path: path.to_string(),
        };

        let response = self
            .client
            .put(self.contents_url(creds, path))
            .bearer_auth(&creds.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "push request failed");
                failed()
            })?;

        let status = response.status();
        debug!(path, status = %status, "push response");
        if !status.is_success() {
            return Err(failed());
        }
        Ok(())
    }
}

/// Commit message for a deploy at `at`.
pub fn commit_message(at: &DateTime<Local>) -> String {
    format!(
        "Cloudflare Trigger: Updated Content & Gallery - {}",
        at.format("%-d/%-m/%Y, %-I:%M:%S %p")
    )
}

/// Push `files` in order. Missing credentials fail before any request.
pub async fn sync(
    client: &RepoClient,
    creds: &DeployCredentials,
    files: &[GeneratedFile],
) -> Result<SyncReport, SyncError> {
    if !creds.is_complete() {
        return Err(SyncError::MissingCredentials);
    }

    let message = commit_message(&Local::now());
    let mut report = SyncReport {
        message: message.clone(),
        files: Vec::with_capacity(files.len()),
    };

    for file in files {
        let sha = client.get_sha(creds, &file.path).await;
        client
            .put_file(creds, &file.path, &file.content, &message, sha.as_deref())
            .await?;
        let action = if sha.is_some() {
            PushAction::Updated
        } else {
            PushAction::Created
        };
        debug!(path = %file.path, ?action, "pushed");
        report.files.push(PushedFile {
            path: file.path.clone(),
            action,
        });
    }

    info!(
        owner = %creds.owner,
        repo = %creds.repo,
        files = report.files.len(),
        "sync complete"
    );
    Ok(report)
}

/// Render the deployable file set for `content` and push it.
pub async fn deploy_content(
    client: &RepoClient,
    creds: &DeployCredentials,
    content: &SiteContent,
) -> Result<SyncReport, SyncError> {
    if !creds.is_complete() {
        return Err(SyncError::MissingCredentials);
    }
    let files = build_file_set(content)?;
    sync(client, creds, &files).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Deploy status as shown to an operator.
///
/// `Success` reverts to `Idle` once `success_display` has passed. `Error`
/// stays until the next attempt. `Loading` only lasts while [`Deployer::deploy`]
/// runs, so observers subscribe with [`Deployer::with_events`].
pub struct Deployer {
    client: RepoClient,
    success_display: Duration,
    state: DeployState,
    succeeded_at: Option<Instant>,
    events: Option<Sender<DeployState>>,
}

impl Deployer {
    pub fn new(client: RepoClient, success_display: Duration) -> Self {
        Self {
            client,
            success_display,
            state: DeployState::Idle,
            succeeded_at: None,
            events: None,
        }
    }

    /// Report every state transition on `tx`.
    pub fn with_events(mut self, tx: Sender<DeployState>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> DeployState {
        match (&self.state, self.succeeded_at) {
            (DeployState::Success, Some(at)) if at.elapsed() >= self.success_display => {
                DeployState::Idle
            }
            (state, _) => state.clone(),
        }
    }

    pub async fn deploy(
        &mut self,
        creds: &DeployCredentials,
        content: &SiteContent,
    ) -> Result<SyncReport, SyncError> {
        self.succeeded_at = None;
        if !creds.is_complete() {
            let err = SyncError::MissingCredentials;
            self.transition(DeployState::Error(err.to_string()));
            return Err(err);
        }

        self.transition(DeployState::Loading);
        match deploy_content(&self.client, creds, content).await {
            Ok(report) => {
                self.succeeded_at = Some(Instant::now());
                self.transition(DeployState::Success);
                Ok(report)
            }
            Err(e) => {
                self.transition(DeployState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    fn transition(&mut self, state: DeployState) {
        if let Some(tx) = &self.events {
            let _ = tx.send(state.clone());
        }
        self.state = state;
    }
}
