//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity is shown by its identity first (positional index + title or
//! file name), with secondary facts as indented context lines:
//!
//! ```text
//! Services
//! 001 Interior Painting
//!     Id: interior-painting
//!     Features: 3
//!
//! Gallery
//! 001 Harbourside Living Room [Painting]
//! ```
//!
//! ## Uploads
//!
//! ```text
//! 001 wall.jpg (3.0 KB)
//!     Id: k3j9x0a1b
//!     Date: 2/3/2025
//! ```
//!
//! ## Deploy
//!
//! ```text
//! Syncing...
//! constants.tsx → updated
//! pages/Gallery.tsx → created
//!
//! Pushed 2 files
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::content::SiteContent;
use crate::credentials::DeployCredentials;
use crate::history::StoredImage;
use crate::sync::{DeployState, PushAction, SyncReport};
use crate::upload::{UploadSession, UploadStatus};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} {}", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Show only the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Content
// ============================================================================

pub fn format_content_summary(content: &SiteContent) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Assets".to_string());
    lines.push(format!("{}Logo: {}", indent(1), content.assets.logo));
    lines.push(format!("{}Home hero: {}", indent(1), content.assets.home.hero));

    lines.push(String::new());
    lines.push("Services".to_string());
    for (i, service) in content.services.iter().enumerate() {
        lines.push(entity_header(i + 1, &service.title, None));
        lines.push(format!("{}Id: {}", indent(1), service.id));
        lines.push(format!("{}Features: {}", indent(1), service.features.len()));
    }

    lines.push(String::new());
    lines.push("Gallery".to_string());
    for (i, item) in content.gallery.iter().enumerate() {
        let detail = format!("[{}]", item.category);
        lines.push(entity_header(i + 1, &item.title, Some(&detail)));
    }

    lines.push(String::new());
    lines.push("Contact".to_string());
    lines.push(format!("{}Phone: {}", indent(1), content.contact.phone));
    lines.push(format!("{}Email: {}", indent(1), content.contact.email));
    lines.push(format!("{}Address: {}", indent(1), content.contact.address));
    lines.push(format!("{}WhatsApp: {}", indent(1), content.contact.whatsapp));

    lines.push(String::new());
    lines.push("About".to_string());
    lines.push(format!("{}Title: {}", indent(1), content.about.title));
    lines.push(format!("{}Story paragraphs: {}", indent(1), content.about.story.len()));
    for (i, item) in content.about.philosophy.iter().enumerate() {
        let detail = format!("({})", item.kind);
        lines.push(format!(
            "{}{}",
            indent(1),
            entity_header(i + 1, &item.title, Some(&detail))
        ));
    }

    lines
}

pub fn print_content_summary(content: &SiteContent) {
    print_lines(format_content_summary(content));
}

// ============================================================================
// Uploads
// ============================================================================

pub fn format_uploads(entries: &[StoredImage]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No cached uploads".to_string()];
    }
    let mut lines = Vec::new();
    for (i, image) in entries.iter().enumerate() {
        let size = format!("({})", format_size(image.size));
        lines.push(entity_header(i + 1, &image.name, Some(&size)));
        lines.push(format!("{}Id: {}", indent(1), image.id));
        lines.push(format!("{}Date: {}", indent(1), image.date));
    }
    lines
}

pub fn print_uploads(entries: &[StoredImage]) {
    print_lines(format_uploads(entries));
}

pub fn format_upload_outcome(session: &UploadSession) -> Vec<String> {
    let name = session.selected().map(|m| m.name.as_str()).unwrap_or("file");
    match session.status() {
        UploadStatus::Success => vec![format!("Uploaded {}", name)],
        UploadStatus::Error => vec![format!(
            "Upload failed: {}",
            session.error_message().unwrap_or("unknown error")
        )],
        UploadStatus::Uploading => vec![format!("Uploading {}...", name)],
        UploadStatus::Idle => vec!["No file selected".to_string()],
    }
}

pub fn print_upload_outcome(session: &UploadSession) {
    print_lines(format_upload_outcome(session));
}

// ============================================================================
// Credentials and status
// ============================================================================

pub fn format_credentials(creds: &DeployCredentials) -> Vec<String> {
    let mut lines = vec![
        "Deploy credentials".to_string(),
        format!("{}Token: {}", indent(1), mask_secret(&creds.token)),
        format!("{}Owner: {}", indent(1), or_unset(&creds.owner)),
        format!("{}Repo: {}", indent(1), or_unset(&creds.repo)),
    ];
    let missing = creds.missing_fields();
    if !missing.is_empty() {
        lines.push(format!("{}Missing: {}", indent(1), missing.join(", ")));
    }
    lines
}

pub fn print_credentials(creds: &DeployCredentials) {
    print_lines(format_credentials(creds));
}

pub fn format_status(
    authenticated: bool,
    data_dir: &Path,
    creds: &DeployCredentials,
    cached_uploads: usize,
) -> Vec<String> {
    vec![
        format!(
            "Admin session: {}",
            if authenticated { "active" } else { "locked" }
        ),
        format!("{}Data dir: {}", indent(1), data_dir.display()),
        format!(
            "{}Deploy credentials: {}",
            indent(1),
            if creds.is_complete() { "complete" } else { "incomplete" }
        ),
        format!("{}Cached uploads: {}", indent(1), cached_uploads),
    ]
}

pub fn print_status(
    authenticated: bool,
    data_dir: &Path,
    creds: &DeployCredentials,
    cached_uploads: usize,
) {
    print_lines(format_status(authenticated, data_dir, creds, cached_uploads));
}

// ============================================================================
// Deploy, export, preview
// ============================================================================

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .files
        .iter()
        .map(|f| {
            let action = match f.action {
                PushAction::Created => "created",
                PushAction::Updated => "updated",
            };
            format!("{} → {}", f.path, action)
        })
        .collect();
    lines.push(String::new());
    lines.push(format!("Pushed {} files", report.files.len()));
    lines.push(format!("{}Commit: {}", indent(1), report.message));
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    print_lines(format_sync_report(report));
}

/// Progress line for a deploy state change. Outcomes are reported separately.
pub fn format_deploy_state(state: &DeployState) -> Vec<String> {
    match state {
        DeployState::Loading => vec!["Syncing...".to_string()],
        DeployState::Idle | DeployState::Success | DeployState::Error(_) => Vec::new(),
    }
}

pub fn print_deploy_state(state: &DeployState) {
    print_lines(format_deploy_state(state));
}

pub fn format_export_output(path: &Path, bytes: u64) -> Vec<String> {
    vec![format!("Exported {} ({})", path.display(), format_size(bytes))]
}

pub fn print_export_output(path: &Path, bytes: u64) {
    print_lines(format_export_output(path, bytes));
}

pub fn format_preview_output(output_dir: &Path, pages: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = pages
        .iter()
        .map(|p| {
            let name = p
                .strip_prefix(output_dir)
                .unwrap_or(p)
                .display()
                .to_string();
            format!("Generated {}", name)
        })
        .collect();
    lines.push(format!("Preview written to {}", output_dir.display()));
    lines
}

pub fn print_preview_output(output_dir: &Path, pages: &[PathBuf]) {
    print_lines(format_preview_output(output_dir, pages));
}
