//! Source generation and project archive.
//!
//! The deployed site is a static front-end whose data lives in a generated
//! `constants.tsx`. [`build_file_set`] renders that module from the current
//! [`SiteContent`] together with the gallery page template, which is what a
//! deploy pushes. [`build_archive`] wraps the same files plus a minimal
//! project scaffold into a ZIP archive for offline hand-off.
//!
//! Output is byte-for-byte deterministic for a given content value: data
//! blocks are 2-space pretty JSON and archive entries carry a fixed timestamp.

use crate::content::SiteContent;
use serde::Serialize;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "shield-cms-export.zip";

const GALLERY_PAGE: &str = include_str!("../templates/Gallery.tsx");
const INDEX_HTML: &str = include_str!("../templates/scaffold/index.html");
const TSCONFIG: &str = include_str!("../templates/scaffold/tsconfig.json");
const VITE_CONFIG: &str = include_str!("../templates/scaffold/vite.config.ts");
const INDEX_TSX: &str = include_str!("../templates/scaffold/index.tsx");
const TYPES_TS: &str = include_str!("../templates/scaffold/types.ts");
const CMS_CONTEXT: &str = include_str!("../templates/scaffold/CMSContext.tsx");

const COLORS_BLOCK: &str = concat!(
    "export const COLORS = { \n",
    "  primary: '#0f172a', \n",
    "  secondary: '#2563eb', \n",
    "  accent: '#60a5fa', \n",
    "  light: '#f8fafc', \n",
    "  text: '#334155', \n",
    "  logoNavy: '#111827', \n",
    "  logoBlue: '#2c5282', \n",
    "  whatsapp: '#25D366' \n",
    "};\n",
);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to generate archive")]
    Archive(#[from] ZipError),
}

/// A generated source file, addressed by its path inside the site project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// The files a deploy pushes, in push order.
pub fn build_file_set(content: &SiteContent) -> Result<Vec<GeneratedFile>, ExportError> {
    Ok(vec![
        GeneratedFile {
            path: "constants.tsx".to_string(),
            content: render_constants(content)?,
        },
        GeneratedFile {
            path: "pages/Gallery.tsx".to_string(),
            content: GALLERY_PAGE.to_string(),
        },
    ])
}

/// Render the `constants.tsx` module for `content`.
pub fn render_constants(content: &SiteContent) -> Result<String, ExportError> {
    let mut out = String::from("\n");
    out.push_str(COLORS_BLOCK);
    push_export(&mut out, "SITE_ASSETS", &content.assets)?;
    push_export(&mut out, "CONTACT_INFO", &content.contact)?;
    push_export(&mut out, "SERVICES_DATA", &content.services)?;
    push_export(&mut out, "GALLERY_DATA", &content.gallery)?;
    push_export(&mut out, "ABOUT_DATA", &content.about)?;
    out.push_str("export const TESTIMONIALS_DATA = [];\n");
    Ok(out)
}

fn push_export<T: Serialize>(out: &mut String, name: &str, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    out.push_str(&format!("export const {name} = {json};\n"));
    Ok(())
}

fn package_manifest() -> Result<String, ExportError> {
    let manifest = serde_json::json!({
        "name": "shield-finishing-services",
        "private": true,
        "version": "1.0.0",
        "type": "module",
        "dependencies": {
            "react": "19.0.0",
            "react-dom": "19.0.0",
            "react-router-dom": "^7.1.5",
            "lucide-react": "^0.468.0",
            "jszip": "^3.10.1"
        },
        "devDependencies": {
            "@types/react": "^19.0.0",
            "@types/react-dom": "^19.0.0",
            "@vitejs/plugin-react": "^4.3.4",
            "typescript": "^5.7.3",
            "vite": "^6.1.0"
        }
    });
    Ok(serde_json::to_string_pretty(&manifest)?)
}

/// Every file in the archive, in entry order.
pub fn archive_entries(content: &SiteContent) -> Result<Vec<GeneratedFile>, ExportError> {
    let file = |path: &str, body: &str| GeneratedFile {
        path: path.to_string(),
        content: body.to_string(),
    };

    let mut entries = vec![
        file("index.html", INDEX_HTML),
        file("package.json", &package_manifest()?),
        file("tsconfig.json", TSCONFIG),
        file("vite.config.ts", VITE_CONFIG),
        file("index.tsx", INDEX_TSX),
    ];
    entries.extend(build_file_set(content)?);
    entries.push(file("types.ts", TYPES_TS));
    entries.push(file("CMSContext.tsx", CMS_CONTEXT));
    Ok(entries)
}

/// Package the project scaffold and generated sources as ZIP bytes.
///
/// Every entry is stamped with the DOS epoch (1980-01-01 00:00:00) so the
/// output depends only on `content`.
pub fn build_archive(content: &SiteContent) -> Result<Vec<u8>, ExportError> {
    let entries = archive_entries(content)?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in &entries {
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(entry.content.as_bytes())
            .map_err(ZipError::from)?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(entries = entries.len(), bytes = bytes.len(), "archive built");
    Ok(bytes)
}

/// Build the archive and write it to `path`.
pub fn write_archive(content: &SiteContent, path: &Path) -> Result<u64, ExportError> {
    let bytes = build_archive(content)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(&bytes)?;
    tracing::info!(path = %path.display(), "archive written");
    Ok(bytes.len() as u64)
}
