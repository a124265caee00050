//! Tool configuration.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the data directory next to `storage.json`, or anywhere else with
//! `--config`. Values in the file are merged over the stock defaults, so a
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [deploy]
//! api_base_url = "https://api.github.com"  # Repository host API root
//! success_display_secs = 5                 # How long "success" is shown
//!
//! [upload]
//! max_bytes = 5242880                      # Largest accepted image (5 MiB)
//! simulated_delay_ms = 1500                # Fake upload latency
//!
//! [export]
//! archive_name = "shield-cms-export.zip"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Data Directory
//!
//! Resolved by [`resolve_data_dir`]: an explicit `--data-dir`, else the
//! `SHIELD_CMS_DATA_DIR` environment variable, else the platform data dir.

use crate::export::DEFAULT_ARCHIVE_NAME;
use crate::sync::{DEFAULT_API_BASE_URL, DEFAULT_SUCCESS_DISPLAY};
use crate::upload::{DEFAULT_SIMULATED_DELAY, MAX_UPLOAD_BYTES, UploadSettings};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const DATA_DIR_ENV: &str = "SHIELD_CMS_DATA_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Cannot determine a data directory; pass --data-dir or set {DATA_DIR_ENV}")]
    NoDataDir,
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    /// Repository sync settings.
    pub deploy: DeployConfig,
    /// Contact-page upload simulation.
    pub upload: UploadConfig,
    /// Offline archive export.
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub api_base_url: String,
    pub success_display_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            success_display_secs: DEFAULT_SUCCESS_DISPLAY.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_bytes: u64,
    pub simulated_delay_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub archive_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl CmsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.deploy.api_base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "deploy.api_base_url must start with http:// or https://".into(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be greater than 0".into(),
            ));
        }
        if self.export.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            max_bytes: self.upload.max_bytes,
            simulated_delay: Duration::from_millis(self.upload.simulated_delay_ms),
        }
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_secs(self.deploy.success_display_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CmsConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. A missing file is `Ok(None)`.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CmsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CmsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// Reads `explicit` when given, otherwise `config.toml` in `data_dir`.
pub fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<CmsConfig, ConfigError> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            path.to_path_buf()
        }
        None => data_dir.join(CONFIG_FILENAME),
    };
    let overlay = load_raw_config(&path)?;
    tracing::debug!(path = %path.display(), found = overlay.is_some(), "config resolved");
    resolve_config(stock_defaults_value(), overlay)
}

/// Pick the data directory: explicit flag, then environment, then platform.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("au.com", "Shield Finishing Services", "shield-cms")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(ConfigError::NoDataDir)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# shield-cms Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the data directory as config.toml, or pass --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Deploy
# ---------------------------------------------------------------------------
[deploy]
# Root of the repository host API. Point at an enterprise host if needed.
api_base_url = "https://api.github.com"

# Seconds the "deployed" status is reported before returning to idle.
success_display_secs = 5

# ---------------------------------------------------------------------------
# Contact-page uploads
# ---------------------------------------------------------------------------
[upload]
# Largest accepted image in bytes (5 MiB).
max_bytes = 5242880

# Simulated upload latency in milliseconds. Nothing is actually sent.
simulated_delay_ms = 1500

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# File name used by `shield-cms export` when --output is not given.
archive_name = "shield-cms-export.zip"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_builtin_constants() {
        let config = CmsConfig::default();
        assert_eq!(config.deploy.api_base_url, "https://api.github.com");
        assert_eq!(config.success_display(), Duration::from_secs(5));
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload_settings().simulated_delay, Duration::from_millis(1500));
        assert_eq!(config.export.archive_name, "shield-cms-export.zip");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[upload]
simulated_delay_ms = 0
"#;
        let config: CmsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.upload.simulated_delay_ms, 0);
        assert_eq!(config.upload.max_bytes, MAX_UPLOAD_BYTES);
        assert_eq!(config.deploy, DeployConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[deploy]
api_base = "https://example.com"
"#;
        assert!(toml::from_str::<CmsConfig>(toml).is_err());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, CmsConfig::default());
    }

    #[test]
    fn load_config_reads_data_dir_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[deploy]\napi_base_url = \"http://localhost:9000\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.deploy.api_base_url, "http://localhost:9000");
        assert_eq!(config.deploy.success_display_secs, 5);
    }

    #[test]
    fn explicit_config_path_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[upload]\nmax_bytes = 1\n").unwrap();
        let other = tmp.path().join("other.toml");
        fs::write(&other, "[upload]\nmax_bytes = 2\n").unwrap();
        let config = load_config(tmp.path(), Some(&other)).unwrap();
        assert_eq!(config.upload.max_bytes, 2);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path(), Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[deploy").unwrap();
        assert!(matches!(
            load_config(tmp.path(), None),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = CmsConfig::default();
        config.deploy.api_base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = CmsConfig::default();
        config.upload.max_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = CmsConfig::default();
        config.export.archive_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_overlays_nested_tables() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[upload]\nmax_bytes = 10\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["upload"]["max_bytes"].as_integer(), Some(10));
        assert_eq!(merged["upload"]["simulated_delay_ms"].as_integer(), Some(1500));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: CmsConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, CmsConfig::default());
    }

    #[test]
    fn explicit_data_dir_is_used_verbatim() {
        let dir = PathBuf::from("/tmp/somewhere");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
    }
}
