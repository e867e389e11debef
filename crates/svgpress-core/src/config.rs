//! Exporter configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid; the library
//! works with no config file at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Root exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Internal(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH lookup",
                    path.display()
                ));
            }
        }

        if let Some(ref path) = self.tools.browser_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.browser_path {} does not exist; falling back to discovery",
                    path.display()
                ));
            }
        }

        warnings
    }
}

/// Paths to external tools.
///
/// Explicit paths take precedence over discovery. `browser_path` points at a
/// Chromium-family binary used for frame rendering; `ffmpeg_path` at the
/// encoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub browser_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        assert!(cfg.tools.ffmpeg_path.is_none());
        assert!(cfg.tools.browser_path.is_none());
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"tools": {"ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg"}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(
            cfg.tools.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert!(cfg.tools.browser_path.is_none());
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert!(cfg.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn parse_invalid_json_errors() {
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn load_or_default_with_none() {
        let cfg = Config::load_or_default(None);
        assert!(cfg.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/config.json")));
        assert!(cfg.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tools": {"browser_path": "/usr/bin/chromium"}}"#).unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(
            cfg.tools.browser_path,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn load_or_default_with_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{{{").unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert!(cfg.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn missing_configured_path_warns() {
        let mut cfg = Config::default();
        cfg.tools.ffmpeg_path = Some(PathBuf::from("/nonexistent/ffmpeg"));
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("ffmpeg_path"));
    }

    #[test]
    fn existing_configured_path_does_not_warn() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = Config::default();
        cfg.tools.browser_path = Some(file.path().to_path_buf());
        assert!(cfg.validate().is_empty());
    }
}
