//! External tool discovery.
//!
//! Resolves the two binaries the exporter shells out to: `ffmpeg` for
//! encoding and a Chromium-family browser for frame rendering. Explicit
//! config paths win, then environment overrides, then well-known install
//! locations, then `PATH`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use svgpress_core::{Error, Result, ToolsConfig};

/// Environment variable naming a browser executable to use as-is.
pub const BROWSER_ENV_VAR: &str = "SVGPRESS_BROWSER";

/// Well-known browser install locations, probed in order.
const BROWSER_CANDIDATE_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Browser binary names to look up in `PATH` as a last resort.
const BROWSER_PATH_NAMES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Resolve the ffmpeg binary.
///
/// A configured path is used when it exists; a configured path that does not
/// exist falls back to a `PATH` lookup.
pub fn resolve_ffmpeg(tools: &ToolsConfig) -> Result<PathBuf> {
    if let Some(ref path) = tools.ffmpeg_path {
        if path.exists() {
            return Ok(path.clone());
        }
        tracing::warn!(
            "configured ffmpeg path {} does not exist; searching PATH",
            path.display()
        );
    }

    which::which("ffmpeg").map_err(|_| Error::encoder_unavailable("ffmpeg"))
}

/// Resolve a Chromium-family browser binary.
///
/// Resolution order: configured `browser_path` (when it exists), the
/// [`BROWSER_ENV_VAR`] environment variable (trimmed, taken as given), the
/// well-known install locations, then a `PATH` lookup of common binary names.
pub fn resolve_browser(tools: &ToolsConfig) -> Result<PathBuf> {
    if let Some(ref path) = tools.browser_path {
        if path.exists() {
            return Ok(path.clone());
        }
        tracing::warn!(
            "configured browser path {} does not exist; continuing discovery",
            path.display()
        );
    }

    if let Ok(env_path) = std::env::var(BROWSER_ENV_VAR) {
        let trimmed = env_path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    for candidate in BROWSER_CANDIDATE_PATHS {
        let path = Path::new(candidate);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    for name in BROWSER_PATH_NAMES {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }

    Err(Error::RendererUnavailable(format!(
        "no Chromium-family browser found; set tools.browser_path or {BROWSER_ENV_VAR}"
    )))
}

/// Availability information for a tool, returned by [`check_tools`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of version output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Check both external tools and return availability information.
pub fn check_tools(tools: &ToolsConfig) -> Vec<ToolInfo> {
    let ffmpeg = resolve_ffmpeg(tools).ok();
    let browser = resolve_browser(tools).ok();

    vec![
        tool_info("ffmpeg", ffmpeg),
        tool_info("browser", browser),
    ]
}

fn tool_info(name: &str, path: Option<PathBuf>) -> ToolInfo {
    match path {
        Some(path) => {
            let version = detect_version(name, &path);
            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: Some(path),
            }
        }
        None => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Run `<tool> --version` (or `-version` for ffmpeg) and return the first
/// line of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        "ffmpeg" => "-version",
        _ => "--version",
    };

    let output = std::process::Command::new(path)
        .arg(version_arg)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn executable_fixture(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        path
    }

    #[test]
    fn resolve_ffmpeg_with_default_config() {
        // We cannot guarantee ffmpeg is installed in CI, but the call itself
        // must not panic and the error must be the right kind.
        match resolve_ffmpeg(&ToolsConfig::default()) {
            Ok(path) => assert!(path.exists()),
            Err(Error::EncoderUnavailable { tool }) => assert_eq!(tool, "ffmpeg"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn configured_ffmpeg_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = executable_fixture(&dir, "ffmpeg");
        let cfg = ToolsConfig {
            ffmpeg_path: Some(ffmpeg.clone()),
            ..Default::default()
        };
        assert_eq!(resolve_ffmpeg(&cfg).unwrap(), ffmpeg);
    }

    #[test]
    fn missing_configured_ffmpeg_falls_back() {
        let cfg = ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/nonexistent/ffmpeg")),
            ..Default::default()
        };
        if let Ok(path) = resolve_ffmpeg(&cfg) {
            assert_ne!(path, PathBuf::from("/nonexistent/ffmpeg"));
        }
    }

    #[test]
    #[serial]
    fn configured_browser_path_beats_env() {
        let dir = tempfile::tempdir().unwrap();
        let configured = executable_fixture(&dir, "chromium");
        std::env::set_var(BROWSER_ENV_VAR, "/env/override/chrome");
        let cfg = ToolsConfig {
            browser_path: Some(configured.clone()),
            ..Default::default()
        };
        let resolved = resolve_browser(&cfg);
        std::env::remove_var(BROWSER_ENV_VAR);
        assert_eq!(resolved.unwrap(), configured);
    }

    #[test]
    #[serial]
    fn env_browser_is_used_as_given() {
        // The env override is intentionally not existence-checked.
        std::env::set_var(BROWSER_ENV_VAR, "  /custom/browser-bin  ");
        let resolved = resolve_browser(&ToolsConfig::default());
        std::env::remove_var(BROWSER_ENV_VAR);
        assert_eq!(resolved.unwrap(), PathBuf::from("/custom/browser-bin"));
    }

    #[test]
    #[serial]
    fn blank_env_browser_is_ignored() {
        std::env::set_var(BROWSER_ENV_VAR, "   ");
        let resolved = resolve_browser(&ToolsConfig::default());
        std::env::remove_var(BROWSER_ENV_VAR);
        match resolved {
            Ok(path) => assert_ne!(path, PathBuf::new()),
            Err(Error::RendererUnavailable(msg)) => {
                assert!(msg.contains(BROWSER_ENV_VAR));
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn check_tools_reports_both_entries() {
        let infos = check_tools(&ToolsConfig::default());
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["ffmpeg", "browser"]);
        for info in &infos {
            if info.available {
                assert!(info.path.is_some());
            } else {
                assert!(info.path.is_none());
                assert!(info.version.is_none());
            }
        }
    }

    #[test]
    fn tool_info_serialization() {
        let info = ToolInfo {
            name: "ffmpeg".to_string(),
            available: true,
            version: Some("ffmpeg version 7.0".to_string()),
            path: Some(PathBuf::from("/usr/bin/ffmpeg")),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: ToolInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "ffmpeg");
        assert!(back.available);
    }
}
