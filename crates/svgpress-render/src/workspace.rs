//! Temporary workspace for export attempts.
//!
//! An [`ExportWorkspace`] owns the directory tree holding per-attempt frame
//! dumps and encoder output. The backing [`TempDir`] removes the whole tree
//! on drop, so cleanup holds even when an export errors mid-attempt.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory prefix for export workspaces.
const WORKSPACE_PREFIX: &str = "svgpress-export-";

/// Workspace for a single export call.
///
/// Layout: one `attempt-<n>` directory per encoding attempt (numbered from
/// one), each with a `frames/` subdirectory of sampled PNGs and an
/// `export<ext>` encoder output next to it.
pub struct ExportWorkspace {
    temp_dir: TempDir,
}

impl ExportWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn create() -> svgpress_core::Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()?;
        Ok(Self { temp_dir })
    }

    /// Path to the workspace root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory for the given zero-based attempt index.
    ///
    /// Directories are numbered from one: index 0 maps to `attempt-1`.
    pub fn attempt_dir(&self, index: usize) -> PathBuf {
        self.temp_dir.path().join(format!("attempt-{}", index + 1))
    }

    /// Frame dump directory for the given attempt index.
    pub fn frames_dir(&self, index: usize) -> PathBuf {
        self.attempt_dir(index).join("frames")
    }

    /// Encoder output path for the given attempt index.
    ///
    /// `extension` carries its leading dot (e.g. `.webp`).
    pub fn output_path(&self, index: usize, extension: &str) -> PathBuf {
        self.attempt_dir(index).join(format!("export{extension}"))
    }

    /// Remove the workspace now, logging instead of erroring on failure.
    pub fn close(self) {
        let path = self.temp_dir.path().to_path_buf();
        if let Err(e) = self.temp_dir.close() {
            tracing::warn!("failed to remove export workspace {}: {e}", path.display());
        }
    }
}
