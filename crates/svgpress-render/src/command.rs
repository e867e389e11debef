//! Builder and runner for external tool commands.
//!
//! [`CommandRunner`] is the seam between the export pipeline and real
//! subprocess execution; tests substitute a scripted implementation.

use std::path::PathBuf;
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::Command;

use svgpress_core::{Error, Result};

/// Longest stderr suffix carried into an encode error.
const MAX_STDERR_TAIL: usize = 2048;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use svgpress_render::command::{CommandRunner, SystemCommandRunner, ToolCommand};
/// use std::path::PathBuf;
///
/// # async fn example() -> svgpress_core::Result<()> {
/// let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
/// cmd.arg("-version");
/// let output = SystemCommandRunner.run(&cmd).await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// The program path this command will invoke.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// The arguments accumulated so far.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Short program name for error messages.
    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

/// Executes [`ToolCommand`]s and captures their output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr.
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// [`CommandRunner`] backed by real OS processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    /// # Errors
    ///
    /// - [`Error::EncoderUnavailable`] if the program does not exist.
    /// - [`Error::EncodeFailed`] if the process exits with a non-zero status
    ///   (detail includes a stderr tail).
    /// - [`Error::Io`] for other spawn or wait failures.
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let tool = command.program_name();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::encoder_unavailable(tool.clone())
            } else {
                Error::from(e)
            }
        })?;

        let output = child.wait_with_output().await?;
        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::encode_failed(
                tool,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    stderr_tail(&tool_output.stderr)
                ),
            ));
        }

        Ok(tool_output)
    }
}

/// Trailing slice of stderr bounded to [`MAX_STDERR_TAIL`] bytes, trimmed.
pub fn stderr_tail(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.len() <= MAX_STDERR_TAIL {
        return trimmed;
    }
    let mut start = trimmed.len() - MAX_STDERR_TAIL;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_echo() {
        // `echo` should be universally available.
        let mut cmd = ToolCommand::new(PathBuf::from("echo"));
        cmd.arg("hello");
        let output = SystemCommandRunner.run(&cmd).await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(out.stdout.trim().contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn run_nonexistent_tool() {
        let cmd = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"));
        let result = SystemCommandRunner.run(&cmd).await;
        match result {
            Err(Error::EncoderUnavailable { tool }) => {
                assert_eq!(tool, "nonexistent_tool_xyz_12345");
            }
            other => panic!("expected EncoderUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_failing_tool_carries_stderr() {
        let mut cmd = ToolCommand::new(PathBuf::from("sh"));
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        let result = SystemCommandRunner.run(&cmd).await;
        match result {
            Err(Error::EncodeFailed { tool, detail }) => {
                assert_eq!(tool, "sh");
                assert!(detail.contains("exited with status"), "detail: {detail}");
                assert!(detail.contains("boom"), "detail: {detail}");
            }
            other => panic!("expected EncodeFailed, got {other:?}"),
        }
    }

    #[test]
    fn command_accumulates_args() {
        let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
        cmd.args(["-y", "-framerate"]);
        cmd.arg("12");
        assert_eq!(cmd.arguments(), ["-y", "-framerate", "12"]);
        assert_eq!(cmd.program(), &PathBuf::from("ffmpeg"));
    }

    #[test]
    fn stderr_tail_short_passthrough() {
        assert_eq!(stderr_tail("  oops \n"), "oops");
    }

    #[test]
    fn stderr_tail_truncates_long_output() {
        let long = "a".repeat(MAX_STDERR_TAIL + 500);
        let tail = stderr_tail(&long);
        assert_eq!(tail.len(), MAX_STDERR_TAIL);
    }

    #[test]
    fn stderr_tail_respects_char_boundaries() {
        let long = "é".repeat(MAX_STDERR_TAIL);
        let tail = stderr_tail(&long);
        assert!(tail.len() <= MAX_STDERR_TAIL);
        assert!(tail.chars().all(|c| c == 'é'));
    }
}
