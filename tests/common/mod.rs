//! Shared test doubles for export integration tests.
//!
//! Provides [`FakeRenderer`], a recording in-memory stand-in for the
//! Chromium session, and [`ScriptedRunner`], which plays back a queue of
//! encoder output sizes instead of spawning ffmpeg.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use svgpress::{CommandRunner, Error, Renderer, RenderSession, Result};
use svgpress_render::{ToolCommand, ToolOutput};

/// Everything the fake renderer observed, for post-run assertions.
#[derive(Debug, Default)]
pub struct RenderLog {
    pub opens: usize,
    pub closes: usize,
    pub viewports: Vec<(u32, u32)>,
    pub evaluates: Vec<String>,
    pub screenshots: usize,
}

/// Renderer double producing sessions that record every call.
pub struct FakeRenderer {
    pub log: Arc<Mutex<RenderLog>>,
    fail_open: Option<String>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(RenderLog::default())),
            fail_open: None,
        }
    }

    /// Renderer whose `open` fails as if the markup had no root element.
    pub fn failing_open(detail: impl Into<String>) -> Self {
        Self {
            log: Arc::new(Mutex::new(RenderLog::default())),
            fail_open: Some(detail.into()),
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open(&self, _svg: &str) -> Result<Box<dyn RenderSession>> {
        let mut log = self.log.lock().unwrap();
        log.opens += 1;
        if let Some(detail) = &self.fail_open {
            return Err(Error::MalformedSvg(detail.clone()));
        }
        Ok(Box::new(FakeSession {
            log: self.log.clone(),
        }))
    }
}

struct FakeSession {
    log: Arc<Mutex<RenderLog>>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.log.lock().unwrap().viewports.push((width, height));
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        self.log.lock().unwrap().evaluates.push(script.to_string());
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&mut self, _width: u32, _height: u32) -> Result<Vec<u8>> {
        self.log.lock().unwrap().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

/// Command runner double that writes a scripted number of bytes to the
/// command's output path instead of encoding anything.
///
/// The queue holds one entry per expected invocation; running past the end
/// fails like a crashed encoder.
pub struct ScriptedRunner {
    sizes: Mutex<VecDeque<usize>>,
    pub commands: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            sizes: Mutex::new(sizes.into_iter().collect()),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Number of encoder invocations observed.
    pub fn runs(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let args: Vec<String> = command.arguments().to_vec();
        let output_path = args
            .last()
            .cloned()
            .ok_or_else(|| Error::Internal("command has no output path".into()))?;

        let size = self.sizes.lock().unwrap().pop_front();
        let Some(size) = size else {
            return Err(Error::encode_failed(
                "ffmpeg",
                "no scripted output remaining",
            ));
        };

        tokio::fs::write(&output_path, vec![0u8; size]).await?;
        self.commands.lock().unwrap().push(args);

        Ok(ToolOutput {
            status: exit_ok(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(unix)]
fn exit_ok() -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn exit_ok() -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(0)
}

/// Count leftover export workspaces in the system temp directory.
pub fn export_workspace_count() -> usize {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_string_lossy()
                        .starts_with("svgpress-export-")
                })
                .count()
        })
        .unwrap_or(0)
}
