//! # svgpress-render
//!
//! Frame rendering and encoding for the svgpress export pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`tools`]) -- resolve the ffmpeg and browser
//!   binaries from config, environment, and well-known locations.
//! - **Command execution** ([`ToolCommand`], [`CommandRunner`]) -- async
//!   subprocess runner with captured output.
//! - **Browser sessions** ([`Renderer`], [`RenderSession`]) -- headless
//!   Chromium over the DevTools protocol with the SVG staged and paused.
//! - **Frame sampling** ([`render_frames`]) -- deterministic animation-clock
//!   seeking into a zero-padded PNG sequence.
//! - **Encoding** ([`encode_frames`]) -- ffmpeg invocations for animated
//!   WebP, GIF, and APNG.
//! - **Workspace management** ([`ExportWorkspace`]) -- per-attempt temp
//!   directory lifecycle.

pub mod command;
pub mod encoder;
pub mod frames;
pub mod session;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{CommandRunner, SystemCommandRunner, ToolCommand, ToolOutput};
pub use encoder::{encode_frames, encoder_args, EncodeJob};
pub use frames::{frame_file_name, render_frames, FramePlan, FRAME_FILE_PATTERN};
pub use session::{ChromiumRenderer, ChromiumSession, Renderer, RenderSession};
pub use tools::{check_tools, resolve_browser, resolve_ffmpeg, ToolInfo};
pub use workspace::ExportWorkspace;
