//! Deterministic frame sampling.
//!
//! The animation clock is driven manually: for frame `i` the page seeks to
//! `i / fps` seconds, waits for a paint, and captures a PNG. Seeking covers
//! both SMIL (`setCurrentTime`) and CSS/web-animation timelines
//! (`document.getAnimations`), each seek best-effort inside the page script
//! so one odd timeline cannot abort the export.

use std::path::Path;

use svgpress_core::Result;

use crate::session::RenderSession;

/// ffmpeg image2 input pattern matching [`frame_file_name`].
pub const FRAME_FILE_PATTERN: &str = "frame-%05d.png";

/// Script resolving once the next frame has painted.
const PAINT_WAIT_SCRIPT: &str =
    "new Promise(resolve => requestAnimationFrame(() => resolve('painted')))";

/// Sampling parameters for one encoding attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    /// Capture width in pixels.
    pub width: u32,
    /// Capture height in pixels.
    pub height: u32,
    /// Sampling rate in frames per second.
    pub fps: u32,
    /// Sampled animation span in seconds.
    pub duration_seconds: f64,
}

impl FramePlan {
    /// Number of frames to sample: `round(fps * duration)`, floored at 2 so
    /// the output always animates.
    pub fn frame_count(&self) -> u32 {
        let raw = (f64::from(self.fps) * self.duration_seconds).round();
        if !raw.is_finite() || raw < 2.0 {
            2
        } else {
            raw as u32
        }
    }
}

/// Zero-padded file name for the given frame index.
pub fn frame_file_name(index: u32) -> String {
    format!("frame-{index:05}.png")
}

/// Sample every frame of `plan` into `frames_dir`.
///
/// Returns the number of frames written.
pub async fn render_frames(
    session: &mut dyn RenderSession,
    plan: &FramePlan,
    frames_dir: &Path,
) -> Result<u32> {
    tokio::fs::create_dir_all(frames_dir).await?;
    session.set_viewport(plan.width, plan.height).await?;
    session
        .evaluate(&stage_size_script(plan.width, plan.height))
        .await?;

    let frames = plan.frame_count();
    tracing::debug!(
        "sampling {frames} frames at {}x{}, {} fps over {}s",
        plan.width,
        plan.height,
        plan.fps,
        plan.duration_seconds
    );

    for index in 0..frames {
        let seconds = f64::from(index) / f64::from(plan.fps);
        session.evaluate(&seek_script(seconds)).await?;
        session.evaluate(PAINT_WAIT_SCRIPT).await?;
        let png = session.screenshot(plan.width, plan.height).await?;
        tokio::fs::write(frames_dir.join(frame_file_name(index)), &png).await?;
    }

    Ok(frames)
}

/// Script pinning the stage container to the capture size.
fn stage_size_script(width: u32, height: u32) -> String {
    format!(
        r#"(() => {{
  const stage = document.getElementById('stage');
  stage.style.width = '{width}px';
  stage.style.height = '{height}px';
  return 'sized';
}})()"#
    )
}

/// Script seeking every animation timeline to `seconds`.
fn seek_script(seconds: f64) -> String {
    let millis = seconds * 1000.0;
    format!(
        r#"(() => {{
  const svg = document.querySelector('#stage svg');
  if (svg && typeof svg.pauseAnimations === 'function') {{
    svg.pauseAnimations();
    try {{ svg.setCurrentTime({seconds}); }} catch (err) {{}}
  }}
  if (typeof document.getAnimations === 'function') {{
    for (const animation of document.getAnimations({{ subtree: true }})) {{
      try {{
        animation.pause();
        animation.currentTime = {millis};
      }} catch (err) {{}}
    }}
  }}
  return 'seeked';
}})()"#
    )
}
