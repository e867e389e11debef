//! ffmpeg invocation for the three output formats.
//!
//! All formats share the frame-sequence input and a lanczos scale bounded to
//! the target box with transparent centered padding. WebP adds the lossy
//! libwebp settings, GIF goes through a palettegen/paletteuse graph with a
//! reserved transparent slot, and APNG loops forever via `-plays 0`.

use std::path::{Path, PathBuf};

use svgpress_core::{OutputFormat, Result};

use crate::command::{CommandRunner, ToolCommand};
use crate::frames::FRAME_FILE_PATTERN;

/// One encoding attempt: a frame dump plus target parameters.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub format: OutputFormat,
    /// Directory holding the sampled `frame-%05d.png` sequence.
    pub frames_dir: PathBuf,
    /// File the encoder writes.
    pub output_path: PathBuf,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    /// Lossy quality, used by WebP only.
    pub quality: u32,
}

/// Run ffmpeg for the job and return the encoded bytes.
pub async fn encode_frames(
    runner: &dyn CommandRunner,
    ffmpeg: &Path,
    job: &EncodeJob,
) -> Result<Vec<u8>> {
    tracing::debug!(
        "encode {} {}x{} at {} fps -> {}",
        job.format,
        job.width,
        job.height,
        job.fps,
        job.output_path.display()
    );

    let mut cmd = ToolCommand::new(ffmpeg.to_path_buf());
    cmd.args(encoder_args(job));
    runner.run(&cmd).await?;

    let data = tokio::fs::read(&job.output_path).await?;
    Ok(data)
}

/// Full ffmpeg argument list for the job's format.
pub fn encoder_args(job: &EncodeJob) -> Vec<String> {
    match job.format {
        OutputFormat::Webp => build_webp_args(job),
        OutputFormat::Gif => build_gif_args(job),
        OutputFormat::Apng => build_apng_args(job),
    }
}

/// Scale into the target box preserving aspect, then pad to exactly the box
/// with fully transparent pixels.
fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:flags=lanczos:force_original_aspect_ratio=decrease,\
pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=0x00000000"
    )
}

fn frame_input(frames_dir: &Path) -> String {
    frames_dir.join(FRAME_FILE_PATTERN).to_string_lossy().into_owned()
}

fn build_webp_args(job: &EncodeJob) -> Vec<String> {
    vec![
        "-y".into(),
        "-framerate".into(),
        job.fps.to_string(),
        "-start_number".into(),
        "0".into(),
        "-i".into(),
        frame_input(&job.frames_dir),
        "-vf".into(),
        scale_pad_filter(job.width, job.height),
        "-an".into(),
        "-c:v".into(),
        "libwebp".into(),
        "-lossless".into(),
        "0".into(),
        "-q:v".into(),
        job.quality.to_string(),
        "-compression_level".into(),
        "6".into(),
        "-preset".into(),
        "drawing".into(),
        "-loop".into(),
        "0".into(),
        "-pix_fmt".into(),
        "yuva420p".into(),
        job.output_path.to_string_lossy().into_owned(),
    ]
}

fn build_gif_args(job: &EncodeJob) -> Vec<String> {
    let filter = format!(
        "fps={},{},split[s0][s1];[s0]palettegen=reserve_transparent=on[p];[s1][p]paletteuse=dither=sierra2_4a",
        job.fps,
        scale_pad_filter(job.width, job.height)
    );
    vec![
        "-y".into(),
        "-framerate".into(),
        job.fps.to_string(),
        "-start_number".into(),
        "0".into(),
        "-i".into(),
        frame_input(&job.frames_dir),
        "-vf".into(),
        filter,
        "-loop".into(),
        "0".into(),
        job.output_path.to_string_lossy().into_owned(),
    ]
}

fn build_apng_args(job: &EncodeJob) -> Vec<String> {
    vec![
        "-y".into(),
        "-framerate".into(),
        job.fps.to_string(),
        "-start_number".into(),
        "0".into(),
        "-i".into(),
        frame_input(&job.frames_dir),
        "-vf".into(),
        scale_pad_filter(job.width, job.height),
        "-plays".into(),
        "0".into(),
        "-f".into(),
        "apng".into(),
        job.output_path.to_string_lossy().into_owned(),
    ]
}
