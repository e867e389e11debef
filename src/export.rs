//! End-to-end export: stage the SVG, sample frames, encode, fit the budget.
//!
//! One call runs one browser session and walks the preset's attempt ladder
//! from highest fidelity downward, stopping at the first attempt whose
//! output fits the preset's byte budget. When nothing fits, the smallest
//! output wins and the outcome carries a warning instead of an error.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use svgpress_core::{Config, Error, OutputFormat, Result};
use svgpress_render::{
    encode_frames, render_frames, resolve_ffmpeg, ChromiumRenderer, CommandRunner, EncodeJob,
    ExportWorkspace, FramePlan, Renderer, RenderSession, SystemCommandRunner,
};

use crate::dimensions::{
    parse_svg_dimensions, resolve_base_target_size, resolve_scaled_dimensions, TargetSize,
};
use crate::presets::{
    get_config_preset, get_export_preset, resolve_export_attempts, AttemptSpec, ConfigPreset,
    ConfigPresetSummary, ExportPreset, PresetSummary,
};

/// Source name assumed when the request carries none.
const DEFAULT_SOURCE_NAME: &str = "export.svg";

/// Stem used when sanitization leaves nothing.
const FALLBACK_STEM: &str = "export";

static FILE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[a-z0-9]+$").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9._-]+").unwrap());

static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

static EDGE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._]+|[-._]+$").unwrap());

/// One export request.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    /// SVG markup to export.
    pub svg: String,
    /// Export preset id; blank or missing selects the default preset.
    pub preset_id: Option<String>,
    /// Config preset id; blank or missing selects `quality`.
    pub config_preset_id: Option<String>,
    /// Original file name, used to derive the output file stem.
    pub source_name: Option<String>,
}

impl ExportRequest {
    /// Request with default presets for the given markup.
    pub fn new(svg: impl Into<String>) -> Self {
        Self {
            svg: svg.into(),
            ..Self::default()
        }
    }
}

/// Encoded artifact with the metadata callers relay onward.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedAsset {
    pub file_name: String,
    pub bytes: u64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_seconds: f64,
    pub mime_type: &'static str,
    pub format: OutputFormat,
    /// Whether `bytes` is within the preset's budget.
    pub meets_limit: bool,
    /// Human-readable note when the budget was missed.
    pub warning: Option<String>,
    /// Encoded bytes, not serialized.
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Result of a full export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub preset: PresetSummary,
    pub config_preset: ConfigPresetSummary,
    pub output: ExportedAsset,
}

/// Output of one ladder rung.
struct AttemptResult {
    bytes: u64,
    width: u32,
    height: u32,
    fps: u32,
    duration_seconds: f64,
    data: Vec<u8>,
}

/// Export with the system browser and encoder resolved from `config`.
pub async fn export_asset(config: &Config, request: &ExportRequest) -> Result<ExportOutcome> {
    resolve_request(request)?;

    let ffmpeg = resolve_ffmpeg(&config.tools)?;
    let renderer = ChromiumRenderer::discover(&config.tools)?;
    export_asset_with(&renderer, &SystemCommandRunner, &ffmpeg, request).await
}

/// Export with an injected renderer and command runner.
///
/// This is the seam embedders and tests use to supply their own browser
/// session or encoder process handling.
pub async fn export_asset_with(
    renderer: &dyn Renderer,
    runner: &dyn CommandRunner,
    ffmpeg: &Path,
    request: &ExportRequest,
) -> Result<ExportOutcome> {
    let (preset, config) = resolve_request(request)?;
    let svg = request.svg.trim();
    let attempts = resolve_export_attempts(preset, config);

    let source = parse_svg_dimensions(svg);
    let base = resolve_base_target_size(preset, &source);
    info!(
        "export {} / {}: source {}x{} ({}), base target {}x{}, {} attempt(s)",
        preset.id,
        config.id,
        source.width,
        source.height,
        source.source,
        base.width,
        base.height,
        attempts.len()
    );

    let workspace = ExportWorkspace::create()?;
    let mut session = match renderer.open(svg).await {
        Ok(session) => session,
        Err(err) => {
            workspace.close();
            return Err(err);
        }
    };

    let fitted = run_attempts(
        &mut *session,
        runner,
        ffmpeg,
        preset,
        attempts,
        base,
        &workspace,
    )
    .await;

    session.close().await;
    workspace.close();

    let best = fitted?;
    let file_name = build_file_name(request.source_name.as_deref(), preset);
    let meets_limit = best.bytes <= preset.size_limit_bytes;
    let warning = if meets_limit {
        None
    } else {
        let message = format!(
            "Export is {} bytes; preset limit is {} bytes.",
            best.bytes, preset.size_limit_bytes
        );
        warn!("{message}");
        Some(message)
    };

    info!(
        "export {} finished: {} at {} bytes (limit {}, fits: {})",
        preset.id, file_name, best.bytes, preset.size_limit_bytes, meets_limit
    );

    Ok(ExportOutcome {
        preset: preset.summary(),
        config_preset: config.summary(),
        output: ExportedAsset {
            file_name,
            bytes: best.bytes,
            width: best.width,
            height: best.height,
            fps: best.fps,
            duration_seconds: best.duration_seconds,
            mime_type: preset.mime_type,
            format: preset.format,
            meets_limit,
            warning,
            data: best.data,
        },
    })
}

/// Validate the request and resolve its presets.
fn resolve_request(
    request: &ExportRequest,
) -> Result<(&'static ExportPreset, &'static ConfigPreset)> {
    if request.svg.trim().is_empty() {
        return Err(Error::MissingSvg);
    }
    let preset = get_export_preset(request.preset_id.as_deref())?;
    let config = get_config_preset(request.config_preset_id.as_deref())?;
    Ok((preset, config))
}

/// Walk the ladder until an attempt fits the byte budget.
///
/// Every attempt renders into its own workspace subdirectory. The running
/// best is the smallest output seen so far; a fitting attempt replaces it
/// and stops the walk.
async fn run_attempts(
    session: &mut dyn RenderSession,
    runner: &dyn CommandRunner,
    ffmpeg: &Path,
    preset: &ExportPreset,
    attempts: &[AttemptSpec],
    base: TargetSize,
    workspace: &ExportWorkspace,
) -> Result<AttemptResult> {
    let mut best: Option<AttemptResult> = None;

    for (index, attempt) in attempts.iter().enumerate() {
        let size = resolve_scaled_dimensions(base, attempt);
        let plan = attempt.plan();
        debug!(
            "attempt {}/{}: {}x{} at {} fps over {}s",
            index + 1,
            attempts.len(),
            size.width,
            size.height,
            plan.fps,
            plan.duration_seconds
        );

        let frames_dir = workspace.frames_dir(index);
        let frame_plan = FramePlan {
            width: size.width,
            height: size.height,
            fps: plan.fps,
            duration_seconds: plan.duration_seconds,
        };
        render_frames(&mut *session, &frame_plan, &frames_dir).await?;

        let job = EncodeJob {
            format: preset.format,
            frames_dir,
            output_path: workspace.output_path(index, preset.extension),
            fps: plan.fps,
            width: size.width,
            height: size.height,
            quality: plan.quality,
        };
        let data = encode_frames(runner, ffmpeg, &job).await?;

        let result = AttemptResult {
            bytes: data.len() as u64,
            width: size.width,
            height: size.height,
            fps: plan.fps,
            duration_seconds: plan.duration_seconds,
            data,
        };
        debug!(
            "attempt {} produced {} bytes against a {} byte limit",
            index + 1,
            result.bytes,
            preset.size_limit_bytes
        );

        let fits = result.bytes <= preset.size_limit_bytes;
        let smaller = best
            .as_ref()
            .map_or(true, |current| result.bytes < current.bytes);
        if smaller || fits {
            best = Some(result);
        }
        if fits {
            break;
        }
    }

    best.ok_or_else(|| Error::ExportFailed("no output produced".into()))
}

/// Build `<stem>-<preset id><extension>` from the caller's source name.
fn build_file_name(source_name: Option<&str>, preset: &ExportPreset) -> String {
    let stem = sanitize_file_stem(source_name.unwrap_or(DEFAULT_SOURCE_NAME));
    format!("{stem}-{}{}", preset.id, preset.extension)
}

/// Reduce a source file name to a safe lowercase stem.
///
/// Strips one trailing extension, maps whitespace runs to `-`, drops other
/// characters outside `[a-z0-9._-]`, collapses dash runs, trims separator
/// edges, and caps the result at 64 characters.
pub fn sanitize_file_stem(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let stem = FILE_EXTENSION.replace(&lowered, "");
    let dashed = WHITESPACE_RUN.replace_all(&stem, "-");
    let kept = DISALLOWED.replace_all(&dashed, "");
    let collapsed = DASH_RUN.replace_all(&kept, "-");
    let mut trimmed = EDGE_SEPARATORS.replace_all(&collapsed, "").into_owned();
    trimmed.truncate(64);
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed
    }
}
