//! Static registry of delivery presets.
//!
//! Each preset bundles an output format, a hard byte budget, a sizing
//! policy, and per-config attempt ladders ordered highest fidelity first.
//! The registry is immutable and process-wide; lookups normalize ids and
//! fall back to defaults.

use serde::Serialize;
use svgpress_core::{Error, OutputFormat, Result};

/// Preset used when the caller names none.
pub const DEFAULT_EXPORT_PRESET: &str = "attachment-webp";

/// Config preset used when the caller names none.
pub const DEFAULT_CONFIG_PRESET: &str = "quality";

/// Ladder of last resort for presets with no usable table.
const DEFAULT_ATTEMPTS: &[AttemptSpec] = &[AttemptSpec {
    fps: 16,
    duration_seconds: 2.0,
    quality: None,
    scale: None,
}];

/// How target pixel dimensions derive from the source SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Exact square of the given edge length.
    FixedSquare { size: u32 },
    /// Follow the source aspect ratio, bounded by `[minimum_dimension,
    /// max_dimension]` on the longer axis and never upscaled.
    SourceFit {
        max_dimension: u32,
        minimum_dimension: u32,
    },
}

/// One rung of an attempt ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptSpec {
    pub fps: u32,
    pub duration_seconds: f64,
    /// Lossy quality, meaningful for WebP rungs.
    pub quality: Option<u32>,
    /// Resolution multiplier applied to the base target size.
    pub scale: Option<f64>,
}

/// Encode parameters for one attempt after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptPlan {
    pub fps: u32,
    pub duration_seconds: f64,
    pub quality: u32,
}

impl AttemptSpec {
    /// Clamp this rung into safe encode parameters: fps at least 2 (zero
    /// meaning unset, 12), duration at least half a second (zero or
    /// non-finite meaning unset, 2), quality within 10..=100 (unset
    /// meaning 72).
    pub fn plan(&self) -> AttemptPlan {
        let fps = if self.fps == 0 { 12 } else { self.fps }.max(2);

        let duration = if self.duration_seconds.is_finite() && self.duration_seconds != 0.0 {
            self.duration_seconds
        } else {
            2.0
        };

        let quality = match self.quality {
            Some(q) if q > 0 => q,
            _ => 72,
        };

        AttemptPlan {
            fps,
            duration_seconds: duration.max(0.5),
            quality: quality.clamp(10, 100),
        }
    }

    /// Resolution multiplier, defaulting to 1 for unset or degenerate values.
    pub fn scale_factor(&self) -> f64 {
        match self.scale {
            Some(scale) if scale.is_finite() && scale > 0.0 => scale,
            _ => 1.0,
        }
    }
}

/// A delivery target with its size budget and attempt ladders.
#[derive(Debug)]
pub struct ExportPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub format: OutputFormat,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub size_limit_bytes: u64,
    pub sizing: SizingPolicy,
    /// Attempt ladders keyed by config preset id.
    pub attempts_by_config: &'static [(&'static str, &'static [AttemptSpec])],
}

/// A quality/speed trade-off selecting which ladder variant to use.
#[derive(Debug)]
pub struct ConfigPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const ATTACHMENT_WEBP_QUALITY: &[AttemptSpec] = &[
    AttemptSpec { fps: 24, duration_seconds: 5.0, quality: Some(82), scale: Some(1.0) },
    AttemptSpec { fps: 20, duration_seconds: 4.0, quality: Some(74), scale: Some(0.88) },
    AttemptSpec { fps: 16, duration_seconds: 3.5, quality: Some(66), scale: Some(0.78) },
    AttemptSpec { fps: 12, duration_seconds: 2.5, quality: Some(56), scale: Some(0.68) },
];

const ATTACHMENT_WEBP_FAST: &[AttemptSpec] = &[
    AttemptSpec { fps: 14, duration_seconds: 2.4, quality: Some(68), scale: Some(0.76) },
    AttemptSpec { fps: 10, duration_seconds: 1.8, quality: Some(58), scale: Some(0.64) },
];

const EMOJI_WEBP_QUALITY: &[AttemptSpec] = &[
    AttemptSpec { fps: 20, duration_seconds: 3.0, quality: Some(82), scale: None },
    AttemptSpec { fps: 16, duration_seconds: 2.5, quality: Some(72), scale: None },
    AttemptSpec { fps: 12, duration_seconds: 2.0, quality: Some(62), scale: None },
    AttemptSpec { fps: 10, duration_seconds: 1.6, quality: Some(54), scale: None },
];

const EMOJI_WEBP_FAST: &[AttemptSpec] = &[
    AttemptSpec { fps: 12, duration_seconds: 2.0, quality: Some(70), scale: None },
    AttemptSpec { fps: 10, duration_seconds: 1.6, quality: Some(60), scale: None },
];

const EMOJI_GIF_QUALITY: &[AttemptSpec] = &[
    AttemptSpec { fps: 16, duration_seconds: 3.0, quality: None, scale: None },
    AttemptSpec { fps: 12, duration_seconds: 2.4, quality: None, scale: None },
    AttemptSpec { fps: 10, duration_seconds: 2.0, quality: None, scale: None },
    AttemptSpec { fps: 8, duration_seconds: 1.6, quality: None, scale: None },
];

const EMOJI_GIF_FAST: &[AttemptSpec] = &[
    AttemptSpec { fps: 12, duration_seconds: 2.0, quality: None, scale: None },
    AttemptSpec { fps: 10, duration_seconds: 1.6, quality: None, scale: None },
];

const STICKER_APNG_QUALITY: &[AttemptSpec] = &[
    AttemptSpec { fps: 20, duration_seconds: 3.0, quality: None, scale: None },
    AttemptSpec { fps: 16, duration_seconds: 2.5, quality: None, scale: None },
    AttemptSpec { fps: 12, duration_seconds: 2.1, quality: None, scale: None },
    AttemptSpec { fps: 10, duration_seconds: 1.6, quality: None, scale: None },
];

const STICKER_APNG_FAST: &[AttemptSpec] = &[
    AttemptSpec { fps: 12, duration_seconds: 2.2, quality: None, scale: None },
    AttemptSpec { fps: 10, duration_seconds: 1.8, quality: None, scale: None },
];

/// All export presets, largest budget first.
pub static EXPORT_PRESETS: &[ExportPreset] = &[
    ExportPreset {
        id: "attachment-webp",
        label: "Chat Attachment (Animated WebP)",
        format: OutputFormat::Webp,
        mime_type: "image/webp",
        extension: ".webp",
        size_limit_bytes: 10 * 1024 * 1024,
        sizing: SizingPolicy::SourceFit {
            max_dimension: 1024,
            minimum_dimension: 96,
        },
        attempts_by_config: &[
            ("quality", ATTACHMENT_WEBP_QUALITY),
            ("fast", ATTACHMENT_WEBP_FAST),
        ],
    },
    ExportPreset {
        id: "emoji-webp",
        label: "Emoji (Animated WebP)",
        format: OutputFormat::Webp,
        mime_type: "image/webp",
        extension: ".webp",
        size_limit_bytes: 256 * 1024,
        sizing: SizingPolicy::FixedSquare { size: 128 },
        attempts_by_config: &[("quality", EMOJI_WEBP_QUALITY), ("fast", EMOJI_WEBP_FAST)],
    },
    ExportPreset {
        id: "emoji-gif",
        label: "Emoji (GIF)",
        format: OutputFormat::Gif,
        mime_type: "image/gif",
        extension: ".gif",
        size_limit_bytes: 256 * 1024,
        sizing: SizingPolicy::FixedSquare { size: 128 },
        attempts_by_config: &[("quality", EMOJI_GIF_QUALITY), ("fast", EMOJI_GIF_FAST)],
    },
    ExportPreset {
        id: "sticker-apng",
        label: "Sticker (APNG)",
        format: OutputFormat::Apng,
        mime_type: "image/png",
        extension: ".png",
        size_limit_bytes: 512 * 1024,
        sizing: SizingPolicy::FixedSquare { size: 320 },
        attempts_by_config: &[("quality", STICKER_APNG_QUALITY), ("fast", STICKER_APNG_FAST)],
    },
];

/// All config presets.
pub static CONFIG_PRESETS: &[ConfigPreset] = &[
    ConfigPreset {
        id: "quality",
        label: "Quality",
        description: "Higher frame rate and duration. Slower export.",
    },
    ConfigPreset {
        id: "fast",
        label: "Fast",
        description: "Lower frame count and shorter duration. Faster export.",
    },
];

/// Look up an export preset by id.
///
/// Ids are trimmed and lowercased; `None` or blank maps to
/// [`DEFAULT_EXPORT_PRESET`].
pub fn get_export_preset(id: Option<&str>) -> Result<&'static ExportPreset> {
    let normalized = normalize_id(id, DEFAULT_EXPORT_PRESET);
    EXPORT_PRESETS
        .iter()
        .find(|preset| preset.id == normalized.as_str())
        .ok_or(Error::InvalidPreset(normalized))
}

/// Look up a config preset by id, defaulting to [`DEFAULT_CONFIG_PRESET`].
pub fn get_config_preset(id: Option<&str>) -> Result<&'static ConfigPreset> {
    let normalized = normalize_id(id, DEFAULT_CONFIG_PRESET);
    CONFIG_PRESETS
        .iter()
        .find(|preset| preset.id == normalized.as_str())
        .ok_or(Error::InvalidConfigPreset(normalized))
}

fn normalize_id(id: Option<&str>, default: &str) -> String {
    let trimmed = id.unwrap_or("").trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Ladder for the preset and config pair.
///
/// Falls back to the preset's `quality` ladder, then to a single default
/// rung, so the result is never empty.
pub fn resolve_export_attempts(
    preset: &ExportPreset,
    config: &ConfigPreset,
) -> &'static [AttemptSpec] {
    ladder_for(preset, config.id)
        .or_else(|| ladder_for(preset, DEFAULT_CONFIG_PRESET))
        .unwrap_or(DEFAULT_ATTEMPTS)
}

fn ladder_for(preset: &ExportPreset, config_id: &str) -> Option<&'static [AttemptSpec]> {
    preset
        .attempts_by_config
        .iter()
        .find(|(id, _)| *id == config_id)
        .map(|(_, ladder)| *ladder)
        .filter(|ladder| !ladder.is_empty())
}

/// Caller-facing description of an export preset.
#[derive(Debug, Clone, Serialize)]
pub struct PresetSummary {
    pub id: &'static str,
    pub label: &'static str,
    pub format: OutputFormat,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub size_limit_bytes: u64,
}

/// Caller-facing description of a config preset.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPresetSummary {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

impl ExportPreset {
    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            id: self.id,
            label: self.label,
            format: self.format,
            mime_type: self.mime_type,
            extension: self.extension,
            size_limit_bytes: self.size_limit_bytes,
        }
    }
}

impl ConfigPreset {
    pub fn summary(&self) -> ConfigPresetSummary {
        ConfigPresetSummary {
            id: self.id,
            label: self.label,
            description: self.description,
        }
    }
}

/// Summaries of every export preset, in registry order.
pub fn export_presets() -> Vec<PresetSummary> {
    EXPORT_PRESETS.iter().map(ExportPreset::summary).collect()
}

/// Summaries of every config preset, in registry order.
pub fn config_presets() -> Vec<ConfigPresetSummary> {
    CONFIG_PRESETS.iter().map(ConfigPreset::summary).collect()
}
