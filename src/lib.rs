//! Svgpress - animated SVG to bounded-size raster export
//!
//! Converts animated SVG markup into animated WebP, GIF, or APNG assets that
//! fit platform byte budgets. Frames are sampled deterministically in a
//! headless Chromium session, encoded by an external ffmpeg process, and
//! fitted under each preset's size limit by walking a descending attempt
//! ladder.

pub mod dimensions;
pub mod export;
pub mod presets;

pub use dimensions::{parse_svg_dimensions, DimensionSource, SourceDimensions, TargetSize};
pub use export::{
    export_asset, export_asset_with, sanitize_file_stem, ExportOutcome, ExportRequest,
    ExportedAsset,
};
pub use presets::{
    config_presets, export_presets, get_config_preset, get_export_preset, resolve_export_attempts,
    AttemptPlan, AttemptSpec, ConfigPreset, ConfigPresetSummary, ExportPreset, PresetSummary,
    SizingPolicy,
};

pub use svgpress_core::{Config, Error, OutputFormat, Result, ToolsConfig};
pub use svgpress_render::{check_tools, CommandRunner, Renderer, RenderSession, ToolInfo};
