//! Source dimension discovery and target size resolution.
//!
//! The source SVG is plain text at this point; dimensions come from a
//! lightweight scan of the root tag rather than a full XML parse. Parsing
//! is total: every input maps to some usable dimension pair, with 512x512
//! as the last resort.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::presets::{AttemptSpec, ExportPreset, SizingPolicy};

static SVG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<svg\b[^>]*>").unwrap());

static WIDTH_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bwidth\s*=\s*['"]([^'"]+)['"]"#).unwrap());

static HEIGHT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bheight\s*=\s*['"]([^'"]+)['"]"#).unwrap());

static VIEW_BOX_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bviewBox\s*=\s*['"]([^'"]+)['"]"#).unwrap());

static LENGTH_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([+-]?\d+(?:\.\d+)?)(px)?$").unwrap());

/// Where a source dimension pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSource {
    Attributes,
    ViewBox,
    WidthOnly,
    HeightOnly,
    Fallback,
}

impl DimensionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionSource::Attributes => "attributes",
            DimensionSource::ViewBox => "viewBox",
            DimensionSource::WidthOnly => "width-only",
            DimensionSource::HeightOnly => "height-only",
            DimensionSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DimensionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions declared by the source SVG, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceDimensions {
    pub width: f64,
    pub height: f64,
    pub source: DimensionSource,
}

/// Target raster size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

const FALLBACK_DIMENSIONS: SourceDimensions = SourceDimensions {
    width: 512.0,
    height: 512.0,
    source: DimensionSource::Fallback,
};

/// Read declared dimensions from the SVG root tag.
///
/// Precedence: both `width` and `height` attributes, then the `viewBox`
/// extent, then a lone attribute treated as square, then 512x512.
pub fn parse_svg_dimensions(svg: &str) -> SourceDimensions {
    if svg.trim().is_empty() {
        return FALLBACK_DIMENSIONS;
    }

    let tag = SVG_TAG.find(svg).map(|m| m.as_str()).unwrap_or("");
    let width = WIDTH_ATTR
        .captures(tag)
        .and_then(|captures| parse_length_value(&captures[1]));
    let height = HEIGHT_ATTR
        .captures(tag)
        .and_then(|captures| parse_length_value(&captures[1]));

    if let (Some(width), Some(height)) = (width, height) {
        return SourceDimensions {
            width,
            height,
            source: DimensionSource::Attributes,
        };
    }

    if let Some((width, height)) = parse_view_box(svg) {
        return SourceDimensions {
            width,
            height,
            source: DimensionSource::ViewBox,
        };
    }

    if let Some(width) = width {
        return SourceDimensions {
            width,
            height: width,
            source: DimensionSource::WidthOnly,
        };
    }

    if let Some(height) = height {
        return SourceDimensions {
            width: height,
            height,
            source: DimensionSource::HeightOnly,
        };
    }

    FALLBACK_DIMENSIONS
}

/// Parse a positive CSS length, accepting a bare number or a `px` suffix.
fn parse_length_value(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let captures = LENGTH_VALUE.captures(trimmed)?;
    let parsed: f64 = captures[1].parse().ok()?;
    if parsed.is_finite() && parsed > 0.0 {
        Some(parsed)
    } else {
        None
    }
}

/// Extract (width, height) from a `viewBox` attribute anywhere in the text.
fn parse_view_box(svg: &str) -> Option<(f64, f64)> {
    let captures = VIEW_BOX_ATTR.captures(svg)?;
    let values: Vec<f64> = captures[1]
        .trim()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter_map(|part| part.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect();
    if values.len() != 4 {
        return None;
    }
    let width = values[2].abs();
    let height = values[3].abs();
    if width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}

/// Round to a whole pixel count, never below `min_size`.
pub fn clamp_dimension(value: f64, min_size: u32) -> u32 {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < f64::from(min_size) {
        return min_size;
    }
    rounded as u32
}

/// Resolve the base raster size for a preset against the source dimensions.
///
/// Fixed-square presets ignore the source. Source-fit presets keep the
/// aspect ratio, shrink the longer axis to the preset maximum when needed,
/// and never upscale.
pub fn resolve_base_target_size(preset: &ExportPreset, source: &SourceDimensions) -> TargetSize {
    match preset.sizing {
        SizingPolicy::FixedSquare { size } => {
            let size = clamp_dimension(f64::from(size), 1);
            TargetSize {
                width: size,
                height: size,
            }
        }
        SizingPolicy::SourceFit {
            max_dimension,
            minimum_dimension,
        } => {
            let width = source.width.max(1.0);
            let height = source.height.max(1.0);
            let max_dimension = f64::from(max_dimension.max(32));
            let minimum_dimension = minimum_dimension.max(32);

            let source_max = width.max(height);
            let scale = if source_max > max_dimension {
                max_dimension / source_max
            } else {
                1.0
            };
            TargetSize {
                width: clamp_dimension(width * scale, minimum_dimension),
                height: clamp_dimension(height * scale, minimum_dimension),
            }
        }
    }
}

/// Apply an attempt's resolution multiplier to the base size.
pub fn resolve_scaled_dimensions(base: TargetSize, attempt: &AttemptSpec) -> TargetSize {
    let scale = attempt.scale_factor();
    TargetSize {
        width: clamp_dimension(f64::from(base.width) * scale, 1),
        height: clamp_dimension(f64::from(base.height) * scale, 1),
    }
}
