//! Output container formats for encoded animations.

use serde::{Deserialize, Serialize};

/// Animated raster container produced by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy animated WebP (libwebp).
    Webp,
    /// Palette-based GIF.
    Gif,
    /// Animated PNG.
    Apng,
}

impl OutputFormat {
    /// Lowercase format name as used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Apng => "apng",
        }
    }

    /// All supported formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Webp, OutputFormat::Gif, OutputFormat::Apng]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OutputFormat::Webp).unwrap(), "\"webp\"");
        assert_eq!(serde_json::to_string(&OutputFormat::Apng).unwrap(), "\"apng\"");
    }

    #[test]
    fn deserializes_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"gif\"").unwrap();
        assert_eq!(format, OutputFormat::Gif);
    }

    #[test]
    fn display_matches_as_str() {
        for format in OutputFormat::all() {
            assert_eq!(format.to_string(), format.as_str());
        }
    }
}
