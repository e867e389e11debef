//! Unified error type for the svgpress workspace.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

/// Unified error type covering all failure modes in svgpress.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested export preset does not exist.
    #[error("Unknown export preset: {0}")]
    InvalidPreset(String),

    /// The requested export config preset does not exist.
    #[error("Unknown export config preset: {0}")]
    InvalidConfigPreset(String),

    /// The caller supplied no SVG markup (or only whitespace).
    #[error("SVG text is required")]
    MissingSvg,

    /// No usable browser binary, or the browser failed to launch.
    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// The external encoder is missing or cannot be spawned.
    #[error("Encoder unavailable [{tool}]: install it and ensure it is on PATH")]
    EncoderUnavailable {
        /// Name of the missing tool.
        tool: String,
    },

    /// The SVG markup could not be staged for rendering.
    #[error("Malformed SVG: {0}")]
    MalformedSvg(String),

    /// The encoder ran but exited with a failure.
    #[error("Encode failed [{tool}]: {detail}")]
    EncodeFailed {
        /// Name of the tool that failed.
        tool: String,
        /// Trailing diagnostic output from the tool.
        detail: String,
    },

    /// The browser session failed while rendering frames.
    #[error("Render error: {0}")]
    Render(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The attempt ladder finished without producing any result.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    ///
    /// Bad request data is 400, missing or failing external tools and
    /// unprocessable SVG input are 422, everything else is 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidPreset(_) => 400,
            Error::InvalidConfigPreset(_) => 400,
            Error::MissingSvg => 400,
            Error::RendererUnavailable(_) => 422,
            Error::EncoderUnavailable { .. } => 422,
            Error::MalformedSvg(_) => 422,
            Error::EncodeFailed { .. } => 422,
            Error::Render(_) => 500,
            Error::Io { .. } => 500,
            Error::ExportFailed(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::EncoderUnavailable`].
    pub fn encoder_unavailable(tool: impl Into<String>) -> Self {
        Error::EncoderUnavailable { tool: tool.into() }
    }

    /// Convenience constructor for [`Error::EncodeFailed`].
    pub fn encode_failed(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::EncodeFailed {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
