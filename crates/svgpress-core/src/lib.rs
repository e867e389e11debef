//! svgpress-core: shared error type, formats, and configuration.
//!
//! This crate is the foundational dependency for the other svgpress crates,
//! providing the unified error type with HTTP status mapping, the output
//! format enum, and the exporter configuration.

pub mod config;
pub mod error;
pub mod format;

// Re-export the most commonly used items at the crate root.
pub use config::{Config, ToolsConfig};
pub use error::{Error, Result};
pub use format::OutputFormat;
