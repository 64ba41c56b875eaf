//! Error types for HTML to PDF conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting HTML to PDF
#[derive(Error, Debug)]
pub enum Error {
    /// Writing the temporary HTML document or the final PDF failed
    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine failed to load the document or to export it as PDF
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The temporary HTML document could not be removed
    #[error("Failed to remove temporary document {}: {source}", .path.display())]
    CleanupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine did not signal completion in time
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Page geometry describes an empty or degenerate printable region
    #[error("Invalid page configuration: {0}")]
    InvalidPage(String),

    /// Failed to initialize an engine instance
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
