//! HTML to PDF
//!
//! Renders an HTML string to a PDF file by loading it into a headless browser
//! engine and invoking the engine's print-to-PDF capability.
//!
//! A conversion writes the HTML to a uniquely named temporary file, loads it,
//! waits for the engine to signal navigation completion, exports the document
//! with the requested page geometry, writes the bytes to the destination and
//! removes the temporary file on every exit path.
//!
//! # Features
//!
//! - **CDP Backend** (default): Uses Chrome DevTools Protocol via headless Chrome
//! - **Injectable engines**: any [`Engine`] implementation can back a [`Converter`]
//! - **Engine pool**: bounded parallelism, one in-flight conversion per engine
//!
//! # Example
//!
//! ```no_run
//! use html_to_pdf::{Converter, ConverterConfig, PageConfiguration};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(ConverterConfig::default()).await?;
//! converter
//!     .convert(
//!         "<html><body><h1>Hello, World!</h1></body></html>",
//!         "/tmp/out.pdf",
//!         &PageConfiguration::default(),
//!     )
//!     .await?;
//! converter.close().await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub mod error;
pub use error::{Error, Result};

pub mod page;
pub use page::{Insets, PageConfiguration, PageSize, PrintGeometry, Rect};

pub mod document;

#[cfg(feature = "cdp")]
pub mod cdp;

// Async conversion API (worker-backed engine pool)
pub mod async_api;
pub use async_api::Converter;

/// Configuration for a [`Converter`] and the engines it owns
///
/// Every field has a default, so partial JSON documents deserialize:
///
/// ```
/// let cfg: html_to_pdf::ConverterConfig = serde_json::from_str(r#"{"pool_size": 2}"#).unwrap();
/// assert_eq!(cfg.pool_size, 2);
/// assert_eq!(cfg.timeout_ms, 30000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Upper bound on one conversion's wait for the engine, in milliseconds
    pub timeout_ms: u64,
    /// Number of engine instances (and worker threads)
    pub pool_size: usize,
    /// Directory for temporary HTML documents (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// Browser binary to launch (auto-detected when unset)
    pub chrome_path: Option<PathBuf>,
    /// Whether to keep the browser sandbox enabled
    pub sandbox: bool,
    /// Whether CSS backgrounds are printed
    pub print_background: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            pool_size: 1,
            temp_dir: None,
            chrome_path: None,
            sandbox: true,
            print_background: true,
        }
    }
}

impl ConverterConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::ConfigError("pool_size must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Directory temporary documents are written to
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Core trait for rendering engines
///
/// An engine loads one document at a time and exports it as PDF. Instances
/// are not required to be `Send`: a [`Converter`] creates each engine on the
/// worker thread that will drive it and never moves it.
pub trait Engine {
    /// Create a new engine instance with the given configuration
    fn new(config: &ConverterConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load a `file://` URL and return once navigation has completed
    fn load_file(&mut self, url: &Url) -> Result<()>;

    /// Export the currently loaded document as PDF bytes
    fn print_pdf(&mut self, page: &PageConfiguration) -> Result<Vec<u8>>;

    /// Close the engine and clean up resources
    fn close(self) -> Result<()>;
}

/// Convert `html` to a PDF at `destination` with a fresh headless Chrome.
///
/// Launches a single engine for this call and shuts it down afterwards. Keep
/// a [`Converter`] around instead when converting more than one document.
/// An existing file at `destination` is overwritten.
#[cfg(feature = "cdp")]
pub async fn convert(html: &str, destination: impl AsRef<Path>, page: &PageConfiguration) -> Result<()> {
    let converter = Converter::new(ConverterConfig::default()).await?;
    let res = converter.convert(html, destination, page).await;
    let closed = converter.close().await;
    res.and(closed)
}

/// Convert `html` to `directory/<title>.pdf` with a fresh headless Chrome.
#[cfg(feature = "cdp")]
pub async fn convert_to_directory(
    html: &str,
    title: &str,
    directory: impl AsRef<Path>,
    page: &PageConfiguration,
) -> Result<()> {
    convert(html, async_api::titled_destination(directory.as_ref(), title), page).await
}
