//! Error types for viewer-capture
//!
//! Only [`SourceError`], [`BrowserError`] and [`NavigationError`] abort a job.
//! [`CaptureError`] is raised per page and recovered by the orchestrator, and
//! cleanup failures are logged, never returned.

use thiserror::Error;

/// The main error type for capture operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input URL is not a supported document source
    #[error("Unsupported source: {0}")]
    Source(#[from] SourceError),

    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Per-page capture errors (screenshot, print)
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Final document assembly errors
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Rejected input URLs
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// URL could not be parsed at all
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parsed but matches neither the document nor the embed shape
    #[error("URL is neither a document nor an embed URL: {0}")]
    UnrecognizedShape(String),

    /// Document id could not be extracted
    #[error("No document id in URL: {0}")]
    MissingId(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// DOM query or mutation failed
    #[error("Script evaluation failed: {0}")]
    ScriptFailed(String),

    /// An expected element is absent from the rendered viewer
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Per-page capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot of page {index} failed: {message}")]
    ScreenshotFailed {
        /// Zero-based page index
        index: usize,
        /// Underlying failure
        message: String,
    },

    /// Print-to-PDF failed
    #[error("Printing page {index} failed: {message}")]
    PrintFailed {
        /// Zero-based page index
        index: usize,
        /// Underlying failure
        message: String,
    },

    /// Captured image could not be read back
    #[error("Unreadable image {path}: {message}")]
    UnreadableImage {
        /// Image path
        path: String,
        /// Underlying failure
        message: String,
    },

    /// Container reported a size that cannot be captured
    #[error("Page {index} has unusable size {width}x{height}")]
    InvalidSize {
        /// Zero-based page index
        index: usize,
        /// Reported width
        width: f64,
        /// Reported height
        height: f64,
    },
}

/// PDF generation and merge errors
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// Nothing survived capture, so no document is written
    #[error("No pages were captured")]
    NoPages,

    /// PDF object model error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Assembly(AssemblyError::Pdf(err.to_string()))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Assembly(AssemblyError::Image(err.to_string()))
    }
}
