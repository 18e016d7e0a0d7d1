//! Viewer Capture - Turn Lazily Rendered Online Documents Into PDFs
//!
//! This crate drives a remote document viewer in headless Chromium, scrolls
//! it until every page has rendered, captures each page, and writes a single
//! PDF named after the document.
//!
//! # Features
//!
//! - **Vector capture**: each page printed on its own, then merged, keeping text
//! - **Raster capture**: each page screenshotted and laid out as a PDF page
//! - **Bounded scrolling**: lazy-loading convergence with step and time limits
//! - **Injectable browser**: the pipeline only depends on the [`page`] traits
//!
//! # Architecture
//!
//! ```text
//! URL ──▶ Source Resolver ──▶ Browser Session (CDP)
//!                                   │
//!                                   ▼
//!                           ┌──────────────┐
//!                           │ Convergence  │
//!                           └──────┬───────┘
//!                     ┌────────────┴────────────┐
//!                     ▼                         ▼
//!              Vector strategy            Raster strategy
//!              print + merge         screenshot + generate
//!                     └────────────┬────────────┘
//!                                  ▼
//!                          output/{identifier}.pdf
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewer_capture::browser::{BrowserConfig, BrowserSession};
//! use viewer_capture::progress::NoProgress;
//! use viewer_capture::{CaptureOptions, DocumentCapture, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
//!     let capture = DocumentCapture::new(session.clone(), CaptureOptions::default());
//!
//!     let pdf = capture
//!         .capture("https://viewer.example/doc/12345/annual-report", Strategy::Vector, &NoProgress)
//!         .await;
//!     session.release().await?;
//!
//!     println!("Wrote {}", pdf?.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod convergence;
pub mod error;
pub mod fs_scope;
pub mod orchestrator;
pub mod page;
pub mod pdf;
pub mod progress;
pub mod source;
pub mod strategy;
pub mod types;

// Re-exports for convenience
pub use config::{CaptureOptions, IdentifierMode, ImageFormat};
pub use error::{Error, Result};
pub use orchestrator::{CaptureReport, DocumentCapture};
pub use page::{DocumentPage, PageProvider};
pub use progress::{ProgressEvent, ProgressSink};
pub use strategy::Strategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
