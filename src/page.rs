//! The browser capability consumed by the capture pipeline
//!
//! The orchestrator only sees these traits. [`crate::browser::ViewerPage`]
//! implements them over CDP; tests implement them in memory.

use crate::config::{ImageFormat, ViewerSelectors};
use crate::error::Result;
use crate::types::{CaptureViewport, ElementSize, ScrollMetrics};
use async_trait::async_trait;

/// A viewer page that has been navigated and has settled
#[async_trait]
pub trait DocumentPage: Send + Sync {
    /// Delete obstructing overlays, returning how many were removed
    async fn remove_overlays(&self) -> Result<usize>;

    /// Title of the loaded document, if it has one
    async fn document_title(&self) -> Result<Option<String>>;

    /// Advance the scroll container by one page
    async fn page_down(&self) -> Result<()>;

    /// Current scroll state of the scroll container
    async fn scroll_metrics(&self) -> Result<ScrollMetrics>;

    /// Number of page containers in the DOM
    async fn page_count(&self) -> Result<usize>;

    /// Computed CSS size of page container `index`
    async fn page_size(&self, index: usize) -> Result<ElementSize>;

    /// Render container `index` alone and print it to a one-page PDF of `size`
    async fn print_isolated(&self, index: usize, size: ElementSize) -> Result<Vec<u8>>;

    /// Make every page container visible again after isolated printing
    async fn restore_layout(&self) -> Result<()>;

    /// Scroll container `index` into view and screenshot exactly that element
    async fn screenshot_page(
        &self,
        index: usize,
        viewport: CaptureViewport,
        format: ImageFormat,
    ) -> Result<Vec<u8>>;

    /// Dispose of the page
    async fn close(&self) -> Result<()>;
}

/// Source of fresh, navigated pages
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// Page type handed out
    type Page: DocumentPage;

    /// Open a new page at `url` and wait for its initial render
    async fn acquire(&self, url: &str, selectors: &ViewerSelectors) -> Result<Self::Page>;
}
