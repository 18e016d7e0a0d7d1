//! Page capture functionality
//!
//! This module builds the CDP print and screenshot requests used for a
//! single page container.

use crate::browser::PageHandle;
use crate::config::ImageFormat;
use crate::error::{Error, Result};
use crate::types::ElementSize;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, PrintToPdfParams, Viewport,
};
use chromiumoxide::page::ScreenshotParams;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// CSS pixels per inch, as used by Chromium's print pipeline
pub const CSS_PX_PER_INCH: f64 = 96.0;

/// JPEG quality used for raster captures
pub const JPEG_QUALITY: i64 = 90;

/// Document-space rectangle of an element, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl ClipRect {
    /// Size of the rectangle
    pub fn size(&self) -> ElementSize {
        ElementSize::new(self.width, self.height)
    }

    /// CDP clip region rendered at `scale`
    pub fn to_viewport(&self, scale: f64) -> Viewport {
        Viewport {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            scale,
        }
    }
}

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Print parameters for a one-page PDF exactly the size of a container
    pub fn print_params(size: ElementSize) -> PrintToPdfParams {
        PrintToPdfParams::builder()
            .print_background(true)
            .prefer_css_page_size(false)
            .paper_width(size.width / CSS_PX_PER_INCH)
            .paper_height(size.height / CSS_PX_PER_INCH)
            .margin_top(0.0)
            .margin_bottom(0.0)
            .margin_left(0.0)
            .margin_right(0.0)
            .page_ranges("1")
            .build()
    }

    /// Screenshot parameters clipped to one element
    pub fn screenshot_params(clip: Viewport, format: ImageFormat) -> ScreenshotParams {
        let builder = ScreenshotParams::builder()
            .clip(clip)
            .from_surface(true)
            .capture_beyond_viewport(true);

        match format {
            ImageFormat::Png => builder.format(CaptureScreenshotFormat::Png).build(),
            ImageFormat::Jpeg => builder
                .format(CaptureScreenshotFormat::Jpeg)
                .quality(JPEG_QUALITY)
                .build(),
        }
    }

    /// Print the page as it is currently laid out
    #[instrument(skip(page))]
    pub async fn print(page: &PageHandle, size: ElementSize) -> Result<Vec<u8>> {
        let data = page
            .page
            .pdf(Self::print_params(size))
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!("PDF generated: {} bytes", data.len());
        Ok(data)
    }

    /// Screenshot a clip region of the page
    #[instrument(skip(page))]
    pub async fn screenshot(
        page: &PageHandle,
        clip: ClipRect,
        scale: f64,
        format: ImageFormat,
    ) -> Result<Vec<u8>> {
        let params = Self::screenshot_params(clip.to_viewport(scale), format);

        let data = page
            .page
            .screenshot(params)
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!("Screenshot captured: {} bytes", data.len());
        Ok(data)
    }
}
