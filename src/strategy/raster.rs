//! Raster capture: screenshot each page, then lay the images out as a PDF

use super::{Assembled, CaptureStrategy, Strategy};
use crate::config::RasterConfig;
use crate::error::{CaptureError, Result};
use crate::page::DocumentPage;
use crate::pdf;
use crate::types::{CaptureViewport, PageImage, PageUnit};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Screenshot-per-page strategy
#[derive(Debug, Clone, Default)]
pub struct RasterStrategy {
    config: RasterConfig,
}

impl RasterStrategy {
    /// Create a strategy with the given capture settings
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CaptureStrategy for RasterStrategy {
    type Artifact = PageImage;

    fn kind(&self) -> Strategy {
        Strategy::Raster
    }

    async fn capture_page(
        &self,
        page: &dyn DocumentPage,
        unit: PageUnit,
        scratch: &Path,
    ) -> Result<PageImage> {
        let size = page.page_size(unit.index).await?;
        if !size.is_usable() {
            return Err(CaptureError::InvalidSize {
                index: unit.index,
                width: size.width,
                height: size.height,
            }
            .into());
        }

        let viewport =
            CaptureViewport::fit(size, self.config.target_width, self.config.device_scale);
        let data = page
            .screenshot_page(unit.index, viewport, self.config.format)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed {
                index: unit.index,
                message: e.to_string(),
            })?;

        let path = scratch.join(format!(
            "page-{:04}.{}",
            unit.index,
            self.config.format.extension()
        ));
        tokio::fs::write(&path, &data).await?;

        // the file, not the DOM, decides the page size
        let image = PageImage::probe(&path).map_err(|e| CaptureError::UnreadableImage {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if (image.width(), image.height()) != viewport.pixel_size() {
            debug!(
                "Page {} image is {}x{}, viewport expected {:?}",
                unit.ordinal(),
                image.width(),
                image.height(),
                viewport.pixel_size()
            );
        }

        Ok(image)
    }

    fn assemble(&self, artifacts: Vec<PageImage>, output: &Path) -> Result<Assembled> {
        pdf::generate(&artifacts, output)?;
        Ok(Assembled {
            pages: artifacts.len(),
            skipped: Vec::new(),
        })
    }
}
