//! Value types shared by the capture pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One logical page discovered in the rendered viewer, in DOM order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUnit {
    /// Zero-based DOM position
    pub index: usize,
    /// Total number of units discovered for the job
    pub total: usize,
}

impl PageUnit {
    /// One-based ordinal, as shown to users
    pub fn ordinal(&self) -> usize {
        self.index + 1
    }
}

/// A rasterized page on disk with its true pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl PageImage {
    /// Create a descriptor from already-known dimensions
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Read the image header and build a descriptor from its real size
    pub fn probe(path: impl Into<PathBuf>) -> image::ImageResult<Self> {
        let path = path.into();
        let (width, height) = image::image_dimensions(&path)?;
        Ok(Self {
            path,
            width,
            height,
        })
    }

    /// Image file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Scroll state of the viewer's scroll container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// `scrollTop`
    pub scroll_top: f64,
    /// `clientHeight`
    pub client_height: f64,
    /// `scrollHeight`
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// True once the visible window reaches the end of the content
    pub fn at_end(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height
    }

    /// Loaded fraction in percent, clamped to `0..=100`
    pub fn percent(&self) -> u8 {
        if self.scroll_height <= 0.0 || self.at_end() {
            return 100;
        }
        let pct = (self.scroll_top + self.client_height) * 100.0 / self.scroll_height;
        pct.floor().clamp(0.0, 100.0) as u8
    }
}

/// Computed CSS pixel size of a page container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementSize {
    /// Width in CSS pixels
    pub width: f64,
    /// Height in CSS pixels
    pub height: f64,
}

impl ElementSize {
    /// Create a size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and positive
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Height divided by width
    pub fn aspect_ratio(&self) -> f64 {
        self.height / self.width
    }
}

/// Screenshot viewport for one container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureViewport {
    /// Target width in CSS pixels
    pub width: f64,
    /// Height preserving the container's aspect ratio
    pub height: f64,
    /// Device pixel multiplier applied on top of the viewport
    pub device_scale: f64,
}

impl CaptureViewport {
    /// Fit `size` to `target_width`, keeping its aspect ratio
    pub fn fit(size: ElementSize, target_width: f64, device_scale: f64) -> Self {
        Self {
            width: target_width,
            height: (target_width * size.aspect_ratio()).round(),
            device_scale,
        }
    }

    /// Scale factor to apply to the element's own CSS box
    pub fn scale_for(&self, size: ElementSize) -> f64 {
        self.device_scale * self.width / size.width
    }

    /// Expected output pixel size (the image itself stays authoritative)
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_scale).round() as u32,
            (self.height * self.device_scale).round() as u32,
        )
    }
}
