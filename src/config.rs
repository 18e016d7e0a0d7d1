//! Capture job configuration
//!
//! [`CaptureOptions`] deserializes from JSON with per-field defaults, so a
//! config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How the output file name is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierMode {
    /// Sanitized document title, falling back to the id
    #[default]
    Title,
    /// Document id extracted from the URL
    Id,
}

/// Image encoding used for raster captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless PNG
    #[default]
    Png,
    /// JPEG, embedded into the PDF without re-encoding
    Jpeg,
}

impl ImageFormat {
    /// File extension
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Bounds for the scroll-convergence loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Delay after each page-down before reading scroll metrics
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    /// Stop after this many steps (None = unbounded)
    #[serde(default = "default_max_steps")]
    pub max_steps: Option<u32>,
    /// Stop after this much wall-clock time (None = unbounded)
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: Option<u64>,
}

fn default_step_delay_ms() -> u64 {
    100
}

fn default_max_steps() -> Option<u32> {
    Some(5000)
}

fn default_max_duration_ms() -> Option<u64> {
    Some(300_000)
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
            max_steps: default_max_steps(),
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

impl ConvergenceConfig {
    /// No bounds at all; the loop runs until the content stops growing
    pub fn unbounded() -> Self {
        Self {
            max_steps: None,
            max_duration_ms: None,
            ..Default::default()
        }
    }

    /// Inter-step delay
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Wall-clock bound, if any
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }
}

/// Raster strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Capture width in CSS pixels
    #[serde(default = "default_target_width")]
    pub target_width: f64,
    /// Device pixel multiplier for sharper output
    #[serde(default = "default_device_scale")]
    pub device_scale: f64,
    /// Screenshot encoding
    #[serde(default)]
    pub format: ImageFormat,
}

fn default_target_width() -> f64 {
    1200.0
}

fn default_device_scale() -> f64 {
    2.0
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            device_scale: default_device_scale(),
            format: ImageFormat::Png,
        }
    }
}

/// CSS selectors describing the viewer's DOM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSelectors {
    /// Element whose scroll position drives lazy loading
    #[serde(default = "default_scroll_container")]
    pub scroll_container: String,
    /// One element per rendered page
    #[serde(default = "default_page_container")]
    pub page_container: String,
    /// Overlays removed before capture (cookie consent and similar)
    #[serde(default = "default_consent_overlays")]
    pub consent_overlays: Vec<String>,
    /// Element holding the document title (None = `document.title`)
    #[serde(default)]
    pub title: Option<String>,
}

fn default_scroll_container() -> String {
    ".document_scroller".to_string()
}

fn default_page_container() -> String {
    ".outer_page".to_string()
}

fn default_consent_overlays() -> Vec<String> {
    vec![
        "[aria-label='Cookie Consent Banner']".to_string(),
        "#onetrust-consent-sdk".to_string(),
    ]
}

impl Default for ViewerSelectors {
    fn default() -> Self {
        Self {
            scroll_container: default_scroll_container(),
            page_container: default_page_container(),
            consent_overlays: default_consent_overlays(),
            title: None,
        }
    }
}

/// Options for a capture job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Root for both scratch and final artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Output naming
    #[serde(default)]
    pub identifier_mode: IdentifierMode,
    /// Scroll-convergence bounds
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    /// Raster strategy settings
    #[serde(default)]
    pub raster: RasterConfig,
    /// Viewer DOM selectors
    #[serde(default)]
    pub selectors: ViewerSelectors,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            identifier_mode: IdentifierMode::default(),
            convergence: ConvergenceConfig::default(),
            raster: RasterConfig::default(),
            selectors: ViewerSelectors::default(),
        }
    }
}

impl CaptureOptions {
    /// Create a new options builder
    pub fn builder() -> CaptureOptionsBuilder {
        CaptureOptionsBuilder::default()
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Builder for CaptureOptions
#[derive(Default)]
pub struct CaptureOptionsBuilder {
    options: CaptureOptions,
}

impl CaptureOptionsBuilder {
    /// Start from existing options
    pub fn from_options(options: CaptureOptions) -> Self {
        Self { options }
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = dir.into();
        self
    }

    /// Set the identifier mode
    pub fn identifier_mode(mut self, mode: IdentifierMode) -> Self {
        self.options.identifier_mode = mode;
        self
    }

    /// Set the delay between scroll steps
    pub fn step_delay_ms(mut self, ms: u64) -> Self {
        self.options.convergence.step_delay_ms = ms;
        self
    }

    /// Bound the number of scroll steps
    pub fn max_steps(mut self, steps: Option<u32>) -> Self {
        self.options.convergence.max_steps = steps;
        self
    }

    /// Bound the convergence wall-clock time
    pub fn max_duration_ms(mut self, ms: Option<u64>) -> Self {
        self.options.convergence.max_duration_ms = ms;
        self
    }

    /// Set raster target width and device scale
    pub fn raster_size(mut self, target_width: f64, device_scale: f64) -> Self {
        self.options.raster.target_width = target_width;
        self.options.raster.device_scale = device_scale;
        self
    }

    /// Set raster screenshot encoding
    pub fn raster_format(mut self, format: ImageFormat) -> Self {
        self.options.raster.format = format;
        self
    }

    /// Replace the viewer selectors
    pub fn selectors(mut self, selectors: ViewerSelectors) -> Self {
        self.options.selectors = selectors;
        self
    }

    /// Build the options
    pub fn build(self) -> CaptureOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_options_default() {
        let opts = CaptureOptions::default();
        assert_eq!(opts.output_dir, PathBuf::from("output"));
        assert_eq!(opts.identifier_mode, IdentifierMode::Title);
        assert_eq!(opts.convergence.step_delay_ms, 100);
        assert_eq!(opts.convergence.max_steps, Some(5000));
        assert_eq!(opts.raster.device_scale, 2.0);
        assert_eq!(opts.raster.format, ImageFormat::Png);
    }

    #[test]
    fn test_capture_options_builder() {
        let opts = CaptureOptions::builder()
            .output_dir("/tmp/out")
            .identifier_mode(IdentifierMode::Id)
            .step_delay_ms(0)
            .max_steps(None)
            .raster_size(800.0, 1.5)
            .raster_format(ImageFormat::Jpeg)
            .build();

        assert_eq!(opts.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(opts.identifier_mode, IdentifierMode::Id);
        assert_eq!(opts.convergence.step_delay(), Duration::ZERO);
        assert!(opts.convergence.max_steps.is_none());
        assert_eq!(opts.raster.target_width, 800.0);
        assert_eq!(opts.raster.format.extension(), "jpg");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"identifier_mode":"id","convergence":{"max_steps":null}}"#;
        let opts: CaptureOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.identifier_mode, IdentifierMode::Id);
        assert!(opts.convergence.max_steps.is_none());
        assert_eq!(opts.convergence.max_duration_ms, Some(300_000));
        assert_eq!(opts.selectors.page_container, ".outer_page");
    }

    #[test]
    fn test_unbounded_convergence() {
        let cfg = ConvergenceConfig::unbounded();
        assert!(cfg.max_steps.is_none());
        assert!(cfg.max_duration().is_none());
        assert_eq!(cfg.step_delay_ms, 100);
    }
}
