//! Capture strategies
//!
//! Both strategies share the same orchestration (scroll, iterate, clean up)
//! and differ only in how one page is captured and how the captures become
//! the final document.

pub mod raster;
pub mod vector;

pub use raster::RasterStrategy;
pub use vector::{VectorArtifact, VectorStrategy};

use crate::error::Result;
use crate::page::DocumentPage;
use crate::types::PageUnit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which capture strategy a job uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Print each page to PDF and merge, keeping vector text
    #[default]
    Vector,
    /// Screenshot each page and lay the images out as PDF pages
    Raster,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Vector => write!(f, "vector"),
            Strategy::Raster => write!(f, "raster"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vector" => Ok(Strategy::Vector),
            "raster" => Ok(Strategy::Raster),
            other => Err(format!("unknown strategy '{}', expected vector or raster", other)),
        }
    }
}

/// What assembly produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembled {
    /// Pages in the final document
    pub pages: usize,
    /// Page units whose artifact could not be assembled
    pub skipped: Vec<usize>,
}

/// Per-page capture plus final assembly
#[async_trait]
pub trait CaptureStrategy: Send + Sync {
    /// Artifact left on disk for one page
    type Artifact: Send + Sync;

    /// Strategy identity, for logging and reports
    fn kind(&self) -> Strategy;

    /// Capture `unit` into a file under `scratch`
    async fn capture_page(
        &self,
        page: &dyn DocumentPage,
        unit: PageUnit,
        scratch: &Path,
    ) -> Result<Self::Artifact>;

    /// Called once after the last page, whatever the per-page outcomes
    async fn finish_capture(&self, _page: &dyn DocumentPage) -> Result<()> {
        Ok(())
    }

    /// Combine artifacts, in order, into the document at `output`
    fn assemble(&self, artifacts: Vec<Self::Artifact>, output: &Path) -> Result<Assembled>;
}
