//! Vector capture: print each page in isolation, then merge the PDFs

use super::{Assembled, CaptureStrategy, Strategy};
use crate::error::{CaptureError, Result};
use crate::page::DocumentPage;
use crate::pdf;
use crate::types::PageUnit;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A printed single-page PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorArtifact {
    /// Page unit it was printed from
    pub index: usize,
    /// File location
    pub path: PathBuf,
}

/// Print-per-page strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorStrategy;

#[async_trait]
impl CaptureStrategy for VectorStrategy {
    type Artifact = VectorArtifact;

    fn kind(&self) -> Strategy {
        Strategy::Vector
    }

    async fn capture_page(
        &self,
        page: &dyn DocumentPage,
        unit: PageUnit,
        scratch: &Path,
    ) -> Result<VectorArtifact> {
        let size = page.page_size(unit.index).await?;
        if !size.is_usable() {
            return Err(CaptureError::InvalidSize {
                index: unit.index,
                width: size.width,
                height: size.height,
            }
            .into());
        }

        let data = page
            .print_isolated(unit.index, size)
            .await
            .map_err(|e| CaptureError::PrintFailed {
                index: unit.index,
                message: e.to_string(),
            })?;

        let path = scratch.join(format!("page-{:04}.pdf", unit.index));
        tokio::fs::write(&path, &data).await?;
        debug!(
            "Printed page {}/{} ({}x{}, {} bytes)",
            unit.ordinal(),
            unit.total,
            size.width,
            size.height,
            data.len()
        );

        Ok(VectorArtifact {
            index: unit.index,
            path,
        })
    }

    async fn finish_capture(&self, page: &dyn DocumentPage) -> Result<()> {
        page.restore_layout().await
    }

    fn assemble(&self, artifacts: Vec<VectorArtifact>, output: &Path) -> Result<Assembled> {
        let paths: Vec<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();
        let report = pdf::merge(&paths, output)?;
        Ok(Assembled {
            pages: report.pages,
            skipped: report.skipped.iter().map(|&pos| artifacts[pos].index).collect(),
        })
    }
}
