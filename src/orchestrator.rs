//! Capture orchestration
//!
//! ```text
//! resolve URL ──▶ acquire page ──▶ remove overlays ──▶ converge
//!                                                        │
//!      output/{id}.pdf ◀── assemble ◀── capture each page ◀┘
//! ```
//!
//! URL resolution happens before the provider is asked for a page, so an
//! unsupported source never starts a browser. Per-page failures are logged
//! and skipped. The scratch directory is removed on every exit path.

use crate::config::{CaptureOptions, IdentifierMode};
use crate::convergence::{converge, ConvergenceOutcome};
use crate::error::Result;
use crate::fs_scope::{self, ScratchDir};
use crate::page::{DocumentPage, PageProvider};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::source::{self, ResolvedSource};
use crate::strategy::{CaptureStrategy, RasterStrategy, Strategy, VectorStrategy};
use crate::types::PageUnit;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Summary of a finished job
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    /// Final PDF location
    pub output: PathBuf,
    /// File stem used for the output and scratch directory
    pub identifier: String,
    /// Canonical embed URL that was captured
    pub source_url: String,
    /// Strategy used
    pub strategy: Strategy,
    /// Page units discovered after scrolling
    pub page_units: usize,
    /// Pages in the final document
    pub captured: usize,
    /// Page units missing from the final document
    pub skipped: Vec<usize>,
    /// Whether scrolling reached the end of the content
    pub converged: bool,
    /// Job start
    pub started_at: DateTime<Utc>,
    /// Job end
    pub finished_at: DateTime<Utc>,
}

/// Entry point for capture jobs
///
/// Holds a shared page provider, so several jobs may run against one
/// browser; each job gets its own page.
pub struct DocumentCapture<S: PageProvider> {
    provider: Arc<S>,
    options: CaptureOptions,
}

impl<S: PageProvider> DocumentCapture<S> {
    /// Create a capture entry point
    pub fn new(provider: Arc<S>, options: CaptureOptions) -> Self {
        Self { provider, options }
    }

    /// Options applied to every job
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Capture `url` and return the path of the produced PDF
    pub async fn capture(
        &self,
        url: &str,
        strategy: Strategy,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        Ok(self.capture_with_report(url, strategy, progress).await?.output)
    }

    /// Capture `url` and return a full report
    #[instrument(skip(self, progress))]
    pub async fn capture_with_report(
        &self,
        url: &str,
        strategy: Strategy,
        progress: &dyn ProgressSink,
    ) -> Result<CaptureReport> {
        let started_at = Utc::now();
        let source = source::resolve(url)?;
        info!("Capturing {} with {} strategy", source.embed_url, strategy);

        progress.report(&ProgressEvent::Connecting);
        let page = self
            .provider
            .acquire(&source.embed_url, &self.options.selectors)
            .await?;

        let result = self.run(&page, &source, strategy, progress, started_at).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        result
    }

    async fn run(
        &self,
        page: &S::Page,
        source: &ResolvedSource,
        strategy: Strategy,
        progress: &dyn ProgressSink,
        started_at: DateTime<Utc>,
    ) -> Result<CaptureReport> {
        match page.remove_overlays().await {
            Ok(0) => {}
            Ok(n) => info!("Removed {} overlay(s)", n),
            Err(e) => warn!("Overlay removal failed: {}", e),
        }

        let identifier = self.identifier(page, source).await?;
        let convergence = converge(page, &self.options.convergence, progress).await?;
        let total = page.page_count().await?;
        info!("Found {} page(s)", total);

        fs_scope::create(&self.options.output_dir)?;
        let scratch = ScratchDir::create(self.options.output_dir.join(&identifier))?;
        let output = self.options.output_dir.join(format!("{}.pdf", identifier));

        let (captured, skipped) = match strategy {
            Strategy::Vector => {
                run_strategy(&VectorStrategy, page, total, &scratch, &output, progress).await?
            }
            Strategy::Raster => {
                let raster = RasterStrategy::new(self.options.raster.clone());
                run_strategy(&raster, page, total, &scratch, &output, progress).await?
            }
        };

        progress.report(&ProgressEvent::CleaningUp);
        if let Err(e) = scratch.close() {
            warn!("Cleanup failed: {}", e);
        }

        let output = absolute(&output);
        info!(
            "Wrote {} of {} page(s) to {}",
            captured,
            total,
            output.display()
        );

        Ok(CaptureReport {
            output,
            identifier,
            source_url: source.embed_url.clone(),
            strategy,
            page_units: total,
            captured,
            skipped,
            converged: outcome_converged(&convergence),
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn identifier(&self, page: &S::Page, source: &ResolvedSource) -> Result<String> {
        if self.options.identifier_mode == IdentifierMode::Id {
            return Ok(source.document_id.clone());
        }
        let title = page.document_title().await?;
        match title.as_deref().and_then(source::sanitize_identifier) {
            Some(name) => Ok(name),
            None => {
                warn!(
                    "No usable title, naming output after id {}",
                    source.document_id
                );
                Ok(source.document_id.clone())
            }
        }
    }
}

/// Drive one strategy over every page unit, then assemble
async fn run_strategy<T: CaptureStrategy>(
    strategy: &T,
    page: &dyn DocumentPage,
    total: usize,
    scratch: &ScratchDir,
    output: &Path,
    progress: &dyn ProgressSink,
) -> Result<(usize, Vec<usize>)> {
    let mut artifacts = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for index in 0..total {
        let unit = PageUnit { index, total };
        progress.report(&ProgressEvent::Capturing {
            index: unit.ordinal(),
            total,
        });
        match strategy.capture_page(page, unit, scratch.path()).await {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                warn!(
                    "Skipping page {}/{} ({}): {}",
                    unit.ordinal(),
                    total,
                    strategy.kind(),
                    e
                );
                skipped.push(index);
            }
        }
    }

    if let Err(e) = strategy.finish_capture(page).await {
        warn!("Restoring viewer layout failed: {}", e);
    }

    progress.report(&ProgressEvent::Merging);
    let assembled = strategy.assemble(artifacts, output)?;
    skipped.extend(assembled.skipped);
    skipped.sort_unstable();

    Ok((assembled.pages, skipped))
}

fn outcome_converged(outcome: &ConvergenceOutcome) -> bool {
    if !outcome.converged {
        warn!(
            "Captured before content finished loading ({}% after {} steps)",
            outcome.percent, outcome.steps
        );
    }
    outcome.converged
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
