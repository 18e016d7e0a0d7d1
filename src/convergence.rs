//! Scroll-convergence
//!
//! The viewer renders pages lazily as its scroll container moves, so the real
//! page count is only known once scrolling stops advancing. This module pages
//! down until `scrollTop + clientHeight >= scrollHeight`, or until one of the
//! configured bounds is hit, in which case the job continues with whatever
//! has loaded so far.

use crate::config::ConvergenceConfig;
use crate::error::Result;
use crate::page::DocumentPage;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::ScrollMetrics;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Result of a convergence run
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceOutcome {
    /// Page-down steps issued
    pub steps: u32,
    /// True when the end of the content was reached
    pub converged: bool,
    /// Highest progress percentage reported
    pub percent: u8,
    /// Last observed scroll state
    pub last_metrics: Option<ScrollMetrics>,
    /// Time spent scrolling
    pub elapsed: Duration,
}

/// Why the loop stopped short of the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Steps(u32),
    Duration(Duration),
}

fn bound_hit(config: &ConvergenceConfig, steps: u32, elapsed: Duration) -> Option<Bound> {
    if let Some(max) = config.max_steps {
        if steps >= max {
            return Some(Bound::Steps(max));
        }
    }
    if let Some(max) = config.max_duration() {
        if elapsed >= max {
            return Some(Bound::Duration(max));
        }
    }
    None
}

/// Scroll `page` until all lazily-loaded content has rendered
#[instrument(skip(page, config, progress))]
pub async fn converge<P>(
    page: &P,
    config: &ConvergenceConfig,
    progress: &dyn ProgressSink,
) -> Result<ConvergenceOutcome>
where
    P: DocumentPage + ?Sized,
{
    let start = Instant::now();
    let delay = config.step_delay();
    let mut steps = 0u32;
    let mut percent = 0u8;
    let mut last_metrics = None;

    loop {
        if let Some(bound) = bound_hit(config, steps, start.elapsed()) {
            warn!(
                "Scrolling stopped at {}% after {} steps ({:?}); continuing with loaded pages",
                percent, steps, bound
            );
            return Ok(ConvergenceOutcome {
                steps,
                converged: false,
                percent,
                last_metrics,
                elapsed: start.elapsed(),
            });
        }

        page.page_down().await?;
        tokio::time::sleep(delay).await;
        let metrics = page.scroll_metrics().await?;
        steps += 1;

        // never report a regression when the content grows under us
        percent = percent.max(metrics.percent());
        progress.report(&ProgressEvent::Loading(percent));
        debug!(
            "Step {}: top={} client={} height={}",
            steps, metrics.scroll_top, metrics.client_height, metrics.scroll_height
        );
        last_metrics = Some(metrics);

        if metrics.at_end() {
            info!("Content fully loaded after {} steps", steps);
            return Ok(ConvergenceOutcome {
                steps,
                converged: true,
                percent,
                last_metrics,
                elapsed: start.elapsed(),
            });
        }
    }
}
