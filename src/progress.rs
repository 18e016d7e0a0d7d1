//! Advisory progress reporting
//!
//! Progress never influences control flow; sinks only observe.

use std::fmt;

/// A status update emitted during a capture job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Browser session and page are being prepared
    Connecting,
    /// Scroll-convergence progress in percent
    Loading(u8),
    /// About to capture page `index` (1-based) of `total`
    Capturing {
        /// 1-based page ordinal
        index: usize,
        /// Number of page units
        total: usize,
    },
    /// Combining captures into the final document
    Merging,
    /// Removing scratch artifacts
    CleaningUp,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Connecting => write!(f, "connecting"),
            ProgressEvent::Loading(pct) => write!(f, "loading content: {}%", pct),
            ProgressEvent::Capturing { index, total } => {
                write!(f, "capturing page {}/{}", index, total)
            }
            ProgressEvent::Merging => write!(f, "merging"),
            ProgressEvent::CleaningUp => write!(f, "cleaning up"),
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    /// Observe one event
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_messages() {
        assert_eq!(ProgressEvent::Connecting.to_string(), "connecting");
        assert_eq!(ProgressEvent::Loading(7).to_string(), "loading content: 7%");
        assert_eq!(
            ProgressEvent::Capturing { index: 2, total: 9 }.to_string(),
            "capturing page 2/9"
        );
        assert_eq!(ProgressEvent::Merging.to_string(), "merging");
        assert_eq!(ProgressEvent::CleaningUp.to_string(), "cleaning up");
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push(e.to_string());
        sink.report(&ProgressEvent::Merging);
        NoProgress.report(&ProgressEvent::Merging);
        assert_eq!(*seen.lock().unwrap(), vec!["merging".to_string()]);
    }
}
