//! Completion bookkeeping for a download run.

/// Counts resolved tile tasks against the expected total.
///
/// Every spawned tile task resolves exactly once, whether it fetched,
/// reused a cached file, failed, or was cancelled. [`record`] returns
/// `true` on the call that accounts for the final tile, so the
/// all-tiles-done event fires exactly once per run regardless of the
/// order in which tasks finish.
///
/// [`record`]: DownloadTracker::record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DownloadTracker {
    completed: usize,
    total: usize,
}

impl DownloadTracker {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Records one resolved tile task.
    ///
    /// Returns `true` when this call completes the run.
    pub(crate) fn record(&mut self) -> bool {
        debug_assert!(self.completed < self.total, "more tasks than tiles");
        self.completed += 1;
        self.completed == self.total
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn is_done(&self) -> bool {
        self.completed == self.total
    }
}
