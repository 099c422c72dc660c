//! Progress callbacks for download runs.

use crate::coord::TileCoord;

/// Receives progress events while tiles download.
///
/// Implementations are shared across worker tasks, so methods take
/// `&self` and must be cheap; a slow observer stalls the transfer it is
/// reporting on. All methods default to no-ops, implement only what the
/// frontend needs.
pub trait ProgressObserver: Send + Sync {
    /// Byte-level progress of one tile transfer.
    ///
    /// `bytes` is the running total received for this tile, `total` the
    /// expected size when the server announced one. Called repeatedly
    /// while the body streams in, and again from the start if the tile
    /// is retried.
    fn tile_progress(&self, coord: TileCoord, bytes: u64, total: Option<u64>) {
        let _ = (coord, bytes, total);
    }

    /// One more tile has resolved.
    ///
    /// `completed` counts every resolved tile, fetched, reused, failed
    /// or cancelled. Reaches `total` exactly once per run.
    fn tile_finished(&self, completed: usize, total: usize) {
        let _ = (completed, total);
    }
}

/// Observer that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopObserver;

impl ProgressObserver for NopObserver {}
