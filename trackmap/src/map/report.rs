//! Outcome reporting for a download run.
//!
//! A run never aborts because a single tile failed. Instead every tile
//! resolves into a success or a [`TileFailure`], and the caller decides
//! what an incomplete grid means for the mosaic.

use std::time::Duration;

use thiserror::Error;

use crate::coord::TileCoord;
use crate::fetch::FetchError;

/// Why a single tile could not be stored in the cache.
#[derive(Debug, Error)]
pub enum TileError {
    /// No response arrived within the per-request timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The HTTP transfer itself failed.
    #[error(transparent)]
    Transfer(#[from] FetchError),

    /// The tile arrived but could not be written to the cache.
    #[error("cache write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A tile that exhausted its attempts without landing in the cache.
#[derive(Debug)]
pub struct TileFailure {
    /// Grid position of the failed tile.
    pub coord: TileCoord,
    /// The URI that was requested.
    pub uri: String,
    /// How many attempts were made.
    pub attempts: u32,
    /// The error from the last attempt.
    pub error: TileError,
}

/// Accounting for one download run.
#[derive(Debug, Default)]
pub struct DownloadReport {
    total: usize,
    completed: Vec<TileCoord>,
    failed: Vec<TileFailure>,
    cancelled: bool,
}

impl DownloadReport {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            completed: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn add_success(&mut self, coord: TileCoord) {
        self.completed.push(coord);
    }

    pub(crate) fn add_failure(&mut self, failure: TileFailure) {
        self.failed.push(failure);
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Number of tiles the run set out to download.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Tiles that are now present in the cache.
    pub fn completed(&self) -> &[TileCoord] {
        &self.completed
    }

    /// Tiles that exhausted their attempts.
    pub fn failed(&self) -> &[TileFailure] {
        &self.failed
    }

    /// Whether the run was cancelled before every tile resolved.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// `true` when every tile of the grid is in the cache.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.cancelled && self.completed.len() == self.total
    }
}
