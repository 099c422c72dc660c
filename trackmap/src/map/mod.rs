//! Tile map construction and download orchestration.
//!
//! [`TileMap`] turns validated [`MapSettings`] into a concrete tile
//! grid with one [`Tile`] per cell, then downloads the grid into the
//! on-disk cache. Downloads run as one task per tile on a shared
//! semaphore, so concurrency is bounded no matter how large the grid
//! is. Every task resolves exactly once; a run finishes when all tiles
//! are accounted for, not when the first one fails.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::coord::TileGrid;
use crate::fetch::TileFetcher;
use crate::mosaic::{self, GapPolicy, Mosaic};
use crate::tile::{self, Tile, UriTemplate};

mod config;
mod error;
mod progress;
mod report;
mod settings;
mod tracker;

pub use config::{
    DownloadConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_IN_FLIGHT, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::MapError;
pub use progress::{NopObserver, ProgressObserver};
pub use report::{DownloadReport, TileError, TileFailure};
pub use settings::MapSettings;

use tracker::DownloadTracker;

/// How a single tile task resolved.
enum TileOutcome {
    /// Fetched from the source and written to the cache.
    Fetched { bytes: u64 },
    /// A non-empty cache file was reused without a fetch.
    Reused,
    /// All attempts exhausted.
    Failed { attempts: u32, error: TileError },
    /// The run was cancelled before this tile finished.
    Cancelled,
}

/// A tile grid bound to a source, ready to download and assemble.
#[derive(Debug, Clone)]
pub struct TileMap {
    settings: MapSettings,
    grid: TileGrid,
    tiles: Vec<Tile>,
    cache_root: PathBuf,
}

impl TileMap {
    /// Builds the map for `settings` with the cache in its default
    /// location under the user's home directory.
    pub fn new(settings: MapSettings) -> Result<Self, MapError> {
        let cache_root = tile::default_cache_root().ok_or(MapError::NoCacheDir)?;
        Self::with_cache_root(settings, cache_root)
    }

    /// Builds the map for `settings` with the cache rooted at
    /// `cache_root`.
    ///
    /// Validates the settings, computes the covering grid and resolves
    /// every tile's URI and cache path. Nothing touches the network or
    /// the filesystem until [`download`] runs.
    ///
    /// [`download`]: TileMap::download
    pub fn with_cache_root(settings: MapSettings, cache_root: PathBuf) -> Result<Self, MapError> {
        settings.validate()?;

        let grid = TileGrid::covering(&settings.bbox(), settings.zoom())?;
        let template = UriTemplate::new(settings.source().url_template());
        let max_zoom = settings.source().max_zoom();
        let ext = settings.source().tile_format().ext();

        let mut rng = rand::rng();
        let tiles = grid
            .tiles()
            .map(|coord| {
                let shard = rng.random_range(0..=3u8);
                let uri = template.resolve(&coord, max_zoom, shard);
                let cache_file = tile::tile_path(&cache_root, &coord, ext);
                Tile::new(coord, uri, cache_file)
            })
            .collect();

        Ok(Self {
            settings,
            grid,
            tiles,
            cache_root,
        })
    }

    pub fn settings(&self) -> MapSettings {
        self.settings
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    /// The tiles of the grid in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Downloads every tile of the grid into the cache.
    ///
    /// See [`download_cancellable`] for the full semantics; this
    /// variant runs to completion.
    ///
    /// [`download_cancellable`]: TileMap::download_cancellable
    pub async fn download<F>(
        &self,
        fetcher: Arc<F>,
        config: &DownloadConfig,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<DownloadReport, MapError>
    where
        F: TileFetcher + 'static,
    {
        self.download_cancellable(fetcher, config, observer, CancellationToken::new())
            .await
    }

    /// Downloads every tile of the grid into the cache, stopping early
    /// when `cancel` fires.
    ///
    /// One task is spawned per tile; `config.max_in_flight()` bounds
    /// how many hold the wire at once. A tile that fails keeps the rest
    /// of the run going and ends up in the report's failure list with
    /// the error from its last attempt. The returned report accounts
    /// for the whole grid exactly once, in every case including
    /// cancellation.
    #[instrument(
        level = "debug",
        skip_all,
        fields(zoom = self.grid.zoom, tiles = self.tiles.len())
    )]
    pub async fn download_cancellable<F>(
        &self,
        fetcher: Arc<F>,
        config: &DownloadConfig,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> Result<DownloadReport, MapError>
    where
        F: TileFetcher + 'static,
    {
        let mut report = DownloadReport::new(self.tiles.len());

        tokio::fs::create_dir_all(tile::zoom_dir(&self.cache_root, self.grid.zoom)).await?;

        if cancel.is_cancelled() {
            report.mark_cancelled();
            return Ok(report);
        }

        let semaphore = Arc::new(Semaphore::new(config.max_in_flight()));
        let mut downloads = JoinSet::new();

        for (index, tile) in self.tiles.iter().enumerate() {
            let tile = tile.clone();
            let fetcher = Arc::clone(&fetcher);
            let semaphore = Arc::clone(&semaphore);
            let config = *config;
            let observer = Arc::clone(&observer);
            let cancel = cancel.clone();

            downloads.spawn(async move {
                let outcome = fetch_tile(tile, fetcher, semaphore, config, observer, cancel).await;
                (index, outcome)
            });
        }

        let mut tracker = DownloadTracker::new(self.tiles.len());
        while let Some(joined) = downloads.join_next().await {
            // A task that panicked still counts toward the barrier.
            let all_done = tracker.record();

            match joined {
                Ok((index, TileOutcome::Fetched { bytes })) => {
                    let tile = &self.tiles[index];
                    debug!(tile = %tile.coord(), bytes, "tile stored");
                    report.add_success(tile.coord());
                }
                Ok((index, TileOutcome::Reused)) => {
                    let tile = &self.tiles[index];
                    debug!(tile = %tile.coord(), "cached tile reused");
                    report.add_success(tile.coord());
                }
                Ok((index, TileOutcome::Failed { attempts, error })) => {
                    let tile = &self.tiles[index];
                    warn!(tile = %tile.coord(), attempts, error = %error, "tile failed");
                    report.add_failure(TileFailure {
                        coord: tile.coord(),
                        uri: tile.uri().to_string(),
                        attempts,
                        error,
                    });
                }
                Ok((_, TileOutcome::Cancelled)) => {}
                Err(join_error) => {
                    warn!(error = %join_error, "tile task failed to run");
                }
            }

            observer.tile_finished(tracker.completed(), tracker.total());

            if all_done {
                info!(
                    completed = report.completed().len(),
                    failed = report.failed().len(),
                    "all tiles accounted for"
                );
            }
        }

        if cancel.is_cancelled() {
            report.mark_cancelled();
        }
        Ok(report)
    }

    /// Downloads the grid and assembles the mosaic in one call.
    ///
    /// Assembly happens exactly once, after the download run has
    /// accounted for every tile. Cancellation surfaces as
    /// [`MapError::Cancelled`] instead of a half-filled image.
    pub async fn render<F>(
        &self,
        fetcher: Arc<F>,
        config: &DownloadConfig,
        policy: GapPolicy,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<(Mosaic, DownloadReport), MapError>
    where
        F: TileFetcher + 'static,
    {
        self.render_cancellable(fetcher, config, policy, observer, CancellationToken::new())
            .await
    }

    /// Cancellable variant of [`render`].
    ///
    /// [`render`]: TileMap::render
    pub async fn render_cancellable<F>(
        &self,
        fetcher: Arc<F>,
        config: &DownloadConfig,
        policy: GapPolicy,
        observer: Arc<dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> Result<(Mosaic, DownloadReport), MapError>
    where
        F: TileFetcher + 'static,
    {
        let report = self
            .download_cancellable(fetcher, config, observer, cancel)
            .await?;
        if report.cancelled() {
            return Err(MapError::Cancelled);
        }
        let mosaic = mosaic::assemble(self, policy).await?;
        Ok((mosaic, report))
    }
}

/// Resolves one tile: cache check, bounded fetch with retries, store.
async fn fetch_tile<F>(
    tile: Tile,
    fetcher: Arc<F>,
    semaphore: Arc<Semaphore>,
    config: DownloadConfig,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
) -> TileOutcome
where
    F: TileFetcher + 'static,
{
    if config.reuse_cached() {
        if let Ok(meta) = tokio::fs::metadata(tile.cache_file()).await {
            if meta.len() > 0 {
                return TileOutcome::Reused;
            }
        }
    }

    let coord = tile.coord();
    let progress_observer = Arc::clone(&observer);
    let mut progress = move |bytes: u64, total: Option<u64>| {
        progress_observer.tile_progress(coord, bytes, total);
    };

    let mut last_error: Option<TileError> = None;
    for attempt in 1..=config.max_attempts() {
        // Hold the wire permit only while the request runs, not during
        // backoff or the cache write.
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return TileOutcome::Cancelled,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return TileOutcome::Cancelled,
            },
        };

        let attempt_result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return TileOutcome::Cancelled,
            result = tokio::time::timeout(
                config.request_timeout(),
                fetcher.fetch(tile.uri(), &mut progress),
            ) => result,
        };
        drop(permit);

        match attempt_result {
            Ok(Ok(body)) => {
                return match store_tile(&tile, &body).await {
                    Ok(()) => TileOutcome::Fetched {
                        bytes: body.len() as u64,
                    },
                    Err(error) => TileOutcome::Failed {
                        attempts: attempt,
                        error: TileError::Io(error),
                    },
                };
            }
            Ok(Err(error)) => {
                debug!(tile = %coord, attempt, error = %error, "attempt failed");
                last_error = Some(TileError::Transfer(error));
            }
            Err(_) => {
                debug!(tile = %coord, attempt, "attempt timed out");
                last_error = Some(TileError::Timeout(config.request_timeout()));
            }
        }

        if attempt < config.max_attempts() {
            // Exponential backoff, capped at 6.4s.
            let backoff = Duration::from_millis(100 * (1u64 << attempt.min(6)));
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return TileOutcome::Cancelled,
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    TileOutcome::Failed {
        attempts: config.max_attempts(),
        error: last_error.unwrap_or(TileError::Timeout(config.request_timeout())),
    }
}

/// Writes the tile body next to its final path, then renames it into
/// place so the cache never holds a half-written tile.
async fn store_tile(tile: &Tile, body: &[u8]) -> std::io::Result<()> {
    let partial = tile::partial_path(tile.cache_file());
    tokio::fs::write(&partial, body).await?;
    tokio::fs::rename(&partial, tile.cache_file()).await
}
