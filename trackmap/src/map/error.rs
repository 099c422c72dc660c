use thiserror::Error;

use crate::coord::CoordError;
use crate::mosaic::AssemblyError;
use crate::source::TileSource;

/// Errors from building a tile map or running a download.
#[derive(Debug, Error)]
pub enum MapError {
    /// The source exists in the registry but has no download service.
    #[error("tile source '{0}' has no download service")]
    SourceDisabled(TileSource),

    /// The source uses quadtree tile addressing, which this crate
    /// cannot resolve into URIs.
    #[error("tile source '{0}' uses quadtree addressing and cannot be downloaded")]
    SourceUnsupported(TileSource),

    /// The requested zoom is outside what the source serves.
    #[error("zoom {zoom} is outside the supported range {min}..={max}")]
    ZoomOutOfRange { zoom: u8, min: u8, max: u8 },

    /// The bounding box or zoom could not produce a tile grid.
    #[error(transparent)]
    Coord(#[from] CoordError),

    /// No home directory was found to place the default cache in.
    #[error("no home directory found for the tile cache")]
    NoCacheDir,

    /// The cache directory could not be created.
    #[error("cache directory error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloaded tiles could not be composed into a mosaic.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// The run was cancelled before the grid was complete.
    #[error("download cancelled")]
    Cancelled,
}
