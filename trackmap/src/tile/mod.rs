//! Tile entities and their addressing
//!
//! A [`Tile`] binds one grid cell to the URL it is fetched from and the
//! cache file it is stored at. Both are fixed when the map is built, so
//! the download machinery never recomputes addresses.

mod cache;
mod uri;

pub use cache::{default_cache_root, tile_filename, tile_path, zoom_dir};
pub use uri::UriTemplate;

pub(crate) use cache::partial_path;

use std::path::{Path, PathBuf};

use crate::coord::TileCoord;

/// One tile of a map: a grid cell, its resolved download URL and its
/// cache location. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Tile {
    coord: TileCoord,
    uri: String,
    cache_file: PathBuf,
}

impl Tile {
    /// Binds a grid cell to its download URL and cache file.
    pub fn new(coord: TileCoord, uri: String, cache_file: PathBuf) -> Self {
        Self {
            coord,
            uri,
            cache_file,
        }
    }

    /// The grid cell this tile covers.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Fully resolved download URL.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Where the tile image is cached on disk.
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }
}
