//! Tile cache path construction.
//!
//! Downloaded tiles live under a per-zoom directory tree:
//! `<root>/<zoom>/tile_<row>_<col>.<ext>`. The default root is
//! `~/.trackmap/cache`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::coord::TileCoord;

/// Default cache root under the user's home directory, or `None` when
/// no home directory can be determined.
pub fn default_cache_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".trackmap").join("cache"))
}

/// Directory holding all cached tiles of one zoom level.
pub fn zoom_dir(root: &Path, zoom: u8) -> PathBuf {
    root.join(zoom.to_string())
}

/// Cache file name for a tile.
///
/// # Example
///
/// ```
/// use trackmap::coord::TileCoord;
/// use trackmap::tile::tile_filename;
///
/// let coord = TileCoord { x: 2104, y: 1473, zoom: 12 };
/// assert_eq!(tile_filename(&coord, "png"), "tile_1473_2104.png");
/// ```
pub fn tile_filename(coord: &TileCoord, ext: &str) -> String {
    format!("tile_{}_{}.{}", coord.y, coord.x, ext)
}

/// Full cache path for a tile.
pub fn tile_path(root: &Path, coord: &TileCoord, ext: &str) -> PathBuf {
    zoom_dir(root, coord.zoom).join(tile_filename(coord, ext))
}

/// Sibling path a tile is written to before being renamed into place.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
