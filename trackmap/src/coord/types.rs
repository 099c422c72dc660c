//! Core coordinate types for the tile grid.

use thiserror::Error;

use super::{lat2pixel, lon2pixel};

/// Minimum latitude representable in the Web Mercator projection.
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude representable in the Web Mercator projection.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Minimum supported zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 20;

/// Width and height of a map tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Errors from coordinate validation and grid construction.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range.
    #[error("latitude {0} outside valid range [{MIN_LAT}, {MAX_LAT}]")]
    InvalidLatitude(f64),
    /// Longitude outside [-180, 180].
    #[error("longitude {0} outside valid range [{MIN_LON}, {MAX_LON}]")]
    InvalidLongitude(f64),
    /// Zoom level beyond the supported maximum.
    #[error("zoom level {0} exceeds maximum {MAX_ZOOM}")]
    InvalidZoom(u8),
}

/// One cell of the slippy-map tile grid.
///
/// `x` counts columns west to east, `y` counts rows north to south,
/// both in `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A geographic bounding box in decimal degrees.
///
/// Construction normalizes corner order, so callers may pass any two
/// opposite corners. Latitudes must lie within the Web Mercator range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    north: f64,
    south: f64,
    west: f64,
    east: f64,
}

impl BoundingBox {
    /// Creates a bounding box from two corner coordinate pairs.
    ///
    /// # Arguments
    ///
    /// * `lat1`, `lon1` - First corner
    /// * `lat2`, `lon2` - Opposite corner
    ///
    /// # Returns
    ///
    /// A `Result` containing the normalized box, or an error if any
    /// coordinate is outside its valid range.
    pub fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<Self, CoordError> {
        for lat in [lat1, lat2] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [lon1, lon2] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }

        Ok(Self {
            north: lat1.max(lat2),
            south: lat1.min(lat2),
            west: lon1.min(lon2),
            east: lon1.max(lon2),
        })
    }

    /// Northern edge latitude.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Southern edge latitude.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Western edge longitude.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Eastern edge longitude.
    pub fn east(&self) -> f64 {
        self.east
    }
}

/// The rectangle of tiles covering a bounding box at one zoom level.
///
/// Indices form a half-open range: columns `x1..x2`, rows `y1..y2`.
/// The rectangle always contains at least one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub zoom: u8,
}

impl TileGrid {
    /// Computes the tile grid covering `bbox` at `zoom`.
    ///
    /// The far edges get an extra tile so the box's eastern and southern
    /// boundaries are always covered; a zero-area box still yields one
    /// tile. Indices are clamped to the `0..2^zoom` tile space, which
    /// only matters for boxes touching the antimeridian or the Mercator
    /// latitude limit.
    pub fn covering(bbox: &BoundingBox, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }

        let tile = i64::from(TILE_SIZE);
        let n = 1i64 << zoom;

        let x1 = lon2pixel(zoom, bbox.west()).div_euclid(tile);
        let y1 = lat2pixel(zoom, bbox.north()).div_euclid(tile);
        let x2 = lon2pixel(zoom, bbox.east()).div_euclid(tile) + 1;
        let y2 = lat2pixel(zoom, bbox.south()).div_euclid(tile) + 1;

        let x1 = x1.clamp(0, n - 1) as u32;
        let y1 = y1.clamp(0, n - 1) as u32;
        let x2 = (x2.clamp(1, n) as u32).max(x1 + 1);
        let y2 = (y2.clamp(1, n) as u32).max(y1 + 1);

        Ok(Self { x1, y1, x2, y2, zoom })
    }

    /// Number of tile columns.
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Number of tile rows.
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Iterates the grid in row-major order (northernmost row first,
    /// west to east within each row).
    pub fn tiles(&self) -> TileGridIterator {
        TileGridIterator {
            grid: *self,
            x: self.x1,
            y: self.y1,
        }
    }
}

/// Row-major iterator over the tiles of a [`TileGrid`].
pub struct TileGridIterator {
    grid: TileGrid,
    x: u32,
    y: u32,
}

impl Iterator for TileGridIterator {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.y >= self.grid.y2 {
            return None;
        }

        let coord = TileCoord {
            x: self.x,
            y: self.y,
            zoom: self.grid.zoom,
        };

        self.x += 1;
        if self.x >= self.grid.x2 {
            self.x = self.grid.x1;
            self.y += 1;
        }

        Some(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_normalizes_corner_order() {
        let a = BoundingBox::new(45.0, 5.0, 44.0, 6.0).unwrap();
        let b = BoundingBox::new(44.0, 6.0, 45.0, 5.0).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.north(), 45.0);
        assert_eq!(a.south(), 44.0);
        assert_eq!(a.west(), 5.0);
        assert_eq!(a.east(), 6.0);
    }

    #[test]
    fn test_bounding_box_rejects_polar_latitude() {
        let result = BoundingBox::new(90.0, 0.0, 0.0, 1.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_bounding_box_rejects_wrapped_longitude() {
        let result = BoundingBox::new(10.0, 0.0, 0.0, 181.0);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_grid_iterator_is_row_major() {
        let grid = TileGrid {
            x1: 2,
            y1: 5,
            x2: 4,
            y2: 7,
            zoom: 8,
        };

        let coords: Vec<(u32, u32)> = grid.tiles().map(|t| (t.x, t.y)).collect();
        assert_eq!(coords, vec![(2, 5), (3, 5), (2, 6), (3, 6)]);
    }

    #[test]
    fn test_grid_iterator_count_matches_tile_count() {
        let grid = TileGrid {
            x1: 10,
            y1: 20,
            x2: 13,
            y2: 25,
            zoom: 12,
        };

        assert_eq!(grid.tile_count(), 15);
        assert_eq!(grid.tiles().count(), 15);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 5);
    }

    #[test]
    fn test_tile_coord_display() {
        let coord = TileCoord {
            x: 2104,
            y: 1473,
            zoom: 12,
        };
        assert_eq!(coord.to_string(), "12/2104/1473");
    }
}
