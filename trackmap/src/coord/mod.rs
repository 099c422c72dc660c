//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the global Web Mercator pixel space that slippy-map tile servers use,
//! plus the tile-grid arithmetic built on top of it.

mod types;

pub use types::{
    BoundingBox, CoordError, TileCoord, TileGrid, TileGridIterator, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON, MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::TAU;

/// Converts a longitude to a global pixel column.
///
/// At zoom `z` the world is `2^z * 256` pixels wide; longitude -180 maps
/// to pixel 0 and longitude 180 to the far edge. The result is rounded
/// to the nearest pixel.
///
/// # Arguments
///
/// * `zoom` - Zoom level (0 to 20)
/// * `lon` - Longitude in degrees
///
/// # Returns
///
/// The pixel column. Only meaningful for longitudes within
/// [-180, 180]; out-of-range values are not rejected.
#[inline]
pub fn lon2pixel(zoom: u8, lon: f64) -> i64 {
    let n = 2.0_f64.powi(zoom as i32);
    let world = n * f64::from(TILE_SIZE);

    (lon.to_radians() * world / TAU + world / 2.0).round() as i64
}

/// Converts a latitude to a global pixel row.
///
/// Applies the Web Mercator projection `atanh(sin(lat))`, so rows grow
/// from north to south: the latitude limit 85.05113 maps to pixel 0 and
/// the equator to the midline. The result is rounded to the nearest
/// pixel.
///
/// # Arguments
///
/// * `zoom` - Zoom level (0 to 20)
/// * `lat` - Latitude in degrees
///
/// # Returns
///
/// The pixel row. Only meaningful for latitudes within the Mercator
/// range [-85.05113, 85.05113]; out-of-range values are not rejected.
#[inline]
pub fn lat2pixel(zoom: u8, lat: f64) -> i64 {
    let n = 2.0_f64.powi(zoom as i32);
    let world = n * f64::from(TILE_SIZE);
    let lat_m = lat.to_radians().sin().atanh();

    (-lat_m * world / TAU + world / 2.0).round() as i64
}
