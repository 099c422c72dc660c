//! Tile URL construction from provider templates.

use crate::coord::TileCoord;

/// A provider URL template with positional markers.
///
/// Recognized markers, each substituted independently and only where it
/// appears:
///
/// * `#X` - tile column
/// * `#Y` - tile row
/// * `#Z` - zoom level
/// * `#S` - provider's maximum zoom minus the zoom level
/// * `#R` - server shard digit, 0 to 3
///
/// The quadtree markers `#Q`, `#W` and `#U` found in some provider
/// templates are left untouched; sources using them are reported as
/// unsupported by the registry before a URL is ever built.
pub struct UriTemplate<'a> {
    raw: &'a str,
}

impl<'a> UriTemplate<'a> {
    /// Wraps a raw template string.
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Substitutes the markers for one tile.
    ///
    /// # Arguments
    ///
    /// * `coord` - Tile to address
    /// * `max_zoom` - The provider's maximum zoom, for the `#S` marker
    /// * `shard` - Server shard digit for the `#R` marker
    ///
    /// # Returns
    ///
    /// The resolved URL. Resolution is pure: the same inputs always
    /// produce the same URL.
    pub fn resolve(&self, coord: &TileCoord, max_zoom: u8, shard: u8) -> String {
        self.raw
            .replace("#X", &coord.x.to_string())
            .replace("#Y", &coord.y.to_string())
            .replace("#Z", &coord.zoom.to_string())
            .replace("#S", &max_zoom.saturating_sub(coord.zoom).to_string())
            .replace("#R", &shard.to_string())
    }
}
