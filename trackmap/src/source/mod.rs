//! Map tile source registry
//!
//! A fixed catalog of public slippy-map tile providers: display name,
//! attribution, URL template, zoom range and image format for each. The
//! catalog also records which providers are unusable, either because the
//! service has gone offline or because their URL scheme needs quadtree
//! addressing, which this crate does not implement.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Image format a provider serves, which decides the cache file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    Png,
    Jpeg,
}

impl TileFormat {
    /// File extension for cached tiles of this format.
    pub fn ext(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpeg => "jpg",
        }
    }
}

/// Whether a source can actually be downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Usable: has a URL template this crate can resolve.
    Available,
    /// No URL template; the service is gone or was never a real source.
    Disabled,
    /// Template needs quadtree addressing (`#Q`/`#W`/`#U` markers).
    Unsupported,
}

/// The catalog of known tile providers.
///
/// Catalog order is stable; the numeric position doubles as the source
/// index accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSource {
    Null,
    OpenStreetMap,
    OpenStreetMapRenderer,
    OpenAerialMap,
    MapsForFree,
    OpenCycleMap,
    OpenTopoMap,
    OsmPublicTransport,
    GoogleStreet,
    GoogleSatellite,
    GoogleHybrid,
    VirtualEarthStreet,
    VirtualEarthSatellite,
    VirtualEarthHybrid,
    OsmcTrails,
}

const ALL: [TileSource; 15] = [
    TileSource::Null,
    TileSource::OpenStreetMap,
    TileSource::OpenStreetMapRenderer,
    TileSource::OpenAerialMap,
    TileSource::MapsForFree,
    TileSource::OpenCycleMap,
    TileSource::OpenTopoMap,
    TileSource::OsmPublicTransport,
    TileSource::GoogleStreet,
    TileSource::GoogleSatellite,
    TileSource::GoogleHybrid,
    TileSource::VirtualEarthStreet,
    TileSource::VirtualEarthSatellite,
    TileSource::VirtualEarthHybrid,
    TileSource::OsmcTrails,
];

impl TileSource {
    /// All catalog entries in stable order.
    pub fn all() -> &'static [TileSource] {
        &ALL
    }

    /// Looks up a source by its catalog index.
    pub fn from_index(index: usize) -> Option<TileSource> {
        ALL.get(index).copied()
    }

    /// Position of this source in the catalog.
    pub fn index(&self) -> usize {
        ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        match self {
            TileSource::Null => "None",
            TileSource::OpenStreetMap => "OpenStreetMap I",
            TileSource::OpenStreetMapRenderer => "OpenStreetMap II",
            TileSource::OpenAerialMap => "OpenAerialMap",
            TileSource::MapsForFree => "Maps-For-Free",
            TileSource::OpenCycleMap => "OpenCycleMap",
            TileSource::OpenTopoMap => "OpenTopoMap",
            TileSource::OsmPublicTransport => "Public Transport",
            TileSource::GoogleStreet => "Google Maps",
            TileSource::GoogleSatellite => "Google Satellite",
            TileSource::GoogleHybrid => "Google Hybrid",
            TileSource::VirtualEarthStreet => "Virtual Earth",
            TileSource::VirtualEarthSatellite => "Virtual Earth Satellite",
            TileSource::VirtualEarthHybrid => "Virtual Earth Hybrid",
            TileSource::OsmcTrails => "OSMC Trails",
        }
    }

    /// Stable lowercase identifier accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            TileSource::Null => "none",
            TileSource::OpenStreetMap => "openstreetmap",
            TileSource::OpenStreetMapRenderer => "openstreetmap-renderer",
            TileSource::OpenAerialMap => "openaerialmap",
            TileSource::MapsForFree => "maps-for-free",
            TileSource::OpenCycleMap => "opencyclemap",
            TileSource::OpenTopoMap => "opentopomap",
            TileSource::OsmPublicTransport => "public-transport",
            TileSource::GoogleStreet => "google-street",
            TileSource::GoogleSatellite => "google-satellite",
            TileSource::GoogleHybrid => "google-hybrid",
            TileSource::VirtualEarthStreet => "virtualearth-street",
            TileSource::VirtualEarthSatellite => "virtualearth-satellite",
            TileSource::VirtualEarthHybrid => "virtualearth-hybrid",
            TileSource::OsmcTrails => "osmc-trails",
        }
    }

    /// Attribution line owed to the data provider. Empty when the source
    /// has no usable data.
    pub fn attribution(&self) -> &'static str {
        match self {
            TileSource::OpenStreetMap => "© OpenStreetMap contributors",
            TileSource::OpenCycleMap => "Maps © thunderforest.com, Data © osm.org/copyright",
            TileSource::OsmPublicTransport => {
                "Maps © ÖPNVKarte, Data © OpenStreetMap contributors"
            }
            TileSource::MapsForFree => "Maps © Maps-For-Free",
            TileSource::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
            TileSource::GoogleStreet | TileSource::GoogleSatellite | TileSource::GoogleHybrid => {
                "Map provided by Google"
            }
            TileSource::VirtualEarthStreet
            | TileSource::VirtualEarthSatellite
            | TileSource::VirtualEarthHybrid => "Map provided by Microsoft",
            _ => "",
        }
    }

    /// URL template with `#X`/`#Y`/`#Z`-style markers, or the empty
    /// string for sources with no reachable service.
    pub fn url_template(&self) -> &'static str {
        match self {
            TileSource::Null => "",
            TileSource::OpenStreetMap => "https://tile.openstreetmap.org/#Z/#X/#Y.png",
            // The Tile@Home rendering network was shut down
            TileSource::OpenStreetMapRenderer => "",
            // OpenAerialMap has been offline since 2008
            TileSource::OpenAerialMap => "",
            TileSource::MapsForFree => {
                "https://maps-for-free.com/layer/relief/z#Z/row#Y/#Z_#X-#Y.jpg"
            }
            TileSource::OpenCycleMap => "http://b.tile.opencyclemap.org/cycle/#Z/#X/#Y.png",
            TileSource::OpenTopoMap => "https://a.tile.opentopomap.org/#Z/#X/#Y.png",
            TileSource::OsmPublicTransport => "http://tile.xn--pnvkarte-m4a.de/tilegen/#Z/#X/#Y.png",
            TileSource::GoogleStreet => "http://mt#R.google.com/vt/lyrs=m&hl=en&x=#X&s=&y=#Y&z=#Z",
            TileSource::GoogleSatellite => {
                "http://mt#R.google.com/vt/lyrs=s&hl=en&x=#X&s=&y=#Y&z=#Z"
            }
            TileSource::GoogleHybrid => "http://mt#R.google.com/vt/lyrs=y&hl=en&x=#X&s=&y=#Y&z=#Z",
            TileSource::VirtualEarthStreet => {
                "http://a#R.ortho.tiles.virtualearth.net/tiles/r#W.jpeg?g=50"
            }
            TileSource::VirtualEarthSatellite => {
                "http://a#R.ortho.tiles.virtualearth.net/tiles/a#W.jpeg?g=50"
            }
            TileSource::VirtualEarthHybrid => {
                "http://a#R.ortho.tiles.virtualearth.net/tiles/h#W.jpeg?g=50"
            }
            // Appears to be shut down
            TileSource::OsmcTrails => "",
        }
    }

    /// Lowest zoom level the provider serves.
    pub fn min_zoom(&self) -> u8 {
        1
    }

    /// Highest zoom level the provider serves.
    pub fn max_zoom(&self) -> u8 {
        match self {
            TileSource::Null => 18,
            TileSource::OpenStreetMap => 19,
            TileSource::OpenCycleMap => 18,
            TileSource::OsmPublicTransport => 20,
            TileSource::OpenStreetMapRenderer
            | TileSource::OpenAerialMap
            | TileSource::OpenTopoMap => 17,
            TileSource::GoogleStreet | TileSource::GoogleSatellite | TileSource::GoogleHybrid => 20,
            TileSource::VirtualEarthStreet
            | TileSource::VirtualEarthSatellite
            | TileSource::VirtualEarthHybrid => 19,
            TileSource::OsmcTrails => 15,
            TileSource::MapsForFree => 11,
        }
    }

    /// Whether the provider serves this zoom level.
    pub fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }

    /// Image format the provider serves.
    pub fn tile_format(&self) -> TileFormat {
        match self {
            TileSource::MapsForFree
            | TileSource::GoogleSatellite
            | TileSource::GoogleHybrid
            | TileSource::VirtualEarthStreet
            | TileSource::VirtualEarthSatellite
            | TileSource::VirtualEarthHybrid => TileFormat::Jpeg,
            _ => TileFormat::Png,
        }
    }

    /// Whether this source can be downloaded from at all.
    pub fn availability(&self) -> Availability {
        let template = self.url_template();
        if template.is_empty() {
            Availability::Disabled
        } else if uses_quadtree(template) {
            Availability::Unsupported
        } else {
            Availability::Available
        }
    }
}

fn uses_quadtree(template: &str) -> bool {
    template.contains("#Q") || template.contains("#W") || template.contains("#U")
}

impl fmt::Display for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a source argument matches nothing in the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown tile source '{0}'")]
pub struct UnknownSource(pub String);

impl FromStr for TileSource {
    type Err = UnknownSource;

    /// Parses a catalog index (`"1"`) or a slug (`"openstreetmap"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return TileSource::from_index(index).ok_or_else(|| UnknownSource(s.to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        ALL.iter()
            .find(|source| source.slug() == lowered)
            .copied()
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}
