//! Trackmap - map tile download and mosaic assembly.
//!
//! Turns a geographic bounding box, a zoom level and a tile source into
//! one map image. The library computes the grid of Web Mercator tiles
//! covering the box, downloads it into an on-disk cache with bounded
//! concurrency, and assembles the cached tiles into a contiguous
//! raster.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use trackmap::coord::BoundingBox;
//! use trackmap::fetch::HttpFetcher;
//! use trackmap::map::{DownloadConfig, MapSettings, NopObserver, TileMap};
//! use trackmap::mosaic::GapPolicy;
//! use trackmap::source::TileSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let bbox = BoundingBox::new(45.064, 6.749, 44.937, 7.074)?;
//! let settings = MapSettings::new(TileSource::OpenStreetMap, 12, bbox);
//! let map = TileMap::new(settings)?;
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let (mosaic, report) = map
//!     .render(
//!         fetcher,
//!         &DownloadConfig::new(),
//!         GapPolicy::default(),
//!         Arc::new(NopObserver),
//!     )
//!     .await?;
//!
//! println!("{} tiles, {} gaps", report.total(), mosaic.gaps().len());
//! mosaic.save(Path::new("map.png"))?;
//! # Ok(())
//! # }
//! ```

pub mod coord;
pub mod fetch;
pub mod logging;
pub mod map;
pub mod mosaic;
pub mod source;
pub mod tile;

/// Version of the trackmap library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
