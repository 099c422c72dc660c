//! User-facing description of the map to build.

use crate::coord::BoundingBox;
use crate::source::{Availability, TileSource};

use super::MapError;

/// Which source, zoom level and geographic region to render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    source: TileSource,
    zoom: u8,
    bbox: BoundingBox,
}

impl MapSettings {
    /// Bundles the three inputs of a map build. No validation happens
    /// here, [`validate`] runs when the map is constructed.
    ///
    /// [`validate`]: MapSettings::validate
    pub fn new(source: TileSource, zoom: u8, bbox: BoundingBox) -> Self {
        Self { source, zoom, bbox }
    }

    pub fn source(&self) -> TileSource {
        self.source
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Checks that the source can be downloaded from at this zoom.
    pub fn validate(&self) -> Result<(), MapError> {
        match self.source.availability() {
            Availability::Disabled => return Err(MapError::SourceDisabled(self.source)),
            Availability::Unsupported => return Err(MapError::SourceUnsupported(self.source)),
            Availability::Available => {}
        }
        if !self.source.supports_zoom(self.zoom) {
            return Err(MapError::ZoomOutOfRange {
                zoom: self.zoom,
                min: self.source.min_zoom(),
                max: self.source.max_zoom(),
            });
        }
        Ok(())
    }
}
