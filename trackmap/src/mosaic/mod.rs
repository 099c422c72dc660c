//! Mosaic assembly: combines cached tiles into a single image.
//!
//! Assembly reads the tiles of a [`TileMap`] from the cache and places
//! them on one contiguous canvas, northernmost row at the top. Cells
//! whose tile is missing or undecodable are handled per [`GapPolicy`]:
//! painted with a placeholder color and recorded, or an error.

use std::path::Path;

use image::{Rgb, RgbImage};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::coord::{TileCoord, TileGrid, TILE_SIZE};
use crate::map::TileMap;
use crate::tile::Tile;

/// Placeholder color for gap cells (R=255, G=0, B=255).
pub const GAP_FILL: Rgb<u8> = Rgb([255, 0, 255]);

/// What to do with grid cells whose tile never made it into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapPolicy {
    /// Paint the cell with a solid color and record the gap.
    Fill(Rgb<u8>),
    /// Fail the assembly on the first gap.
    Abort,
}

impl Default for GapPolicy {
    fn default() -> Self {
        GapPolicy::Fill(GAP_FILL)
    }
}

/// Errors from composing or saving a mosaic.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A tile was missing or undecodable under [`GapPolicy::Abort`].
    #[error("tile {coord} is unusable: {reason}")]
    TileUnusable { coord: TileCoord, reason: String },

    /// The mosaic could not be written to disk.
    #[error("failed to save mosaic: {0}")]
    Save(#[from] image::ImageError),

    /// The composition task could not run.
    #[error("assembly task failed")]
    Worker,
}

/// The assembled map image together with its provenance.
#[derive(Debug)]
pub struct Mosaic {
    image: RgbImage,
    grid: TileGrid,
    gaps: Vec<TileCoord>,
}

impl Mosaic {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// The tile grid this mosaic covers.
    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    /// Grid cells that were painted with the gap color.
    pub fn gaps(&self) -> &[TileCoord] {
        &self.gaps
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Writes the mosaic to `path`, format chosen by file extension.
    pub fn save(&self, path: &Path) -> Result<(), AssemblyError> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Assembles the cached tiles of `map` into a mosaic.
///
/// Tile decode and pixel placement run on a blocking task so the async
/// runtime is not stalled by a grid's worth of image work.
#[instrument(level = "debug", skip_all, fields(tiles = map.tiles().len()))]
pub async fn assemble(map: &TileMap, policy: GapPolicy) -> Result<Mosaic, AssemblyError> {
    let grid = map.grid();

    let mut contents = Vec::with_capacity(map.tiles().len());
    for tile in map.tiles() {
        contents.push((tile.coord(), read_tile(tile).await));
    }

    let mosaic = tokio::task::spawn_blocking(move || compose(grid, contents, policy))
        .await
        .map_err(|_| AssemblyError::Worker)??;

    debug!(
        width = mosaic.width(),
        height = mosaic.height(),
        gaps = mosaic.gaps().len(),
        "mosaic assembled"
    );
    Ok(mosaic)
}

async fn read_tile(tile: &Tile) -> Result<Vec<u8>, String> {
    match tokio::fs::read(tile.cache_file()).await {
        Ok(data) if data.is_empty() => Err("empty cache file".to_string()),
        Ok(data) => Ok(data),
        Err(error) => Err(error.to_string()),
    }
}

/// Synchronous composition (runs in spawn_blocking).
fn compose(
    grid: TileGrid,
    contents: Vec<(TileCoord, Result<Vec<u8>, String>)>,
    policy: GapPolicy,
) -> Result<Mosaic, AssemblyError> {
    let mut canvas = RgbImage::new(grid.width() * TILE_SIZE, grid.height() * TILE_SIZE);
    let mut gaps = Vec::new();

    for (coord, data) in contents {
        let x_offset = (coord.x - grid.x1) * TILE_SIZE;
        let y_offset = (coord.y - grid.y1) * TILE_SIZE;

        let decoded = data.and_then(|body| {
            image::load_from_memory(&body)
                .map(|img| img.to_rgb8())
                .map_err(|error| error.to_string())
        });

        match decoded {
            Ok(tile_image) => place_tile(&mut canvas, &tile_image, x_offset, y_offset),
            Err(reason) => match policy {
                GapPolicy::Abort => {
                    return Err(AssemblyError::TileUnusable { coord, reason });
                }
                GapPolicy::Fill(color) => {
                    warn!(tile = %coord, reason = %reason, "filling gap");
                    fill_tile(&mut canvas, x_offset, y_offset, color);
                    gaps.push(coord);
                }
            },
        }
    }

    Ok(Mosaic {
        image: canvas,
        grid,
        gaps,
    })
}

/// Places a tile image onto the canvas at the given offset.
fn place_tile(canvas: &mut RgbImage, tile: &RgbImage, x_offset: u32, y_offset: u32) {
    // Tiles should be 256x256, but servers occasionally send other
    // sizes. Copy at most one cell so neighbours are never overwritten.
    let width = tile.width().min(TILE_SIZE);
    let height = tile.height().min(TILE_SIZE);

    for y in 0..height {
        for x in 0..width {
            canvas.put_pixel(x_offset + x, y_offset + y, *tile.get_pixel(x, y));
        }
    }
}

/// Fills one cell with a solid color.
fn fill_tile(canvas: &mut RgbImage, x_offset: u32, y_offset: u32, color: Rgb<u8>) {
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            canvas.put_pixel(x_offset + x, y_offset + y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::coord::BoundingBox;
    use crate::map::{MapSettings, TileMap};
    use crate::source::TileSource;

    fn encode_tile(width: u32, height: u32, color: Rgb<u8>) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, color);
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn coord(x: u32, y: u32) -> TileCoord {
        TileCoord { x, y, zoom: 5 }
    }

    /// 2x2 grid, columns 16..18 and rows 14..16.
    fn test_grid() -> TileGrid {
        TileGrid {
            x1: 16,
            y1: 14,
            x2: 18,
            y2: 16,
            zoom: 5,
        }
    }

    #[test]
    fn test_default_policy_fills_magenta() {
        assert_eq!(GapPolicy::default(), GapPolicy::Fill(GAP_FILL));
    }

    #[test]
    fn test_compose_places_tiles_by_grid_position() {
        let red = Rgb([200, 0, 0]);
        let green = Rgb([0, 200, 0]);
        let blue = Rgb([0, 0, 200]);
        let white = Rgb([255, 255, 255]);
        let contents = vec![
            (coord(16, 14), Ok(encode_tile(256, 256, red))),
            (coord(17, 14), Ok(encode_tile(256, 256, green))),
            (coord(16, 15), Ok(encode_tile(256, 256, blue))),
            (coord(17, 15), Ok(encode_tile(256, 256, white))),
        ];

        let mosaic = compose(test_grid(), contents, GapPolicy::default()).unwrap();

        assert_eq!(mosaic.width(), 512);
        assert_eq!(mosaic.height(), 512);
        assert!(mosaic.gaps().is_empty());
        assert_eq!(*mosaic.image().get_pixel(128, 128), red);
        assert_eq!(*mosaic.image().get_pixel(384, 128), green);
        assert_eq!(*mosaic.image().get_pixel(128, 384), blue);
        assert_eq!(*mosaic.image().get_pixel(384, 384), white);
    }

    #[test]
    fn test_compose_fills_missing_tile() {
        let grey = Rgb([90, 90, 90]);
        let contents = vec![
            (coord(16, 14), Ok(encode_tile(256, 256, grey))),
            (coord(17, 14), Err("missing".to_string())),
            (coord(16, 15), Ok(encode_tile(256, 256, grey))),
            (coord(17, 15), Ok(encode_tile(256, 256, grey))),
        ];

        let mosaic = compose(test_grid(), contents, GapPolicy::default()).unwrap();

        assert_eq!(mosaic.gaps(), &[coord(17, 14)]);
        // Corners of the gap cell.
        assert_eq!(*mosaic.image().get_pixel(256, 0), GAP_FILL);
        assert_eq!(*mosaic.image().get_pixel(511, 0), GAP_FILL);
        assert_eq!(*mosaic.image().get_pixel(256, 255), GAP_FILL);
        assert_eq!(*mosaic.image().get_pixel(511, 255), GAP_FILL);
        // Just outside it.
        assert_eq!(*mosaic.image().get_pixel(255, 0), grey);
        assert_eq!(*mosaic.image().get_pixel(256, 256), grey);
    }

    #[test]
    fn test_compose_abort_policy_errors_on_gap() {
        let contents = vec![(coord(16, 14), Err("missing".to_string()))];
        let grid = TileGrid {
            x1: 16,
            y1: 14,
            x2: 17,
            y2: 15,
            zoom: 5,
        };

        match compose(grid, contents, GapPolicy::Abort) {
            Err(AssemblyError::TileUnusable { coord: c, reason }) => {
                assert_eq!(c, coord(16, 14));
                assert_eq!(reason, "missing");
            }
            other => panic!("expected TileUnusable, got {other:?}"),
        }
    }

    #[test]
    fn test_compose_undecodable_tile_becomes_gap() {
        let contents = vec![(coord(16, 14), Ok(b"not an image".to_vec()))];
        let grid = TileGrid {
            x1: 16,
            y1: 14,
            x2: 17,
            y2: 15,
            zoom: 5,
        };

        let mosaic = compose(grid, contents, GapPolicy::default()).unwrap();
        assert_eq!(mosaic.gaps().len(), 1);
        assert_eq!(*mosaic.image().get_pixel(0, 0), GAP_FILL);
    }

    #[test]
    fn test_oversized_tile_does_not_bleed_into_neighbours() {
        let red = Rgb([255, 0, 0]);
        let grid = TileGrid {
            x1: 0,
            y1: 0,
            x2: 1,
            y2: 2,
            zoom: 1,
        };
        let contents = vec![
            (TileCoord { x: 0, y: 0, zoom: 1 }, Ok(encode_tile(300, 300, red))),
            (TileCoord { x: 0, y: 1, zoom: 1 }, Err("missing".to_string())),
        ];

        let mosaic = compose(grid, contents, GapPolicy::default()).unwrap();

        assert_eq!(*mosaic.image().get_pixel(0, 100), red);
        // The row below belongs to the gap cell, not the oversized tile.
        assert_eq!(*mosaic.image().get_pixel(0, 260), GAP_FILL);
    }

    #[test]
    fn test_fill_tile_paints_one_cell() {
        let mut canvas = RgbImage::new(512, 512);

        fill_tile(&mut canvas, 0, 0, GAP_FILL);

        assert_eq!(*canvas.get_pixel(0, 0), GAP_FILL);
        assert_eq!(*canvas.get_pixel(255, 0), GAP_FILL);
        assert_eq!(*canvas.get_pixel(0, 255), GAP_FILL);
        assert_eq!(*canvas.get_pixel(255, 255), GAP_FILL);
        assert_eq!(*canvas.get_pixel(256, 0), Rgb([0, 0, 0]));
    }

    #[tokio::test]
    async fn test_assemble_reads_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let bbox = BoundingBox::new(47.0, 8.0, 47.0, 8.0).unwrap();
        let settings = MapSettings::new(TileSource::OpenStreetMap, 10, bbox);
        let map = TileMap::with_cache_root(settings, dir.path().to_path_buf()).unwrap();
        assert_eq!(map.tiles().len(), 1);

        let teal = Rgb([0, 128, 128]);
        let tile = &map.tiles()[0];
        std::fs::create_dir_all(tile.cache_file().parent().unwrap()).unwrap();
        std::fs::write(tile.cache_file(), encode_tile(256, 256, teal)).unwrap();

        let mosaic = assemble(&map, GapPolicy::default()).await.unwrap();

        assert_eq!((mosaic.width(), mosaic.height()), (256, 256));
        assert!(mosaic.gaps().is_empty());
        assert_eq!(*mosaic.image().get_pixel(128, 128), teal);
    }

    #[tokio::test]
    async fn test_assemble_missing_cache_file_records_gap() {
        let dir = tempfile::tempdir().unwrap();
        let bbox = BoundingBox::new(47.0, 8.0, 47.0, 8.0).unwrap();
        let settings = MapSettings::new(TileSource::OpenStreetMap, 10, bbox);
        let map = TileMap::with_cache_root(settings, dir.path().to_path_buf()).unwrap();

        let mosaic = assemble(&map, GapPolicy::default()).await.unwrap();
        assert_eq!(mosaic.gaps().len(), 1);
        assert_eq!(*mosaic.image().get_pixel(0, 0), GAP_FILL);

        let aborted = assemble(&map, GapPolicy::Abort).await;
        assert!(matches!(
            aborted,
            Err(AssemblyError::TileUnusable { .. })
        ));
    }

    #[test]
    fn test_mosaic_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let olive = Rgb([128, 128, 0]);
        let grid = TileGrid {
            x1: 0,
            y1: 0,
            x2: 1,
            y2: 1,
            zoom: 1,
        };
        let contents = vec![(
            TileCoord { x: 0, y: 0, zoom: 1 },
            Ok(encode_tile(256, 256, olive)),
        )];
        let mosaic = compose(grid, contents, GapPolicy::default()).unwrap();

        let path = dir.path().join("out.png");
        mosaic.save(&path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!((reloaded.width(), reloaded.height()), (256, 256));
        assert_eq!(*reloaded.get_pixel(10, 10), olive);
    }
}
