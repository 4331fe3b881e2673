//! Raster tiles of the image mosaic.

use std::path::{Path, PathBuf};

use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, GeoTransform, GeoTransformEx};

use crate::clip::Bounds;
use crate::errors::{Result, TileburnError};
use crate::labels::Nomenclature;

/// Georeferencing of one raster tile.
pub struct Tile {
    path: PathBuf,
    size: (usize, usize),
    geo_transform: GeoTransform,
    spatial_ref: SpatialRef,
}

impl Tile {
    /// Reads size, transform and CRS of the raster at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Tile> {
        let path = path.as_ref();
        let dataset = Dataset::open(path)?;
        Tile::from_dataset(path, &dataset)
    }

    pub fn from_dataset(path: &Path, dataset: &Dataset) -> Result<Tile> {
        let invalid = |reason: &str| TileburnError::InvalidTile {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        let size = dataset.raster_size();
        if size.0 == 0 || size.1 == 0 {
            return Err(invalid("raster has no pixels"));
        }
        let geo_transform = dataset
            .geo_transform()
            .map_err(|_| invalid("raster has no geo transform"))?;
        let spatial_ref = dataset
            .spatial_ref()
            .map_err(|_| invalid("raster has no spatial reference"))?;
        Ok(Tile {
            path: path.to_path_buf(),
            size,
            geo_transform,
            spatial_ref,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn geo_transform(&self) -> &GeoTransform {
        &self.geo_transform
    }

    pub fn spatial_ref(&self) -> &SpatialRef {
        &self.spatial_ref
    }

    /// Extent covered by the tile in its own CRS.
    pub fn bounds(&self) -> Bounds {
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);
        let corners = [
            self.geo_transform.apply(0.0, 0.0),
            self.geo_transform.apply(w, 0.0),
            self.geo_transform.apply(0.0, h),
            self.geo_transform.apply(w, h),
        ];
        let (xs, ys): (Vec<f64>, Vec<f64>) = corners.into_iter().unzip();
        let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
        let max = |v: &[f64]| v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Bounds::new(min(&xs), min(&ys), max(&xs), max(&ys))
    }

    /// Where the burned raster of this tile is written.
    pub fn destination(&self, nomenclature: Nomenclature) -> PathBuf {
        destination_path(&self.path, nomenclature)
    }
}

/// `<dir>/<stem>_<dataset>.tif` for a tile at `<dir>/<stem>.<ext>`.
pub fn destination_path(tile: &Path, nomenclature: Nomenclature) -> PathBuf {
    let stem = tile
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    tile.with_file_name(format!("{}_{}.tif", stem, nomenclature.suffix()))
}
