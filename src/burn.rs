use std::path::Path;

use gdal::raster::{rasterize, RasterizeOptions};
use gdal::vector::Geometry;
use gdal::DriverManager;
use log::debug;

use crate::clip::BurnShape;
use crate::errors::Result;
use crate::tile::Tile;

/// Driver of the burned rasters.
pub const OUTPUT_DRIVER: &str = "GTiff";

/// Options that specify how shapes are burned.
#[derive(Copy, Clone, Debug, Default)]
pub struct BurnOptions {
    /// Set to `true` to set all pixels touched by a polygon, not just those
    /// whose center is within it. Defaults to `false`.
    pub all_touched: bool,
}

/// Write a single band `Byte` raster aligned on `tile` with every shape burned
/// with its label. Pixels not covered by any shape are 0.
///
/// Shapes are burned in order, so later shapes win where they overlap.
pub fn burn(
    shapes: Vec<BurnShape>,
    tile: &Tile,
    destination: &Path,
    options: BurnOptions,
) -> Result<()> {
    let driver = DriverManager::get_driver_by_name(OUTPUT_DRIVER)?;
    let (width, height) = tile.size();

    let mut dataset = driver.create_with_band_type::<u8, _>(destination, width, height, 1)?;
    dataset.set_geo_transform(tile.geo_transform())?;
    dataset.set_spatial_ref(tile.spatial_ref())?;

    let (geometries, burn_values): (Vec<Geometry>, Vec<f64>) = shapes
        .into_iter()
        .map(|shape| (shape.geometry, f64::from(shape.label)))
        .unzip();
    debug!(
        "Burning {} shapes into {}",
        geometries.len(),
        destination.display()
    );

    let options = RasterizeOptions {
        all_touched: options.all_touched,
        ..Default::default()
    };
    rasterize(&mut dataset, &[1], &geometries, &burn_values, Some(options))?;
    Ok(())
}
