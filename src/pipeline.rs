//! The `rasterize` command: burn labeled vector files onto every raster tile.

use std::path::PathBuf;

use gdal::spatial_ref::SpatialRef;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::burn::{burn, BurnOptions};
use crate::clip::clip_to_tile;
use crate::errors::Result;
use crate::filter::EndDate;
use crate::labels::Nomenclature;
use crate::shapes::{describe_crs, ShapeLayer};
use crate::tile::Tile;

/// Everything one `rasterize` run needs.
#[derive(Clone, Debug)]
pub struct RasterizeJob {
    pub tiles: Vec<PathBuf>,
    pub shapefiles: Vec<PathBuf>,
    pub nomenclature: Nomenclature,
    pub end_date: Option<EndDate>,
    /// Read and clip, but write nothing.
    pub dry_run: bool,
    /// Keep tiles whose output already exists.
    pub skip_existing: bool,
    pub all_touched: bool,
    pub show_progress: bool,
}

/// What happened to the tiles of a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterizeSummary {
    /// Rasters written.
    pub written: usize,
    /// Rasters a dry run would have written.
    pub planned: usize,
    pub skipped_existing: usize,
    /// Tiles no shape intersects.
    pub empty: usize,
}

fn progress_bar(len: usize, message: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_message(message);
    pb
}

fn reproject_all(layers: &mut [ShapeLayer], target: &SpatialRef) -> Result<()> {
    for layer in layers {
        layer.reproject(target)?;
    }
    Ok(())
}

impl RasterizeJob {
    pub fn new(tiles: Vec<PathBuf>, shapefiles: Vec<PathBuf>, nomenclature: Nomenclature) -> Self {
        RasterizeJob {
            tiles,
            shapefiles,
            nomenclature,
            end_date: None,
            dry_run: false,
            skip_existing: false,
            all_touched: false,
            show_progress: false,
        }
    }

    /// Reads every vector file once, then burns them onto each tile in turn.
    pub fn run(&self) -> Result<RasterizeSummary> {
        self.nomenclature.ensure_supported()?;
        let mut summary = RasterizeSummary::default();
        let Some(first_tile) = self.tiles.first() else {
            warn!("No raster tile given, nothing to do");
            return Ok(summary);
        };

        if let Some(end_date) = self.end_date {
            info!("Removing objects created after {}", end_date);
        }

        let pb = progress_bar(self.shapefiles.len(), "Reading vectors", self.show_progress);
        let mut layers = Vec::with_capacity(self.shapefiles.len());
        for path in &self.shapefiles {
            layers.push(pb.suspend(|| {
                ShapeLayer::read(path, self.nomenclature, self.end_date)
            })?);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let crs = Tile::open(first_tile)?.spatial_ref().clone();
        reproject_all(&mut layers, &crs)?;
        // copies of `layers` for tiles in other CRSs
        let mut reprojected: Vec<(SpatialRef, Vec<ShapeLayer>)> = Vec::new();

        info!("Start processing.");
        if self.dry_run {
            warn!("DRY RUN --- NOTHING WILL BE WRITTEN !");
        }
        let options = BurnOptions {
            all_touched: self.all_touched,
        };

        let pb = progress_bar(self.tiles.len(), "Burning tiles", self.show_progress);
        for path in &self.tiles {
            pb.inc(1);
            let tile = Tile::open(path)?;
            let destination = tile.destination(self.nomenclature);
            if self.skip_existing && destination.exists() {
                pb.suspend(|| info!("Skipping existing {}", destination.display()));
                summary.skipped_existing += 1;
                continue;
            }

            let tile_layers = if tile.spatial_ref() == &crs {
                &layers
            } else {
                let known = reprojected
                    .iter()
                    .position(|(srs, _)| srs == tile.spatial_ref());
                let idx = match known {
                    Some(idx) => idx,
                    None => {
                        pb.suspend(|| {
                            info!("Unknown new CRS: {}", describe_crs(tile.spatial_ref()))
                        });
                        let mut copies = layers.clone();
                        pb.suspend(|| reproject_all(&mut copies, tile.spatial_ref()))?;
                        reprojected.push((tile.spatial_ref().clone(), copies));
                        reprojected.len() - 1
                    }
                };
                &reprojected[idx].1
            };

            let shapes = clip_to_tile(tile_layers, &tile)?;
            if shapes.is_empty() {
                pb.suspend(|| {
                    info!(
                        "Skipping: raster does not intersect with shapefile ({})",
                        path.display()
                    )
                });
                summary.empty += 1;
                continue;
            }

            if self.dry_run {
                pb.suspend(|| {
                    info!(
                        "Would burn {} shapes into {}",
                        shapes.len(),
                        destination.display()
                    )
                });
                summary.planned += 1;
                continue;
            }
            burn(shapes, &tile, &destination, options)?;
            pb.suspend(|| info!("Wrote {}", destination.display()));
            summary.written += 1;
        }
        pb.finish_and_clear();

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TileburnError;

    #[test]
    fn test_ua2006_is_rejected_before_reading() {
        let job = RasterizeJob::new(
            vec![PathBuf::from("does/not/exist.tif")],
            vec![PathBuf::from("does/not/exist.shp")],
            Nomenclature::Ua2006,
        );
        assert!(matches!(
            job.run(),
            Err(TileburnError::UnsupportedDataset(_))
        ));
    }

    #[test]
    fn test_no_tiles() {
        let job = RasterizeJob::new(vec![], vec![], Nomenclature::Cadastre);
        assert_eq!(job.run().unwrap(), RasterizeSummary::default());
    }
}
