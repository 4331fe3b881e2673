//! Burn vector land-cover and cadastre polygons onto raster tile grids.
//!
//! The crate backs the `tileburn` binary and drives GDAL through the
//! [`gdal`] crate: vector files are read, filtered by creation date, labeled
//! with a [`Nomenclature`](labels::Nomenclature), reprojected to the CRS of
//! the tiles, clipped to every tile and rasterized into a single band `Byte`
//! GeoTIFF next to it.
//!
//! ## Use
//!
//! ```no_run
//! use std::path::PathBuf;
//! use tileburn::labels::Nomenclature;
//! use tileburn::pipeline::RasterizeJob;
//!
//! let mut job = RasterizeJob::new(
//!     vec![PathBuf::from("tiles/0_0.tif")],
//!     vec![PathBuf::from("buildings.shp")],
//!     Nomenclature::Cadastre,
//! );
//! job.end_date = Some("2015-06-30".parse().unwrap());
//! let summary = job.run().unwrap();
//! println!("{} rasters written", summary.written);
//! ```
//!
//! Vector files can be converted beforehand with [`convert::convert_all`].

pub mod burn;
pub mod clip;
pub mod config;
pub mod convert;
pub mod errors;
pub mod filter;
pub mod labels;
pub mod pipeline;
pub mod shapes;
pub mod tile;

#[cfg(test)]
mod test_utils;
