#![allow(dead_code)]

use std::path::Path;

use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use serde_json::{json, Value};

pub const UTM_31N: u32 = 32631;

/// Upper left corner of the 100 m tile used by most scenarios.
pub const ORIGIN: (f64, f64) = (500_000.0, 5_000_100.0);

/// 10 x 10 tile of 10 m pixels in UTM 31N.
pub fn write_tile(path: &Path, origin: (f64, f64)) {
    write_tile_in(path, UTM_31N, origin);
}

/// 10 x 10 tile of 10 m pixels in the CRS `epsg`.
pub fn write_tile_in(path: &Path, epsg: u32, origin: (f64, f64)) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<u8, _>(path, 10, 10, 3)
        .unwrap();
    dataset
        .set_geo_transform(&[origin.0, 10.0, 0.0, origin.1, 0.0, -10.0])
        .unwrap();
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(epsg).unwrap())
        .unwrap();
}

pub fn write_geojson(path: &Path, epsg: Option<u32>, features: Vec<Value>) {
    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(epsg) = epsg {
        collection["crs"] = json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{epsg}") }
        });
    }
    std::fs::write(path, collection.to_string()).unwrap();
}

/// Axis aligned rectangle feature.
pub fn rect(xmin: f64, ymin: f64, xmax: f64, ymax: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [xmin, ymin],
                [xmax, ymin],
                [xmax, ymax],
                [xmin, ymax],
                [xmin, ymin]
            ]]
        }
    })
}

pub fn read_labels(path: &Path) -> Vec<u8> {
    let dataset = Dataset::open(path).unwrap();
    let band = dataset.rasterband(1).unwrap();
    band.read_band_as::<u8>().unwrap().data().to_vec()
}

/// Labels of a 10 x 10 raster where the `rows x cols` upper left block is
/// `label` and everything else 0.
pub fn block(rows: usize, cols: usize, label: u8) -> Vec<u8> {
    (0..100)
        .map(|i| if i / 10 < rows && i % 10 < cols { label } else { 0 })
        .collect()
}
