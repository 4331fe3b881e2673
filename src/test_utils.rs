use std::ffi::c_void;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use serde_json::{json, Value};

/// EPSG code of WGS 84 / UTM zone 31N, the CRS of the generated tiles.
pub(crate) const UTM_31N: u32 = 32631;

/// A struct that contains a temporary directory and a path to a file in that directory.
pub(crate) struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

impl TempFixture {
    /// Creates a temporary directory and path to a non-existent file with given `name`.
    ///
    /// Siblings of the file can be created with [`Path::with_file_name`], they are
    /// removed together with the directory on `drop`.
    pub(crate) fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.temp_path
    }
}

impl AsRef<Path> for TempFixture {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Scoped value for temporarily suppressing thread-local GDAL log messages.
///
/// Useful for tests that expect GDAL errors and want to keep the output log clean
/// of distracting yet expected error messages.
pub(crate) struct SuppressGdalErrorLog {
    // Make !Sync and !Send, and force use of `new`.
    _private: PhantomData<*mut c_void>,
}

impl SuppressGdalErrorLog {
    pub(crate) fn new() -> Self {
        unsafe { gdal_sys::CPLPushErrorHandler(Some(gdal_sys::CPLQuietErrorHandler)) };
        SuppressGdalErrorLog {
            _private: PhantomData,
        }
    }
}

impl Drop for SuppressGdalErrorLog {
    fn drop(&mut self) {
        unsafe { gdal_sys::CPLPopErrorHandler() };
    }
}

/// Writes a 3 band north-up GTiff in [`UTM_31N`] with its upper left corner
/// at `origin` and square pixels of `pixel_size`.
pub(crate) fn write_tile(path: &Path, origin: (f64, f64), pixel_size: f64, size: (usize, usize)) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<u8, _>(path, size.0, size.1, 3)
        .unwrap();
    dataset
        .set_geo_transform(&[origin.0, pixel_size, 0.0, origin.1, 0.0, -pixel_size])
        .unwrap();
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(UTM_31N).unwrap())
        .unwrap();
}

/// Writes a GeoJSON feature collection, declaring `epsg` as its CRS when given.
pub(crate) fn write_geojson(path: &Path, epsg: Option<u32>, features: Vec<Value>) {
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

/// A square polygon feature with its lower left corner at `(x, y)`.
pub(crate) fn square(x: f64, y: f64, size: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [x, y],
                [x + size, y],
                [x + size, y + size],
                [x, y + size],
                [x, y]
            ]]
        }
    })
}

/// All pixels of the first band, row by row.
pub(crate) fn read_labels(path: &Path) -> Vec<u8> {
    let dataset = Dataset::open(path).unwrap();
    let band = dataset.rasterband(1).unwrap();
    band.read_band_as::<u8>().unwrap().data().to_vec()
}
