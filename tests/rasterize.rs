mod common;

use std::path::PathBuf;

use gdal::spatial_ref::{CoordTransform, SpatialRef};
use serde_json::json;
use tempfile::TempDir;
use tileburn::convert::{convert_one, ConversionStatus, ConvertOptions};
use tileburn::errors::TileburnError;
use tileburn::labels::Nomenclature;
use tileburn::pipeline::{RasterizeJob, RasterizeSummary};

use common::{
    block, read_labels, rect, write_geojson, write_tile, write_tile_in, ORIGIN, UTM_31N,
};

const UTM_32N: u32 = 32632;

/// A tile and a vector file of buildings in a scratch directory.
struct Scene {
    dir: TempDir,
    tile: PathBuf,
    buildings: PathBuf,
}

impl Scene {
    fn new(epsg: Option<u32>, features: Vec<serde_json::Value>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tile = dir.path().join("0_0.tif");
        write_tile(&tile, ORIGIN);
        let buildings = dir.path().join("buildings.geojson");
        write_geojson(&buildings, epsg, features);
        Scene {
            dir,
            tile,
            buildings,
        }
    }

    fn job(&self, nomenclature: Nomenclature) -> RasterizeJob {
        RasterizeJob::new(
            vec![self.tile.clone()],
            vec![self.buildings.clone()],
            nomenclature,
        )
    }

    fn output(&self, suffix: &str) -> PathBuf {
        self.dir.path().join(format!("0_0_{suffix}.tif"))
    }
}

/// Covers the upper left 5 x 5 pixels of the tile once clipped.
fn upper_left(properties: serde_json::Value) -> serde_json::Value {
    rect(499_990.0, 5_000_050.0, 500_050.0, 5_000_110.0, properties)
}

fn lower_right(properties: serde_json::Value) -> serde_json::Value {
    rect(500_050.0, 5_000_000.0, 500_100.0, 5_000_050.0, properties)
}

#[test]
fn test_cadastre_with_end_date() {
    let scene = Scene::new(
        Some(UTM_31N),
        vec![
            upper_left(json!({ "created": "2012-04-01" })),
            lower_right(json!({ "created": "2016-01-01" })),
        ],
    );
    let mut job = scene.job(Nomenclature::Cadastre);
    job.end_date = Some("2015-06-30".parse().unwrap());

    let summary = job.run().unwrap();
    assert_eq!(
        summary,
        RasterizeSummary {
            written: 1,
            ..Default::default()
        }
    );
    assert_eq!(read_labels(&scene.output("cadastre")), block(5, 5, 255));
}

#[test]
fn test_ua2012_labels() {
    let scene = Scene::new(
        Some(UTM_31N),
        vec![upper_left(json!({ "CODE2012": "12100" }))],
    );
    scene.job(Nomenclature::Ua2012).run().unwrap();
    assert_eq!(read_labels(&scene.output("UA2012")), block(5, 5, 7));
}

#[test]
fn test_tile_without_overlap_writes_nothing() {
    let scene = Scene::new(
        Some(UTM_31N),
        vec![upper_left(json!({ "created": "2012-04-01" }))],
    );
    let far = scene.dir.path().join("far.tif");
    write_tile(&far, (600_000.0, 5_000_100.0));

    let mut job = scene.job(Nomenclature::Cadastre);
    job.tiles.push(far);
    let summary = job.run().unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.empty, 1);
    assert!(scene.output("cadastre").exists());
    assert!(!scene.dir.path().join("far_cadastre.tif").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let scene = Scene::new(Some(UTM_31N), vec![upper_left(json!({}))]);
    let mut job = scene.job(Nomenclature::Cadastre);
    job.dry_run = true;

    let summary = job.run().unwrap();
    assert_eq!(summary.planned, 1);
    assert_eq!(summary.written, 0);
    assert!(!scene.output("cadastre").exists());
}

#[test]
fn test_skip_existing_output() {
    let scene = Scene::new(Some(UTM_31N), vec![upper_left(json!({}))]);
    let output = scene.output("cadastre");
    std::fs::write(&output, b"keep me").unwrap();

    let mut job = scene.job(Nomenclature::Cadastre);
    job.skip_existing = true;
    let summary = job.run().unwrap();
    assert_eq!(summary.skipped_existing, 1);
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

#[test]
fn test_vectors_are_reprojected() {
    // WGS 84 rectangle around the central meridian of UTM zone 31
    let scene = Scene::new(None, vec![rect(2.9, 44.9, 3.1, 45.4, json!({}))]);
    scene.job(Nomenclature::Cadastre).run().unwrap();
    assert_eq!(read_labels(&scene.output("cadastre")), vec![255; 100]);
}

#[test]
fn test_missing_creation_date() {
    let scene = Scene::new(Some(UTM_31N), vec![upper_left(json!({ "height": 12 }))]);
    let mut job = scene.job(Nomenclature::Cadastre);
    job.end_date = Some("2015-06-30".parse().unwrap());

    let result = job.run();
    assert!(matches!(
        result,
        Err(TileburnError::MissingAttribute {
            attribute: "created",
            ..
        })
    ));
    assert!(!scene.output("cadastre").exists());
}

#[test]
fn test_tiles_in_several_crs() {
    // 2 km around the tile, so that the same ground in UTM 32N is covered too
    let scene = Scene::new(
        Some(UTM_31N),
        vec![rect(499_000.0, 4_999_000.0, 501_000.0, 5_001_000.0, json!({}))],
    );

    let to_32n = CoordTransform::new(
        &SpatialRef::from_epsg(UTM_31N).unwrap(),
        &SpatialRef::from_epsg(UTM_32N).unwrap(),
    )
    .unwrap();
    let (mut x, mut y, mut z) = ([ORIGIN.0], [ORIGIN.1], [0.0]);
    to_32n.transform_coords(&mut x, &mut y, &mut z).unwrap();
    let east = scene.dir.path().join("east.tif");
    write_tile_in(&east, UTM_32N, (x[0], y[0]));

    // back in the CRS of the first tile, half of it outside the shapes
    let again = scene.dir.path().join("again.tif");
    write_tile(&again, (500_950.0, 5_000_100.0));

    let mut job = scene.job(Nomenclature::Cadastre);
    job.tiles.push(east);
    job.tiles.push(again);
    let summary = job.run().unwrap();
    assert_eq!(summary.written, 3);

    assert_eq!(read_labels(&scene.output("cadastre")), vec![255; 100]);
    assert_eq!(
        read_labels(&scene.dir.path().join("east_cadastre.tif")),
        vec![255; 100]
    );
    assert_eq!(
        read_labels(&scene.dir.path().join("again_cadastre.tif")),
        block(10, 5, 255)
    );
}

#[test]
fn test_vector_without_crs_is_in_tile_crs() {
    let scene = Scene::new(Some(UTM_31N), vec![upper_left(json!({}))]);
    let conversion = convert_one(&scene.buildings, &ConvertOptions::default());
    assert!(matches!(conversion.status, ConversionStatus::Converted));
    std::fs::remove_file(conversion.output.with_extension("prj")).unwrap();

    let job = RasterizeJob::new(
        vec![scene.tile.clone()],
        vec![conversion.output],
        Nomenclature::Cadastre,
    );
    assert_eq!(job.run().unwrap().written, 1);
    assert_eq!(read_labels(&scene.output("cadastre")), block(5, 5, 255));
}
