//! Labeled polygons read from vector files.
//!
//! Every vector file given on the command line becomes one [`ShapeLayer`]:
//! the features of its first layer that survive the date filter, each paired
//! with the label it burns, plus an R-tree over their envelopes so a tile only
//! intersects the shapes whose bounding box overlaps it.

use std::path::{Path, PathBuf};

use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::vector::{Geometry, LayerAccess};
use gdal::Dataset;
use gdal_sys::OGRwkbGeometryType;
use log::{debug, info, warn};
use rstar::{RTree, RTreeObject, AABB};

use crate::clip::Bounds;
use crate::errors::{Result, TileburnError};
use crate::filter::{EndDate, FilterStats};
use crate::labels::Nomenclature;

/// A polygon and the label burned for it.
#[derive(Clone)]
pub struct Shape {
    pub geometry: Geometry,
    pub label: u8,
    /// Id of the feature it was read from.
    pub fid: Option<u64>,
}

/// Polygons and multi polygons, with or without Z/M.
fn is_polygonal(geometry: &Geometry) -> bool {
    let flat = unsafe { gdal_sys::OGR_GT_Flatten(geometry.geometry_type()) };
    flat == OGRwkbGeometryType::wkbPolygon || flat == OGRwkbGeometryType::wkbMultiPolygon
}

#[derive(Clone)]
struct ShapeBox {
    idx: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for ShapeBox {
    type Envelope = AABB<[f64; 2]>;

    #[inline]
    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

#[derive(Clone)]
pub struct ShapeLayer {
    path: PathBuf,
    spatial_ref: Option<SpatialRef>,
    shapes: Vec<Shape>,
    bounds: Option<Bounds>,
    index: RTree<ShapeBox>,
    stats: FilterStats,
}

/// Short human readable name of a CRS, for log messages.
pub fn describe_crs(spatial_ref: &SpatialRef) -> String {
    spatial_ref
        .authority()
        .or_else(|_| spatial_ref.to_proj4())
        .unwrap_or_else(|_| "unknown CRS".to_string())
}

impl ShapeLayer {
    /// Reads the first layer of the vector file at `path`.
    ///
    /// Features created after `end_date` are dropped before labeling, and
    /// features without a polygonal geometry are ignored.
    pub fn read<P: AsRef<Path>>(
        path: P,
        nomenclature: Nomenclature,
        end_date: Option<EndDate>,
    ) -> Result<ShapeLayer> {
        let path = path.as_ref();
        let dataset = Dataset::open(path)?;
        if dataset.layer_count() == 0 {
            return Err(TileburnError::NoLayer(path.to_path_buf()));
        }
        let mut layer = dataset.layer(0)?;
        let spatial_ref = layer.spatial_ref();
        if let Some(attribute) = nomenclature.attribute() {
            debug!("Reading class codes of {} from '{}'", path.display(), attribute);
        }

        let mut shapes = Vec::new();
        let mut stats = FilterStats::default();
        for feature in layer.features() {
            stats.seen += 1;
            if let Some(end_date) = end_date {
                if !end_date.keeps_feature(&feature, path)? {
                    stats.dropped += 1;
                    continue;
                }
            }
            let Some(geometry) = feature.geometry().filter(|g| is_polygonal(g)) else {
                debug!(
                    "Feature {:?} of {} has no polygon, ignored",
                    feature.fid(),
                    path.display()
                );
                continue;
            };
            let label = nomenclature.label(&feature, path)?;
            shapes.push(Shape {
                geometry: geometry.clone(),
                label,
                fid: feature.fid(),
            });
        }

        if end_date.is_some() {
            info!(
                "Filtered {} features over {} in {}",
                stats.dropped,
                stats.seen,
                path.display()
            );
        }

        Ok(ShapeLayer::new(path.to_path_buf(), spatial_ref, shapes, stats))
    }

    fn new(
        path: PathBuf,
        spatial_ref: Option<SpatialRef>,
        shapes: Vec<Shape>,
        stats: FilterStats,
    ) -> ShapeLayer {
        let mut layer = ShapeLayer {
            path,
            spatial_ref,
            shapes,
            bounds: None,
            index: RTree::new(),
            stats,
        };
        layer.rebuild_index();
        layer
    }

    fn rebuild_index(&mut self) {
        let boxes: Vec<ShapeBox> = self
            .shapes
            .iter()
            .enumerate()
            .map(|(idx, shape)| ShapeBox {
                idx,
                env: Bounds::from_envelope(&shape.geometry.envelope()).to_aabb(),
            })
            .collect();
        self.bounds = boxes
            .iter()
            .map(|b| {
                let (lower, upper) = (b.env.lower(), b.env.upper());
                Bounds::new(lower[0], lower[1], upper[0], upper[1])
            })
            .reduce(|a, b| a.union(&b));
        self.index = RTree::bulk_load(boxes);
    }

    /// Transforms every shape into `target`.
    ///
    /// Returns whether a transformation happened. A layer without CRS is
    /// assumed to already be in `target`.
    pub fn reproject(&mut self, target: &SpatialRef) -> Result<bool> {
        let Some(source) = self.spatial_ref.clone() else {
            warn!(
                "{} has no CRS, assuming {}",
                self.path.display(),
                describe_crs(target)
            );
            self.spatial_ref = Some(target.clone());
            return Ok(false);
        };
        if &source == target {
            return Ok(false);
        }

        info!(
            "Reproject {} from {} to {}",
            self.path.display(),
            describe_crs(&source),
            describe_crs(target)
        );
        let transform = CoordTransform::new(&source, target)?;
        for shape in &mut self.shapes {
            shape.geometry = shape.geometry.transform(&transform)?;
        }
        self.spatial_ref = Some(target.clone());
        self.rebuild_index();
        Ok(true)
    }

    /// Shapes whose envelope intersects `bounds`.
    pub fn candidates(&self, bounds: &Bounds) -> Vec<&Shape> {
        let mut hits: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&bounds.to_aabb())
            .map(|b| b.idx)
            .collect();
        // keep file order so later features are burned over earlier ones
        hits.sort_unstable();
        hits.into_iter().map(|idx| &self.shapes[idx]).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spatial_ref(&self) -> Option<&SpatialRef> {
        self.spatial_ref.as_ref()
    }

    /// Extent of all shapes, `None` when the layer is empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }
}
