//! Clipping of vector shapes to the extent of a raster tile.

use std::path::Path;

use gdal::vector::{Envelope, Geometry, ToGdal};
use geo_types::{coord, Rect};
use log::debug;
use rstar::AABB;

use crate::errors::{Result, TileburnError};
use crate::shapes::{Shape, ShapeLayer};
use crate::tile::Tile;

/// An axis aligned rectangle in some CRS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds(Rect<f64>);

impl Bounds {
    /// Corners may be given in any order.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Bounds(Rect::new(coord! { x: xmin, y: ymin }, coord! { x: xmax, y: ymax }))
    }

    pub fn from_envelope(envelope: &Envelope) -> Self {
        Bounds::new(envelope.MinX, envelope.MinY, envelope.MaxX, envelope.MaxY)
    }

    pub fn xmin(&self) -> f64 {
        self.0.min().x
    }

    pub fn ymin(&self) -> f64 {
        self.0.min().y
    }

    pub fn xmax(&self) -> f64 {
        self.0.max().x
    }

    pub fn ymax(&self) -> f64 {
        self.0.max().y
    }

    /// Closed intersection test: rectangles sharing an edge intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.xmin() <= other.xmax()
            && other.xmin() <= self.xmax()
            && self.ymin() <= other.ymax()
            && other.ymin() <= self.ymax()
    }

    /// Smallest bounds covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.xmin().min(other.xmin()),
            self.ymin().min(other.ymin()),
            self.xmax().max(other.xmax()),
            self.ymax().max(other.ymax()),
        )
    }

    pub fn to_aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.xmin(), self.ymin()], [self.xmax(), self.ymax()])
    }

    /// The rectangle as an OGR polygon.
    pub fn to_polygon(&self) -> Result<Geometry> {
        Ok(self.0.to_polygon().to_gdal()?)
    }
}

/// A clipped geometry and the label to burn for it.
pub struct BurnShape {
    pub geometry: Geometry,
    pub label: u8,
}

/// Turns the intersection of `shape` with a tile into something to burn.
///
/// OGR returns no geometry at all when the intersection fails, an empty one
/// when the shape merely lies outside.
fn keep_piece(piece: Option<Geometry>, shape: &Shape, path: &Path) -> Result<Option<BurnShape>> {
    let piece = piece.ok_or_else(|| TileburnError::Intersection {
        path: path.to_path_buf(),
        fid: shape.fid,
    })?;
    if piece.area() <= 0.0 {
        return Ok(None);
    }
    Ok(Some(BurnShape {
        geometry: piece,
        label: shape.label,
    }))
}

/// Clip every layer to `tile`, keeping pieces with a positive area.
///
/// Layers must already be expressed in the CRS of the tile.
pub fn clip_to_tile(layers: &[ShapeLayer], tile: &Tile) -> Result<Vec<BurnShape>> {
    let bounds = tile.bounds();
    let window = bounds.to_polygon()?;
    let mut clipped = Vec::new();

    for layer in layers {
        match layer.bounds() {
            Some(extent) if extent.intersects(&bounds) => {}
            _ => {
                debug!(
                    "{} does not overlap {}",
                    layer.path().display(),
                    tile.path().display()
                );
                continue;
            }
        }

        let before = clipped.len();
        for shape in layer.candidates(&bounds) {
            let piece = shape.geometry.intersection(&window);
            if let Some(burn_shape) = keep_piece(piece, shape, layer.path())? {
                clipped.push(burn_shape);
            }
        }
        debug!(
            "{} shapes of {} clipped to {}",
            clipped.len() - before,
            layer.path().display(),
            tile.path().display()
        );
    }

    Ok(clipped)
}
