//! Pixel to geographic coordinate mapping
//!
//! Pixel space has its origin at the top-left corner of the image with y
//! growing downwards; geographic space has y growing upwards. The mapping
//! is a pure affine transform fixed by the tile's bounding rectangle and
//! the image's pixel size.

use geo::{Coord, Rect};

/// Affine transform from image pixels to the tile's geographic bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelToGeo {
    bounds: Rect<f64>,
    width: f64,
    height: f64,
}

impl PixelToGeo {
    /// Returns `None` when either pixel dimension is zero
    pub fn new(bounds: Rect<f64>, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            bounds,
            width: width as f64,
            height: height as f64,
        })
    }

    /// Map one pixel coordinate.
    ///
    /// Written as an interpolation between the bounds so that the image
    /// corners land exactly on the tile corners.
    pub fn apply(&self, x: f64, y: f64) -> Coord<f64> {
        let min = self.bounds.min();
        let max = self.bounds.max();
        let tx = x / self.width;
        let ty = y / self.height;
        Coord {
            x: min.x * (1.0 - tx) + max.x * tx,
            y: max.y * (1.0 - ty) + min.y * ty,
        }
    }

    pub fn map_points(&self, points: &[(f64, f64)]) -> Vec<Coord<f64>> {
        points.iter().map(|&(x, y)| self.apply(x, y)).collect()
    }
}

/// Map pixel points into the given bounds, or `None` when dimensions are unusable
pub fn transform_points(
    points: &[(f64, f64)],
    bounds: Rect<f64>,
    width: u32,
    height: u32,
) -> Option<Vec<Coord<f64>>> {
    PixelToGeo::new(bounds, width, height).map(|t| t.map_points(points))
}
