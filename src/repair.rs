//! Validity check and repair for polygonal geometry
//!
//! Boolean operations in `geo` re-node their input, so running a ring
//! through a union with nothing yields a valid, non-self-intersecting
//! area. Invalid polygons are rebuilt ring by ring from that primitive.

use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon, Validation};
use log::debug;

fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![])
}

fn renode_ring(ring: &LineString<f64>) -> MultiPolygon<f64> {
    empty().union(&Polygon::new(ring.clone(), vec![]))
}

fn rebuild_polygon(polygon: &Polygon<f64>) -> MultiPolygon<f64> {
    let shell = renode_ring(polygon.exterior());
    polygon
        .interiors()
        .iter()
        .fold(shell, |acc, hole| acc.difference(&renode_ring(hole)))
}

fn drop_degenerate(geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .into_iter()
            .filter(|part| part.unsigned_area() > 0.0)
            .collect(),
    )
}

/// Return `geometry` unchanged when valid, otherwise its repaired form
pub fn make_valid(geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    if geometry.is_valid() {
        return geometry;
    }
    debug!(
        "Repairing invalid geometry with {} part(s)",
        geometry.0.len()
    );
    let rebuilt = geometry
        .iter()
        .map(rebuild_polygon)
        .fold(empty(), |acc, part| acc.union(&part));
    drop_degenerate(rebuilt)
}

/// Repair a single polygon into a (possibly multi-part) valid geometry
pub fn make_valid_polygon(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    make_valid(MultiPolygon::new(vec![polygon]))
}

/// True when nothing with positive area is left
pub fn is_empty(geometry: &MultiPolygon<f64>) -> bool {
    geometry.0.is_empty() || geometry.unsigned_area() <= 0.0
}
