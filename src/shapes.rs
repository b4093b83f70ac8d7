use geo::{Coord, LineString, Polygon, Rect};

/// Build a polygon from an ordered point list.
///
/// Two points are always read as opposite corners of an axis-aligned
/// rectangle, whatever the annotation's `shape_type` says. Three or more
/// points form a polygon in the given vertex order; self-intersections
/// are left for [`crate::repair`] to fix. Fewer than two points yield `None`.
pub fn build_polygon(points: &[Coord<f64>]) -> Option<Polygon<f64>> {
    match points {
        [] | [_] => None,
        [a, b] => Some(Rect::new(*a, *b).to_polygon()),
        _ => Some(Polygon::new(LineString::from(points.to_vec()), vec![])),
    }
}
