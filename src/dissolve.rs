use geo::{BooleanOps, MultiPolygon};
use std::collections::BTreeMap;

use crate::repair::make_valid;
use crate::types::{LabeledGeometry, LabeledPolygon};

/// Union a set of geometries, repairing after every step
pub fn union_all<'a, I>(geometries: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    geometries
        .into_iter()
        .fold(MultiPolygon::new(vec![]), |acc, geometry| {
            make_valid(acc.union(geometry))
        })
}

/// Merge every polygon sharing a label into one record per label, in label order
pub fn dissolve_by_label(shapes: &[LabeledPolygon]) -> Vec<LabeledGeometry> {
    let mut groups: BTreeMap<&str, MultiPolygon<f64>> = BTreeMap::new();
    for shape in shapes {
        let merged = groups
            .entry(shape.label.as_str())
            .or_insert_with(|| MultiPolygon::new(vec![]));
        *merged = make_valid(merged.union(&shape.polygon));
    }

    groups
        .into_iter()
        .map(|(label, geometry)| LabeledGeometry::new(label, geometry))
        .collect()
}
