use geo::{BooleanOps, MultiPolygon};
use log::debug;

use crate::dissolve::union_all;
use crate::repair::{is_empty, make_valid};
use crate::types::{LabeledGeometry, Tile};

/// Tag tile area left uncovered by the resolved labels.
///
/// Only tiles that share area with `annotated` (the union of every label
/// before priority resolution) are considered; tiles without any
/// annotation add nothing, including neighbours that merely touch an
/// annotation along an edge. Each fill is claimed before the next tile is
/// processed, so overlapping tiles never yield overlapping fills.
pub fn fill_uncovered(
    resolved: &[LabeledGeometry],
    tiles: &[Tile],
    annotated: &MultiPolygon<f64>,
    unlabeled_label: &str,
) -> Vec<LabeledGeometry> {
    let claimed = union_all(resolved.iter().map(|r| &r.geometry));

    let (_, fills) = tiles.iter().fold(
        (claimed, Vec::new()),
        |(claimed, mut fills), tile| {
            if is_empty(&tile.geometry.intersection(annotated)) {
                debug!("Tile {} has no annotations, not filling it", tile.id);
                return (claimed, fills);
            }

            let leftover = make_valid(tile.geometry.difference(&claimed));
            if is_empty(&leftover) {
                return (claimed, fills);
            }

            let claimed = make_valid(claimed.union(&leftover));
            fills.push(LabeledGeometry::new(unlabeled_label, leftover));
            (claimed, fills)
        },
    );

    fills
}
