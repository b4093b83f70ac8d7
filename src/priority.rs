//! Priority-ordered overlap removal
//!
//! Labels are visited from highest to lowest rank while carrying the union
//! of everything already claimed. Each label keeps only what is left after
//! subtracting that union, so on overlap the higher-ranked label always
//! wins and the output never overlaps itself.

use geo::{BooleanOps, MultiPolygon};
use log::{debug, warn};
use std::collections::HashSet;

use crate::error::{GeoLabelError, Result};
use crate::repair::{is_empty, make_valid};
use crate::types::LabeledGeometry;

/// Ranked list of label names, highest priority first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPriority {
    ranked: Vec<String>,
}

impl LabelPriority {
    /// Fails on a repeated label, since ranks must be distinct
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ranked = Vec::new();
        for label in labels {
            let label = label.into();
            let label = label.trim().to_string();
            if label.is_empty() {
                continue;
            }
            if !seen.insert(label.clone()) {
                return Err(GeoLabelError::DuplicatePriority(label));
            }
            ranked.push(label);
        }
        Ok(Self { ranked })
    }

    /// Zero is the highest rank; `None` for labels not in the list
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.ranked.iter().position(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.ranked
    }

    /// Sort geometries highest priority first.
    ///
    /// Unlisted labels go after every listed one, in lexical order.
    pub fn order(&self, mut geometries: Vec<LabeledGeometry>) -> Vec<LabeledGeometry> {
        for geometry in &geometries {
            if self.rank(&geometry.label).is_none() {
                warn!(
                    "Label '{}' has no priority; ranking it below all listed labels",
                    geometry.label
                );
            }
        }
        geometries.sort_by(|a, b| {
            let ka = (self.rank(&a.label).unwrap_or(usize::MAX), &a.label);
            let kb = (self.rank(&b.label).unwrap_or(usize::MAX), &b.label);
            ka.cmp(&kb)
        });
        geometries
    }
}

/// Remove overlaps so that higher-priority labels win.
///
/// The first label is accepted unmodified. Labels left with no area are dropped.
pub fn resolve_priority(
    geometries: Vec<LabeledGeometry>,
    priority: &LabelPriority,
) -> Vec<LabeledGeometry> {
    let ordered = priority.order(geometries);

    let (_, resolved) = ordered.into_iter().fold(
        (MultiPolygon::new(vec![]), Vec::new()),
        |(claimed, mut accepted), candidate| {
            let remaining = if claimed.0.is_empty() {
                candidate.geometry
            } else {
                make_valid(candidate.geometry.difference(&claimed))
            };

            if is_empty(&remaining) {
                debug!(
                    "Label '{}' is fully covered by higher-priority labels",
                    candidate.label
                );
                return (claimed, accepted);
            }

            let claimed = make_valid(claimed.union(&remaining));
            accepted.push(LabeledGeometry::new(candidate.label, remaining));
            (claimed, accepted)
        },
    );

    resolved
}
