//! LabelMe to georeferenced label map converter
//!
//! This library turns pixel-space LabelMe annotations drawn on georeferenced
//! image tiles into geographic polygons, merges them into one
//! non-overlapping label map per site, and writes the result as an ESRI
//! Shapefile or GeoJSON.
//! It also carries the two housekeeping tools used around the labeling
//! work: stripping embedded images from annotation files and sorting
//! annotation/image pairs by flag.

pub mod config;
pub mod coverage;
pub mod dissolve;
pub mod error;
pub mod export;
pub mod mapping;
pub mod organize;
pub mod pipeline;
pub mod priority;
pub mod repair;
pub mod shapes;
pub mod strip;
pub mod tiles;
pub mod types;
pub mod utils;
pub mod vector;

// Re-export commonly used types and functions
pub use config::{Args, PipelineConfig, SortArgs, StripArgs};
pub use error::{GeoLabelError, Result};
pub use pipeline::{merge_labels, run, LabelMap, PipelineReport};
pub use priority::{resolve_priority, LabelPriority};
pub use types::{ImageAnnotation, LabeledGeometry, LabeledPolygon, Shape, Tile};
pub use vector::{SpatialRef, VectorFormat};

// Housekeeping exports
pub use organize::organize_by_flags;
pub use strip::strip_image_data;
