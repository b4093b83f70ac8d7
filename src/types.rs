use geo::{MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Supported image formats, in lookup order
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

// Label given to shapes whose annotation has no label at all
pub const DEFAULT_SHAPE_LABEL: &str = "No label";

fn default_shape_label() -> String {
    DEFAULT_SHAPE_LABEL.to_string()
}

// The Shape struct representing annotated shapes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shape {
    #[serde(default = "default_shape_label")]
    pub label: String,
    #[serde(default)]
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// The ImageAnnotation struct representing the annotation information of an image.
// Everything is optional so that partially filled files can still be inspected.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub flags: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_height: Option<u32>,
    #[serde(default)]
    pub image_width: Option<u32>,
}

impl ImageAnnotation {
    /// Pixel dimensions, when both are present and non-zero
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.image_width, self.image_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

/// A georeferenced image tile
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    pub bounds: Rect<f64>,
}

/// A single converted annotation shape, before any merging
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPolygon {
    pub label: String,
    pub polygon: Polygon<f64>,
}

/// A label and its (possibly multi-part) geometry
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGeometry {
    pub label: String,
    pub geometry: MultiPolygon<f64>,
}

impl LabeledGeometry {
    pub fn new(label: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            label: label.into(),
            geometry,
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub total_files_processed: usize,
    pub converted_files: usize,
    pub skipped_no_tile: usize,
    pub skipped_missing_dimensions: usize,
    pub failed_to_parse: usize,
    pub shapes_converted: usize,
    pub shapes_skipped: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.total_files_processed += other.total_files_processed;
        self.converted_files += other.converted_files;
        self.skipped_no_tile += other.skipped_no_tile;
        self.skipped_missing_dimensions += other.skipped_missing_dimensions;
        self.failed_to_parse += other.failed_to_parse;
        self.shapes_converted += other.shapes_converted;
        self.shapes_skipped += other.shapes_skipped;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total files processed: {}", self.total_files_processed);
        log::info!("Converted files: {}", self.converted_files);
        log::info!("Shapes converted: {}", self.shapes_converted);

        let total_skipped =
            self.skipped_no_tile + self.skipped_missing_dimensions + self.failed_to_parse;
        if total_skipped > 0 {
            log::warn!(
                "Total skipped files: {} (no matching tile: {}, missing dimensions: {}, unreadable: {})",
                total_skipped,
                self.skipped_no_tile,
                self.skipped_missing_dimensions,
                self.failed_to_parse
            );
        }
        if self.shapes_skipped > 0 {
            log::info!(
                "Shapes skipped (too few points or no area): {}",
                self.shapes_skipped
            );
        }
    }
}
