use geo::{Area, Polygon};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::coverage::fill_uncovered;
use crate::dissolve::{dissolve_by_label, union_all};
use crate::error::{GeoLabelError, Result};
use crate::export::write_labels;
use crate::mapping::PixelToGeo;
use crate::priority::{resolve_priority, LabelPriority};
use crate::repair::make_valid_polygon;
use crate::shapes::build_polygon;
use crate::tiles::{read_tiles, TileIndex};
use crate::types::{ImageAnnotation, LabeledGeometry, LabeledPolygon, ProcessingStats, Tile};
use crate::utils::{create_progress_bar, list_json_files, read_and_parse_json};

/// Convert the shapes of one annotation into geographic polygons on `tile`
pub fn convert_annotation(
    annotation: &ImageAnnotation,
    tile: &Tile,
    stats: &mut ProcessingStats,
) -> Option<Vec<LabeledPolygon>> {
    let (width, height) = annotation.dimensions()?;
    let transform = PixelToGeo::new(tile.bounds, width, height)?;

    let mut polygons = Vec::with_capacity(annotation.shapes.len());
    for shape in &annotation.shapes {
        let mapped = transform.map_points(&shape.points);
        let Some(polygon) = build_polygon(&mapped) else {
            debug!(
                "Tile {}: skipping '{}' shape with {} point(s)",
                tile.id,
                shape.label,
                shape.points.len()
            );
            stats.shapes_skipped += 1;
            continue;
        };
        let parts: Vec<Polygon<f64>> = make_valid_polygon(polygon)
            .into_iter()
            .filter(|part| part.unsigned_area() > 0.0)
            .collect();
        if parts.is_empty() {
            debug!(
                "Tile {}: skipping '{}' shape with no area",
                tile.id, shape.label
            );
            stats.shapes_skipped += 1;
            continue;
        }
        stats.shapes_converted += 1;
        polygons.extend(parts.into_iter().map(|part| LabeledPolygon {
            label: shape.label.clone(),
            polygon: part,
        }));
    }
    Some(polygons)
}

/// Read one annotation file and convert it against its tile
pub fn convert_annotation_file(
    path: &Path,
    tiles: &TileIndex,
) -> (Vec<LabeledPolygon>, ProcessingStats) {
    let mut stats = ProcessingStats::new();
    stats.total_files_processed = 1;

    let file_name = path.display();
    let Some(tile_id) = path.file_stem().map(|s| s.to_string_lossy()) else {
        stats.skipped_no_tile = 1;
        return (Vec::new(), stats);
    };
    let Some(tile) = tiles.get(&tile_id) else {
        warn!("Skipping {}: No matching tile id in tile dataset.", file_name);
        stats.skipped_no_tile = 1;
        return (Vec::new(), stats);
    };
    let Some(annotation) = read_and_parse_json(path) else {
        stats.failed_to_parse = 1;
        return (Vec::new(), stats);
    };

    match convert_annotation(&annotation, tile, &mut stats) {
        Some(polygons) => {
            stats.converted_files = 1;
            (polygons, stats)
        }
        None => {
            warn!(
                "Skipping {}: Missing image width/height metadata.",
                file_name
            );
            stats.skipped_missing_dimensions = 1;
            (Vec::new(), stats)
        }
    }
}

/// Convert every `*.json` in `annotation_dir`, in file name order
pub fn collect_shapes(
    annotation_dir: &Path,
    tiles: &TileIndex,
) -> Result<(Vec<LabeledPolygon>, ProcessingStats)> {
    if !annotation_dir.is_dir() {
        return Err(GeoLabelError::MissingDirectory(
            annotation_dir.to_path_buf(),
        ));
    }

    let json_files = list_json_files(annotation_dir);
    info!(
        "Found {} annotation files in {}",
        json_files.len(),
        annotation_dir.display()
    );

    let pb = create_progress_bar(json_files.len() as u64, "Convert");
    let per_file: Vec<(Vec<LabeledPolygon>, ProcessingStats)> = json_files
        .par_iter()
        .map(|path| {
            let converted = convert_annotation_file(path, tiles);
            pb.inc(1);
            converted
        })
        .collect();
    pb.finish_with_message("Conversion complete");

    let mut stats = ProcessingStats::new();
    let mut shapes = Vec::new();
    for (polygons, file_stats) in per_file {
        stats.merge(&file_stats);
        shapes.extend(polygons);
    }
    Ok((shapes, stats))
}

/// Resolved labels and the "unlabeled" fills that complete them
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    pub resolved: Vec<LabeledGeometry>,
    pub unlabeled: Vec<LabeledGeometry>,
}

impl LabelMap {
    /// Resolved labels first, fills after
    pub fn records(&self) -> Vec<LabeledGeometry> {
        self.resolved
            .iter()
            .chain(self.unlabeled.iter())
            .cloned()
            .collect()
    }
}

/// Dissolve, resolve priorities and fill leftover tile area
pub fn merge_labels(
    shapes: &[LabeledPolygon],
    tiles: &[Tile],
    priority: &LabelPriority,
    unlabeled_label: &str,
) -> LabelMap {
    let dissolved = dissolve_by_label(shapes);
    info!("Dissolved shapes into {} labels", dissolved.len());

    let annotated = union_all(dissolved.iter().map(|d| &d.geometry));
    let resolved = resolve_priority(dissolved, priority);
    let unlabeled = fill_uncovered(&resolved, tiles, &annotated, unlabeled_label);
    info!(
        "Resolved {} labels, filled {} tiles with '{}'",
        resolved.len(),
        unlabeled.len(),
        unlabeled_label
    );

    LabelMap {
        resolved,
        unlabeled,
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stats: ProcessingStats,
    pub output_path: PathBuf,
    pub features_written: usize,
    pub raw_features_written: Option<usize>,
}

/// Run the whole conversion for one site
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let tiles = read_tiles(&config.tiles_path, &config.tile_id_field)?;
    let (shapes, stats) = collect_shapes(&config.annotation_dir, &tiles)?;
    stats.print_summary();

    if shapes.is_empty() {
        error!(
            "No valid shapes found. {} was not created.",
            config.output_path.display()
        );
        return Err(GeoLabelError::EmptyOutput {
            path: config.output_path.clone(),
        });
    }

    let raw_features_written = match &config.raw_output_path {
        Some(raw_path) => {
            let raw: Vec<LabeledGeometry> = shapes
                .iter()
                .map(|s| LabeledGeometry::new(s.label.clone(), s.polygon.clone().into()))
                .collect();
            Some(write_labels(raw_path, &raw, tiles.spatial_ref(), true)?)
        }
        None => None,
    };

    let label_map = merge_labels(
        &shapes,
        tiles.tiles(),
        &config.priority,
        &config.unlabeled_label,
    );
    let features_written = write_labels(
        &config.output_path,
        &label_map.records(),
        tiles.spatial_ref(),
        config.explode_parts,
    )?;

    Ok(PipelineReport {
        stats,
        output_path: config.output_path.clone(),
        features_written,
        raw_features_written,
    })
}
