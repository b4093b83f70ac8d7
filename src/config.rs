use clap::Parser;
use log::warn;
use std::path::PathBuf;

use crate::error::Result;
use crate::priority::LabelPriority;

/// Flags recognized by `labelme-sort` when no list is given
pub const DEFAULT_SORT_FLAGS: &[&str] = &["black_image", "not_inundated", "inundated", "laantjes"];

/// Load a `.env` file from the current directory or its parents, if any.
///
/// Variables already set in the environment are left untouched.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Could not load .env file: {}", e),
    }
}

/// Converts LabelMe annotations on georeferenced tiles into a prioritized label map.
///
/// Every option can also be given through its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Working directory holding the tile dataset and the annotation folder
    #[arg(long = "work_dir", env = "workdirectory")]
    pub work_dir: PathBuf,

    /// Tile dataset, .shp or GeoJSON [default: <work_dir>/Tiles_ortho.shp]
    #[arg(long = "tiles", env = "LABELME2GEO_TILES")]
    pub tiles: Option<PathBuf>,

    /// Folder with one LabelMe JSON per tile [default: <work_dir>/Images/All]
    #[arg(long = "annotations", env = "LABELME2GEO_ANNOTATIONS")]
    pub annotations: Option<PathBuf>,

    /// Merged label map, .shp or GeoJSON [default: <work_dir>/Labels.shp]
    #[arg(long = "output", env = "LABELME2GEO_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also write every converted shape, unmerged, to this file
    #[arg(long = "raw_output", env = "LABELME2GEO_RAW_OUTPUT")]
    pub raw_output: Option<PathBuf>,

    /// Labels from highest to lowest priority
    #[arg(long = "priority", env = "LABELME2GEO_PRIORITY", value_delimiter = ',')]
    pub priority: Vec<String>,

    /// Label for tile area not covered by any annotation
    #[arg(
        long = "unlabeled_label",
        env = "LABELME2GEO_UNLABELED",
        default_value = "not_inundated"
    )]
    pub unlabeled_label: String,

    /// Tile identifier attribute in the tile dataset
    #[arg(
        long = "tile_id_field",
        env = "LABELME2GEO_TILE_ID_FIELD",
        default_value = "TileID"
    )]
    pub tile_id_field: String,

    /// Write one feature per label instead of one per polygon part
    #[arg(long = "keep_multipart", env = "LABELME2GEO_KEEP_MULTIPART")]
    pub keep_multipart: bool,
}

impl Args {
    /// Resolve defaults against the working directory and validate the priority order
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let priority = LabelPriority::new(self.priority.iter().cloned())?;
        Ok(PipelineConfig {
            tiles_path: self
                .tiles
                .clone()
                .unwrap_or_else(|| self.work_dir.join("Tiles_ortho.shp")),
            annotation_dir: self
                .annotations
                .clone()
                .unwrap_or_else(|| self.work_dir.join("Images").join("All")),
            output_path: self
                .output
                .clone()
                .unwrap_or_else(|| self.work_dir.join("Labels.shp")),
            raw_output_path: self.raw_output.clone(),
            priority,
            unlabeled_label: self.unlabeled_label.clone(),
            tile_id_field: self.tile_id_field.clone(),
            explode_parts: !self.keep_multipart,
        })
    }
}

/// Everything one `labelme2geo` run needs, passed explicitly to each stage
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tiles_path: PathBuf,
    pub annotation_dir: PathBuf,
    pub output_path: PathBuf,
    pub raw_output_path: Option<PathBuf>,
    pub priority: LabelPriority,
    pub unlabeled_label: String,
    pub tile_id_field: String,
    pub explode_parts: bool,
}

/// Nulls the embedded image payload of LabelMe JSON files in place
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct StripArgs {
    /// Directory containing LabelMe JSON files
    #[arg(short = 'd', long = "json_dir", env = "LABELME_DIR")]
    pub json_dir: PathBuf,

    /// Only process files directly inside json_dir
    #[arg(long = "no_recursive")]
    pub no_recursive: bool,
}

/// Moves annotation/image pairs into subfolders named after their first true flag
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct SortArgs {
    /// Directory containing LabelMe JSON files and their images
    #[arg(short = 'd', long = "json_dir", env = "LABELME_DIR")]
    pub json_dir: PathBuf,

    /// Flags that select a destination subfolder
    #[arg(
        long = "flags",
        env = "LABELME_FLAGS",
        value_delimiter = ',',
        default_values_t = DEFAULT_SORT_FLAGS.iter().map(|f| f.to_string()).collect::<Vec<_>>()
    )]
    pub flags: Vec<String>,
}
