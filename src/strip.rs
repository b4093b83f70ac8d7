use jwalk::WalkDir;
use log::{error, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{GeoLabelError, Result};

const IMAGE_DATA_FIELD: &str = "imageData";

/// What happened to one annotation file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOutcome {
    Cleaned,
    AlreadyClean,
    NoImageData,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StripStats {
    pub cleaned: usize,
    pub already_clean: usize,
    pub no_image_data: usize,
    pub failed: usize,
}

impl StripStats {
    pub fn print_summary(&self) {
        info!("=== Strip Summary ===");
        info!("Cleaned: {}", self.cleaned);
        info!("Already clean: {}", self.already_clean);
        info!("Without imageData field: {}", self.no_image_data);
        if self.failed > 0 {
            log::warn!("Failed: {}", self.failed);
        }
    }
}

/// Write JSON with four-space indentation, keeping key order
fn write_json_pretty(path: &Path, value: &Value) -> Result<()> {
    let file = File::create(path).map_err(|e| GeoLabelError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| GeoLabelError::json(path, e))?;
    writer.flush().map_err(|e| GeoLabelError::io(path, e))
}

/// Null the `imageData` field of one file in place, if it carries a payload
pub fn strip_image_data_from_file(path: &Path) -> Result<StripOutcome> {
    let content = fs::read_to_string(path).map_err(|e| GeoLabelError::io(path, e))?;
    let mut value: Value =
        serde_json::from_str(&content).map_err(|e| GeoLabelError::json(path, e))?;

    let Some(image_data) = value.get_mut(IMAGE_DATA_FIELD) else {
        return Ok(StripOutcome::NoImageData);
    };
    if image_data.is_null() {
        return Ok(StripOutcome::AlreadyClean);
    }
    *image_data = Value::Null;

    write_json_pretty(path, &value)?;
    Ok(StripOutcome::Cleaned)
}

fn json_files_under(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(dir)
        .skip_hidden(false)
        .max_depth(max_depth)
        .sort(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json")
        })
        .map(|e| e.path())
        .collect()
}

/// Strip embedded images from every LabelMe file under `dir`.
///
/// Per-file failures are logged and counted; files already rewritten stay rewritten.
pub fn strip_image_data(dir: &Path, recursive: bool) -> Result<StripStats> {
    if !dir.is_dir() {
        return Err(GeoLabelError::MissingDirectory(dir.to_path_buf()));
    }

    let mut stats = StripStats::default();
    for json_path in json_files_under(dir, recursive) {
        match strip_image_data_from_file(&json_path) {
            Ok(StripOutcome::Cleaned) => {
                info!("Cleaned: {}", json_path.display());
                stats.cleaned += 1;
            }
            Ok(StripOutcome::AlreadyClean) => {
                info!("Already clean: {}", json_path.display());
                stats.already_clean += 1;
            }
            Ok(StripOutcome::NoImageData) => {
                info!("No imageData field: {}", json_path.display());
                stats.no_image_data += 1;
            }
            Err(e) => {
                error!("Failed to process {}: {}", json_path.display(), e);
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}
