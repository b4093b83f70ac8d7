use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use serde_json;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::types::{ImageAnnotation, IMG_FORMATS};

/// Read and parse a single JSON file into an ImageAnnotation struct.
/// Parses straight from a buffered file stream so large embedded
/// image payloads are never held twice.
pub fn read_and_parse_json(path: &Path) -> Option<ImageAnnotation> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open JSON file ({}): {:?}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(annotation) => Some(annotation),
        Err(e) => {
            error!("Failed to parse JSON ({}): {:?}", path.display(), e);
            None
        }
    }
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// All `*.json` files directly inside `dir`, sorted by path
pub fn list_json_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*.json", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            error!("Invalid glob pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    files.sort();
    files
}

/// Find the image next to `json_path` that shares its file stem
pub fn find_image_file(json_path: &Path) -> Option<PathBuf> {
    let stem = json_path.file_stem()?.to_string_lossy();
    let folder = json_path.parent()?;
    IMG_FORMATS
        .iter()
        .map(|ext| folder.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}
