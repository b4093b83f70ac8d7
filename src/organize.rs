use log::{error, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeoLabelError, Result};
use crate::utils::{find_image_file, list_json_files};

/// What happened to one annotation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    Moved { flag: String, destination: PathBuf },
    NoFlags,
    NoRecognizedFlag,
    MissingImage { flag: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortStats {
    pub moved: usize,
    pub unflagged: usize,
    pub missing_image: usize,
    pub failed: usize,
}

impl SortStats {
    pub fn print_summary(&self) {
        info!("=== Sort Summary ===");
        info!("Moved: {}", self.moved);
        info!("Left in place (no recognized true flag): {}", self.unflagged);
        if self.missing_image + self.failed > 0 {
            warn!(
                "Not moved: {} (missing image: {}, failed: {})",
                self.missing_image + self.failed,
                self.missing_image,
                self.failed
            );
        }
    }
}

/// First flag, in file order, that is true and recognized
pub fn first_true_flag(annotation: &Value, recognized: &[String]) -> Option<String> {
    annotation
        .get("flags")?
        .as_object()?
        .iter()
        .find(|(flag, value)| value.as_bool() == Some(true) && recognized.contains(flag))
        .map(|(flag, _)| flag.clone())
}

fn move_file(from: &Path, to_dir: &Path) -> Result<PathBuf> {
    let name = from
        .file_name()
        .ok_or_else(|| GeoLabelError::io(from, std::io::ErrorKind::InvalidInput.into()))?;
    let to = to_dir.join(name);
    fs::rename(from, &to).map_err(|e| GeoLabelError::io(from, e))?;
    Ok(to)
}

/// Move one annotation file and its image into the subfolder of its first true flag
pub fn sort_annotation_file(
    json_path: &Path,
    folder: &Path,
    recognized: &[String],
) -> Result<SortOutcome> {
    let content = fs::read_to_string(json_path).map_err(|e| GeoLabelError::io(json_path, e))?;
    let annotation: Value =
        serde_json::from_str(&content).map_err(|e| GeoLabelError::json(json_path, e))?;

    let has_flags = annotation
        .get("flags")
        .and_then(Value::as_object)
        .is_some_and(|flags| !flags.is_empty());
    if !has_flags {
        return Ok(SortOutcome::NoFlags);
    }

    let Some(flag) = first_true_flag(&annotation, recognized) else {
        return Ok(SortOutcome::NoRecognizedFlag);
    };

    let Some(image_path) = find_image_file(json_path) else {
        return Ok(SortOutcome::MissingImage { flag });
    };

    let destination = folder.join(sanitize_filename::sanitize(&flag));
    fs::create_dir_all(&destination).map_err(|e| GeoLabelError::io(&destination, e))?;

    move_file(json_path, &destination)?;
    move_file(&image_path, &destination)?;
    Ok(SortOutcome::Moved { flag, destination })
}

/// Sort every annotation/image pair directly inside `folder` by flag
pub fn organize_by_flags(folder: &Path, recognized: &[String]) -> Result<SortStats> {
    if !folder.is_dir() {
        return Err(GeoLabelError::MissingDirectory(folder.to_path_buf()));
    }

    let mut stats = SortStats::default();
    for json_path in list_json_files(folder) {
        match sort_annotation_file(&json_path, folder, recognized) {
            Ok(SortOutcome::Moved { destination, .. }) => {
                info!(
                    "Moved {} and its image to {}",
                    json_path.display(),
                    destination.display()
                );
                stats.moved += 1;
            }
            Ok(SortOutcome::NoFlags) | Ok(SortOutcome::NoRecognizedFlag) => {
                stats.unflagged += 1;
            }
            Ok(SortOutcome::MissingImage { flag }) => {
                warn!(
                    "Image file not found for {} (flag '{}'); leaving it in place",
                    json_path.display(),
                    flag
                );
                stats.missing_image += 1;
            }
            Err(e) => {
                error!("Failed to sort {}: {}", json_path.display(), e);
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}
