use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run. Per-file problems are logged and skipped instead.
#[derive(Debug, Error)]
pub enum GeoLabelError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse GeoJSON {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("failed to access Shapefile {}: {source}", path.display())]
    Shapefile {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    #[error("invalid attribute field name '{0}'")]
    InvalidField(String),

    #[error("tile dataset {} has no feature with a '{field}' attribute and polygon geometry", path.display())]
    NoTiles { path: PathBuf, field: String },

    #[error("label '{0}' appears more than once in the priority order")]
    DuplicatePriority(String),

    #[error("no valid shapes found; {} was not written", path.display())]
    EmptyOutput { path: PathBuf },

    #[error("directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
}

impl GeoLabelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeoLabelError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn shapefile(path: impl Into<PathBuf>, source: shapefile::Error) -> Self {
        GeoLabelError::Shapefile {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GeoLabelError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoLabelError>;
