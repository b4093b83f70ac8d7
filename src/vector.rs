//! Vector dataset formats and their coordinate reference systems
//!
//! Tile datasets and label maps are either ESRI Shapefiles (CRS in a
//! sibling `.prj` file) or GeoJSON (CRS in the collection's `crs` member).
//! The format is picked from the file extension.

use log::warn;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeoLabelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    Shapefile,
    GeoJson,
}

impl VectorFormat {
    /// `.shp` is a Shapefile, anything else is read and written as GeoJSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("shp") => VectorFormat::Shapefile,
            _ => VectorFormat::GeoJson,
        }
    }
}

/// CRS of a dataset, in whichever forms its source carried it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialRef {
    /// `crs` member of a GeoJSON collection
    pub geojson_crs: Option<JsonValue>,
    /// WKT from a Shapefile's `.prj`
    pub prj_wkt: Option<String>,
}

pub fn prj_path(shp_path: &Path) -> PathBuf {
    shp_path.with_extension("prj")
}

/// WKT next to a Shapefile, if there is one
pub fn read_prj(shp_path: &Path) -> Option<String> {
    let prj = prj_path(shp_path);
    match fs::read_to_string(&prj) {
        Ok(wkt) => Some(wkt),
        Err(_) => {
            warn!(
                "No projection file {}; the CRS of {} is unknown",
                prj.display(),
                shp_path.display()
            );
            None
        }
    }
}

/// Write the `.prj` of a Shapefile output, when the CRS came from a `.prj`
pub fn write_prj(shp_path: &Path, spatial_ref: &SpatialRef) -> Result<()> {
    match &spatial_ref.prj_wkt {
        Some(wkt) => {
            let prj = prj_path(shp_path);
            fs::write(&prj, wkt).map_err(|e| GeoLabelError::io(prj, e))
        }
        None => {
            if spatial_ref.geojson_crs.is_some() {
                warn!(
                    "The tile CRS is a GeoJSON crs member; {} is written without a .prj",
                    shp_path.display()
                );
            }
            Ok(())
        }
    }
}
