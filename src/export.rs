use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use log::{error, info, warn};
use serde_json::Value as JsonValue;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{GeoLabelError, Result};
use crate::types::LabeledGeometry;
use crate::vector::{write_prj, SpatialRef, VectorFormat};

/// Attribute holding the label on every exported feature
pub const LABEL_FIELD: &str = "Label";

// Width of the dBASE character column holding the label
const LABEL_FIELD_WIDTH: u8 = 80;

fn feature(label: &str, value: geojson::Value) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(LABEL_FIELD.to_string(), JsonValue::from(label));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build the output collection.
///
/// With `explode_parts` every polygon part becomes its own feature,
/// otherwise each record is written as one multipolygon.
pub fn to_feature_collection(
    records: &[LabeledGeometry],
    crs: Option<&JsonValue>,
    explode_parts: bool,
) -> FeatureCollection {
    let features = records
        .iter()
        .flat_map(|record| {
            if explode_parts {
                record
                    .geometry
                    .iter()
                    .map(|part| feature(&record.label, geojson::Value::from(part)))
                    .collect::<Vec<_>>()
            } else {
                vec![feature(
                    &record.label,
                    geojson::Value::from(&record.geometry),
                )]
            }
        })
        .collect();

    let foreign_members = crs.map(|crs| {
        let mut members = JsonObject::new();
        members.insert("crs".to_string(), crs.clone());
        members
    });

    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

/// Polygons of one record, one per part when exploding
fn record_parts(record: &LabeledGeometry, explode_parts: bool) -> Vec<MultiPolygon<f64>> {
    if explode_parts {
        record
            .geometry
            .iter()
            .map(|part| MultiPolygon::new(vec![part.clone()]))
            .collect()
    } else {
        vec![record.geometry.clone()]
    }
}

fn write_geojson(
    path: &Path,
    records: &[LabeledGeometry],
    spatial_ref: &SpatialRef,
    explode_parts: bool,
) -> Result<usize> {
    if spatial_ref.geojson_crs.is_none() && spatial_ref.prj_wkt.is_some() {
        warn!(
            "The tile CRS comes from a .prj file; {} is written without a crs member",
            path.display()
        );
    }
    let collection =
        to_feature_collection(records, spatial_ref.geojson_crs.as_ref(), explode_parts);

    let file = File::create(path).map_err(|e| GeoLabelError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &collection)
        .map_err(|e| GeoLabelError::json(path, e))?;
    writer.flush().map_err(|e| GeoLabelError::io(path, e))?;
    Ok(collection.features.len())
}

fn write_shapefile(
    path: &Path,
    records: &[LabeledGeometry],
    spatial_ref: &SpatialRef,
    explode_parts: bool,
) -> Result<usize> {
    let label_field = FieldName::try_from(LABEL_FIELD)
        .map_err(|_| GeoLabelError::InvalidField(LABEL_FIELD.to_string()))?;
    let table = TableWriterBuilder::new().add_character_field(label_field, LABEL_FIELD_WIDTH);
    let mut writer =
        shapefile::Writer::from_path(path, table).map_err(|e| GeoLabelError::shapefile(path, e))?;

    let mut written = 0;
    for record in records {
        for part in record_parts(record, explode_parts) {
            let mut attributes = Record::default();
            attributes.insert(
                LABEL_FIELD.to_string(),
                FieldValue::Character(Some(record.label.clone())),
            );
            writer
                .write_shape_and_record(&shapefile::Polygon::from(part), &attributes)
                .map_err(|e| GeoLabelError::shapefile(path, e))?;
            written += 1;
        }
    }
    drop(writer);

    write_prj(path, spatial_ref)?;
    Ok(written)
}

/// Write records as a Shapefile (`.shp`) or a GeoJSON FeatureCollection.
///
/// Nothing is written when there are no records.
pub fn write_labels(
    path: &Path,
    records: &[LabeledGeometry],
    spatial_ref: &SpatialRef,
    explode_parts: bool,
) -> Result<usize> {
    if records.iter().all(|r| r.geometry.0.is_empty()) {
        error!("No valid shapes found. {} was not created.", path.display());
        return Err(GeoLabelError::EmptyOutput {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GeoLabelError::io(parent, e))?;
    }

    let written = match VectorFormat::from_path(path) {
        VectorFormat::Shapefile => write_shapefile(path, records, spatial_ref, explode_parts)?,
        VectorFormat::GeoJson => write_geojson(path, records, spatial_ref, explode_parts)?,
    };

    info!("Wrote {} features to: {}", written, path.display());
    Ok(written)
}
