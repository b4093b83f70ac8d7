use geo::{BoundingRect, Geometry, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use log::{info, warn};
use serde_json::Value as JsonValue;
use shapefile::dbase::FieldValue;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{GeoLabelError, Result};
use crate::types::Tile;
use crate::vector::{read_prj, SpatialRef, VectorFormat};

/// Tiles of one site, in dataset order, plus the dataset's CRS
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    tiles: Vec<Tile>,
    by_id: HashMap<String, usize>,
    spatial_ref: SpatialRef,
}

impl TileIndex {
    pub fn new(tiles: Vec<Tile>, spatial_ref: SpatialRef) -> Self {
        let mut by_id = HashMap::with_capacity(tiles.len());
        for (i, tile) in tiles.iter().enumerate() {
            if by_id.insert(tile.id.clone(), i).is_some() {
                warn!("Duplicate tile id '{}'; using the last one", tile.id);
            }
        }
        Self {
            tiles,
            by_id,
            spatial_ref,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Tile> {
        self.by_id.get(id).map(|&i| &self.tiles[i])
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// CRS of the source dataset, carried verbatim to outputs
    pub fn spatial_ref(&self) -> &SpatialRef {
        &self.spatial_ref
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn json_tile_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn dbf_tile_id(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(Some(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => Some(n.to_string()),
        FieldValue::Integer(n) => Some(n.to_string()),
        _ => None,
    }
}

fn polygonal(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

fn build_tile(id: String, geometry: Option<Geometry<f64>>) -> Option<Tile> {
    let Some(geometry) = geometry.and_then(polygonal) else {
        warn!("Tile {} has no polygon geometry", id);
        return None;
    };
    let Some(bounds) = geometry.bounding_rect() else {
        warn!("Tile {} has an empty geometry", id);
        return None;
    };
    Some(Tile {
        id,
        geometry,
        bounds,
    })
}

/// Build tiles from a feature collection, skipping unusable features
pub fn tiles_from_collection(collection: FeatureCollection, id_field: &str) -> TileIndex {
    let spatial_ref = SpatialRef {
        geojson_crs: collection
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("crs").cloned()),
        prj_wkt: None,
    };

    let mut tiles = Vec::with_capacity(collection.features.len());
    for (n, feature) in collection.features.into_iter().enumerate() {
        let Some(id) = feature.property(id_field).and_then(json_tile_id) else {
            warn!("Tile feature #{} has no usable '{}' attribute", n, id_field);
            continue;
        };
        let geometry = feature
            .geometry
            .and_then(|g| Geometry::<f64>::try_from(g).ok());
        tiles.extend(build_tile(id, geometry));
    }

    TileIndex::new(tiles, spatial_ref)
}

fn read_geojson_tiles(path: &Path, id_field: &str) -> Result<TileIndex> {
    let content = fs::read_to_string(path).map_err(|e| GeoLabelError::io(path, e))?;
    let geojson = content
        .parse::<GeoJson>()
        .map_err(|e| GeoLabelError::GeoJson {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(f) => FeatureCollection {
            bbox: None,
            features: vec![f],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        },
    };

    Ok(tiles_from_collection(collection, id_field))
}

fn read_shapefile_tiles(path: &Path, id_field: &str) -> Result<TileIndex> {
    let mut reader =
        shapefile::Reader::from_path(path).map_err(|e| GeoLabelError::shapefile(path, e))?;

    let mut tiles = Vec::new();
    for (n, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.map_err(|e| GeoLabelError::shapefile(path, e))?;
        let Some(id) = record.get(id_field).and_then(dbf_tile_id) else {
            warn!("Tile record #{} has no usable '{}' attribute", n, id_field);
            continue;
        };
        tiles.extend(build_tile(id, Geometry::<f64>::try_from(shape).ok()));
    }

    let spatial_ref = SpatialRef {
        geojson_crs: None,
        prj_wkt: read_prj(path),
    };
    Ok(TileIndex::new(tiles, spatial_ref))
}

/// Read the tile dataset (Shapefile or GeoJSON); fails when no tile can be used
pub fn read_tiles(path: &Path, id_field: &str) -> Result<TileIndex> {
    let index = match VectorFormat::from_path(path) {
        VectorFormat::Shapefile => read_shapefile_tiles(path, id_field)?,
        VectorFormat::GeoJson => read_geojson_tiles(path, id_field)?,
    };

    if index.is_empty() {
        return Err(GeoLabelError::NoTiles {
            path: path.to_path_buf(),
            field: id_field.to_string(),
        });
    }
    info!("Loaded {} tiles from {}", index.len(), path.display());
    Ok(index)
}
