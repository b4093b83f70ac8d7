use clap::Parser;
use geo::{Area, Coord, Rect};
use geojson::GeoJson;
use serde_json::{json, Value};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use labelme2geo::tiles::read_tiles;
use labelme2geo::{run, Args, GeoLabelError, LabelPriority, PipelineConfig};

const LAMBERT_72_WKT: &str = r#"PROJCS["Belge_Lambert_1972",GEOGCS["GCS_Belge_1972",DATUM["D_Belge_1972",SPHEROID["International_1924",6378388.0,297.0]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],UNIT["Meter",1.0]]"#;

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn tile_feature(id: &str, x0: f64, x1: f64) -> Value {
    json!({
        "type": "Feature",
        "properties": { "TileID": id },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[x0, 0.0], [x1, 0.0], [x1, 100.0], [x0, 100.0], [x0, 0.0]]]
        }
    })
}

fn write_tiles(dir: &Path) -> PathBuf {
    let path = dir.join("tiles.geojson");
    write_json(
        &path,
        &json!({
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::31370" } },
            "features": [
                tile_feature("tile_a", 0.0, 100.0),
                tile_feature("tile_b", 100.0, 200.0),
                tile_feature("tile_c", 500.0, 600.0),
            ]
        }),
    );
    path
}

fn annotation(shapes: Value) -> Value {
    json!({
        "version": "5.4.1",
        "flags": {},
        "shapes": shapes,
        "imagePath": "tile.png",
        "imageData": null,
        "imageHeight": 100,
        "imageWidth": 100
    })
}

fn config(dir: &Path, tiles_path: PathBuf, annotation_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        tiles_path,
        annotation_dir,
        output_path: dir.join("out").join("Labels.geojson"),
        raw_output_path: None,
        priority: LabelPriority::new(["inundated", "reed"]).unwrap(),
        unlabeled_label: "not_inundated".to_string(),
        tile_id_field: "TileID".to_string(),
        explode_parts: true,
    }
}

fn read_features(path: &Path) -> geojson::FeatureCollection {
    let content = fs::read_to_string(path).unwrap();
    match content.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => fc,
        other => panic!("expected a feature collection, got {:?}", other),
    }
}

fn labels_of(fc: &geojson::FeatureCollection) -> Vec<String> {
    fc.features
        .iter()
        .map(|f| f.property("Label").unwrap().as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_read_tiles_keeps_crs_and_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_tiles(temp_dir.path());

    let tiles = read_tiles(&tiles_path, "TileID").unwrap();

    assert_eq!(tiles.len(), 3);
    assert_eq!(tiles.tiles()[0].id, "tile_a");
    assert_eq!(tiles.get("tile_b").unwrap().bounds.min().x, 100.0);
    assert_eq!(
        tiles.spatial_ref().geojson_crs.as_ref().unwrap()["properties"]["name"],
        "urn:ogc:def:crs:EPSG::31370"
    );
}

fn write_shapefile_tiles(dir: &Path) -> PathBuf {
    let path = dir.join("Tiles_ortho.shp");
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("TileID").unwrap(), 20);
    let mut writer = shapefile::Writer::from_path(&path, table).unwrap();
    for (id, x0, x1) in [("tile_a", 0.0, 100.0), ("tile_b", 100.0, 200.0)] {
        let polygon = Rect::new(Coord { x: x0, y: 0.0 }, Coord { x: x1, y: 100.0 }).to_polygon();
        let mut record = Record::default();
        record.insert(
            "TileID".to_string(),
            FieldValue::Character(Some(id.to_string())),
        );
        writer
            .write_shape_and_record(&shapefile::Polygon::from(polygon), &record)
            .unwrap();
    }
    drop(writer);
    fs::write(path.with_extension("prj"), LAMBERT_72_WKT).unwrap();
    path
}

fn read_shapefile_labels(path: &Path) -> Vec<(String, f64)> {
    let mut reader = shapefile::Reader::from_path(path).unwrap();
    reader
        .iter_shapes_and_records()
        .map(|item| {
            let (shape, record) = item.unwrap();
            let label = match record.get("Label") {
                Some(FieldValue::Character(Some(label))) => label.trim().to_string(),
                other => panic!("unexpected Label value {:?}", other),
            };
            let area = match geo::Geometry::<f64>::try_from(shape).unwrap() {
                geo::Geometry::Polygon(p) => p.unsigned_area(),
                geo::Geometry::MultiPolygon(mp) => mp.unsigned_area(),
                other => panic!("unexpected geometry {:?}", other),
            };
            (label, area)
        })
        .collect()
}

#[test]
fn test_read_shapefile_tiles_keeps_prj() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_shapefile_tiles(temp_dir.path());

    let tiles = read_tiles(&tiles_path, "TileID").unwrap();

    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles.tiles()[0].id, "tile_a");
    let bounds = tiles.get("tile_b").unwrap().bounds;
    assert_eq!(bounds.min().x, 100.0);
    assert_eq!(bounds.max().x, 200.0);
    assert_eq!(tiles.spatial_ref().prj_wkt.as_deref(), Some(LAMBERT_72_WKT));
    assert!(tiles.spatial_ref().geojson_crs.is_none());
}

#[test]
fn test_run_with_shapefiles_end_to_end() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_shapefile_tiles(temp_dir.path());
    let annotation_dir = temp_dir.path().join("Images").join("All");
    fs::create_dir_all(&annotation_dir).unwrap();
    write_json(
        &annotation_dir.join("tile_a.json"),
        &annotation(json!([
            { "label": "inundated", "points": [[0.0, 0.0], [50.0, 50.0]], "shape_type": "rectangle" }
        ])),
    );

    let mut config = config(temp_dir.path(), tiles_path, annotation_dir);
    config.output_path = temp_dir.path().join("out").join("Labels.shp");

    let report = run(&config).unwrap();

    let labels = read_shapefile_labels(&config.output_path);
    assert_eq!(labels.len(), report.features_written);
    assert_eq!(labels[0].0, "inundated");
    assert!((labels[0].1 - 2500.0).abs() < 1e-6);
    assert_eq!(labels[1].0, "not_inundated");
    assert!((labels[1].1 - 7500.0).abs() < 1e-6);
    assert_eq!(
        fs::read_to_string(config.output_path.with_extension("prj")).unwrap(),
        LAMBERT_72_WKT
    );
}

#[test]
fn test_read_tiles_without_id_field_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_tiles(temp_dir.path());

    let result = read_tiles(&tiles_path, "Name");

    assert!(matches!(result, Err(GeoLabelError::NoTiles { .. })));
}

#[test]
fn test_run_builds_label_map() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_tiles(temp_dir.path());
    let annotation_dir = temp_dir.path().join("Images").join("All");
    fs::create_dir_all(&annotation_dir).unwrap();

    write_json(
        &annotation_dir.join("tile_a.json"),
        &annotation(json!([
            { "label": "inundated", "points": [[0.0, 0.0], [50.0, 50.0]], "shape_type": "rectangle" },
            { "label": "reed", "points": [[25.0, 0.0], [75.0, 0.0], [75.0, 50.0], [25.0, 50.0]], "shape_type": "polygon" },
            { "label": "reed", "points": [[10.0, 10.0]], "shape_type": "point" }
        ])),
    );
    write_json(
        &annotation_dir.join("unknown_tile.json"),
        &annotation(json!([{ "label": "reed", "points": [[0.0, 0.0], [5.0, 5.0]] }])),
    );
    let mut no_size = annotation(json!([{ "label": "reed", "points": [[0.0, 0.0], [5.0, 5.0]] }]));
    no_size.as_object_mut().unwrap().remove("imageWidth");
    write_json(&annotation_dir.join("tile_b.json"), &no_size);

    let mut config = config(temp_dir.path(), tiles_path, annotation_dir);
    config.raw_output_path = Some(temp_dir.path().join("raw.geojson"));

    let report = run(&config).unwrap();

    assert_eq!(report.stats.total_files_processed, 3);
    assert_eq!(report.stats.converted_files, 1);
    assert_eq!(report.stats.skipped_no_tile, 1);
    assert_eq!(report.stats.skipped_missing_dimensions, 1);
    assert_eq!(report.stats.shapes_converted, 2);
    assert_eq!(report.stats.shapes_skipped, 1);
    assert_eq!(report.raw_features_written, Some(2));

    let output = read_features(&config.output_path);
    assert_eq!(output.features.len(), report.features_written);
    assert_eq!(
        labels_of(&output),
        vec!["inundated", "reed", "not_inundated"]
    );
    let crs = output.foreign_members.as_ref().unwrap().get("crs").unwrap();
    assert_eq!(crs["properties"]["name"], "urn:ogc:def:crs:EPSG::31370");

    let raw = read_features(&temp_dir.path().join("raw.geojson"));
    assert_eq!(labels_of(&raw), vec!["inundated", "reed"]);
}

#[test]
fn test_run_without_shapes_writes_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_tiles(temp_dir.path());
    let annotation_dir = temp_dir.path().join("annotations");
    fs::create_dir_all(&annotation_dir).unwrap();
    write_json(
        &annotation_dir.join("not_a_tile.json"),
        &annotation(json!([{ "label": "reed", "points": [[0.0, 0.0], [5.0, 5.0]] }])),
    );

    let config = config(temp_dir.path(), tiles_path, annotation_dir);
    let result = run(&config);

    assert!(matches!(result, Err(GeoLabelError::EmptyOutput { .. })));
    assert!(!config.output_path.exists());
}

#[test]
fn test_run_with_missing_annotation_dir_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tiles_path = write_tiles(temp_dir.path());

    let config = config(temp_dir.path(), tiles_path, temp_dir.path().join("missing"));

    assert!(matches!(
        run(&config),
        Err(GeoLabelError::MissingDirectory(_))
    ));
}

#[test]
fn test_args_resolve_defaults_from_work_dir() {
    let args = Args::try_parse_from([
        "labelme2geo",
        "--work_dir",
        "/data/site",
        "--priority",
        "inundated,reed",
    ])
    .unwrap();

    let config = args.to_pipeline_config().unwrap();

    assert_eq!(config.tiles_path, PathBuf::from("/data/site/Tiles_ortho.shp"));
    assert_eq!(config.annotation_dir, PathBuf::from("/data/site/Images/All"));
    assert_eq!(config.output_path, PathBuf::from("/data/site/Labels.shp"));
    assert_eq!(config.priority.labels(), ["inundated", "reed"]);
    assert_eq!(config.priority.rank("reed"), Some(1));
    assert!(config.explode_parts);
}

#[test]
fn test_args_take_work_dir_from_environment() {
    std::env::set_var("workdirectory", "/data/from_env");

    let args = Args::try_parse_from(["labelme2geo"]).unwrap();
    let config = args.to_pipeline_config().unwrap();

    assert_eq!(args.work_dir, PathBuf::from("/data/from_env"));
    assert_eq!(config.tiles_path, PathBuf::from("/data/from_env/Tiles_ortho.shp"));
    assert_eq!(config.output_path, PathBuf::from("/data/from_env/Labels.shp"));
}

#[test]
fn test_args_reject_duplicate_priority() {
    let args = Args::try_parse_from([
        "labelme2geo",
        "--work_dir",
        "/data/site",
        "--priority",
        "reed,inundated,reed",
    ])
    .unwrap();

    assert!(matches!(
        args.to_pipeline_config(),
        Err(GeoLabelError::DuplicatePriority(_))
    ));
}
