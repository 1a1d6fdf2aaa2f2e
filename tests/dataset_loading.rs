use pop_map::config::DataConfig;
use pop_map::data;
use pop_map::ranking::RegionRanker;
use pop_map::region::DistanceUnit;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const REGIONS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"GEOID": "36061", "NAME": "New York County"},
     "geometry": {"type": "Polygon", "coordinates": [[[-74.02,40.70],[-73.93,40.70],[-73.93,40.88],[-74.02,40.88],[-74.02,40.70]]]}},
    {"type": "Feature", "properties": {"GEOID": "36047", "NAME": "Kings County"},
     "geometry": {"type": "Polygon", "coordinates": [[[-74.04,40.57],[-73.83,40.57],[-73.83,40.70],[-74.04,40.70],[-74.04,40.57]]]}},
    {"type": "Feature", "properties": {"GEOID": "36081", "NAME": "Queens County"},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[-73.96,40.54],[-73.70,40.54],[-73.70,40.80],[-73.96,40.80],[-73.96,40.54]]]]}},
    {"type": "Feature", "properties": {"GEOID": "06037", "NAME": "Los Angeles County"},
     "geometry": {"type": "Polygon", "coordinates": [[[-118.9,33.7],[-117.6,33.7],[-117.6,34.8],[-118.9,34.8],[-118.9,33.7]]]}},
    {"type": "Feature", "properties": {"GEOID": "99999", "NAME": "Nowhere"},
     "geometry": {"type": "Point", "coordinates": [-100.0, 40.0]}}
  ]
}"#;

const POPULATIONS: &str = r#"{
  "36061": 1694251,
  "36047": 2736074,
  "36081": 2405464,
  "06037": 10014009,
  "99999": 12
}"#;

/// Writes both fixture files; the directory is removed when the `TempDir` drops
fn write_fixture() -> (TempDir, DataConfig) {
    let dir = tempfile::tempdir().unwrap();
    let regions = dir.path().join("regions.json");
    let populations = dir.path().join("populations.json");
    fs::write(&regions, REGIONS).unwrap();
    fs::write(&populations, POPULATIONS).unwrap();

    let config = DataConfig {
        regions,
        populations,
        id_property: "GEOID".to_string(),
        name_property: "NAME".to_string(),
        ..DataConfig::default()
    };
    (dir, config)
}

#[test]
fn loads_polygons_multipolygons_and_unsupported_geometry() {
    let (_dir, config) = write_fixture();
    let regions = data::load_regions(&config).unwrap();

    assert_eq!(regions.len(), 5);
    assert_eq!(regions.rankable_count(), 4);
    assert_eq!(
        regions.get("36061").map(|r| r.display_name()),
        Some("New York County")
    );
    assert_eq!(regions.get("36081").unwrap().population(), Some(2_405_464.0));
    assert!(regions.get("99999").unwrap().representative_point().is_err());
}

#[test]
fn query_over_loaded_dataset_grows_until_target() {
    let (_dir, config) = write_fixture();
    let regions = Arc::new(data::load_regions(&config).unwrap());
    let ranker = RegionRanker::new(regions.clone(), 5_000_000.0, DistanceUnit::Miles);

    let manhattan = regions.get("36061").unwrap();
    let result = ranker.query(manhattan).unwrap();
    assert!(result.reached);
    assert!(result.contains("36061"));
    assert!(!result.contains("06037"));
    assert!(!result.contains("99999"));
    assert!(result.accumulated_population >= 5_000_000.0);
    assert!(result.farthest_distance < 20.0);

    // One county already covers the target
    let la = regions.get("06037").unwrap();
    let result = ranker.query(la).unwrap();
    assert_eq!(result.count, 1);
    assert_eq!(result.farthest_distance, 0.0);
}

#[test]
fn region_with_unsupported_geometry_is_never_selected() {
    let (_dir, config) = write_fixture();
    let regions = Arc::new(data::load_regions(&config).unwrap());
    let ranker = RegionRanker::new(regions.clone(), 1e12, DistanceUnit::Kilometers);

    let result = ranker.query(regions.get("36047").unwrap()).unwrap();
    assert!(!result.reached);
    assert_eq!(result.count, 4);
    assert!(!result.contains("99999"));

    let nowhere = regions.get("99999").unwrap();
    assert!(ranker.query(nowhere).is_err());
    assert!(ranker.select(Some(nowhere)).is_empty());
}

#[test]
fn missing_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = DataConfig {
        regions: dir.path().join("nope.json"),
        populations: dir.path().join("also-nope.json"),
        ..DataConfig::default()
    };
    let err = data::load_regions(&config).unwrap_err();
    assert!(format!("{err:#}").contains("population file"));
}

#[test]
fn duplicate_ids_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let regions = dir.path().join("regions.json");
    let populations = dir.path().join("populations.json");
    fs::write(
        &regions,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": "a", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type": "Feature", "id": "a", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}}
        ]}"#,
    )
    .unwrap();
    fs::write(&populations, r#"{"a": 1}"#).unwrap();

    let config = DataConfig {
        regions,
        populations,
        ..DataConfig::default()
    };
    assert!(data::load_regions(&config).is_err());
}
