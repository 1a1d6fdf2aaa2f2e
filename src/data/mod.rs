use crate::config::DataConfig;
use crate::region::{GeometryError, Region, RegionId, RegionSet, Ring, Shape};
use anyhow::{Context, Result};
use geojson::{feature::Id, Feature, GeoJson, Geometry, Value};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("region file is not a GeoJSON FeatureCollection")]
    NotFeatureCollection,
    #[error("feature #{0} has no region id")]
    MissingId(usize),
    #[error(transparent)]
    DuplicateId(#[from] crate::region::DuplicateRegionId),
}

/// Load the region polygons and populations named in the config
pub fn load_regions(config: &DataConfig) -> Result<RegionSet> {
    let populations = load_populations(&config.populations)?;

    let mut bytes = fs::read(&config.regions)
        .with_context(|| format!("Failed to read region file: {:?}", config.regions))?;
    let regions = parse_regions(&mut bytes, &populations, &config.id_property, &config.name_property)
        .with_context(|| format!("Failed to load regions from {:?}", config.regions))?;

    info!(
        regions = regions.len(),
        rankable = regions.rankable_count(),
        total_population = regions.total_population(),
        "dataset loaded"
    );
    Ok(regions)
}

/// Load the id -> population mapping. Entries that are null, negative or not
/// numbers are treated as unknown.
pub fn load_populations(path: &Path) -> Result<HashMap<RegionId, f64>> {
    let mut bytes =
        fs::read(path).with_context(|| format!("Failed to read population file: {:?}", path))?;
    parse_populations(&mut bytes).with_context(|| format!("Failed to parse population file: {:?}", path))
}

pub fn parse_populations(bytes: &mut [u8]) -> Result<HashMap<RegionId, f64>> {
    let raw: HashMap<String, serde_json::Value> = simd_json::serde::from_slice(bytes)?;

    let mut populations = HashMap::with_capacity(raw.len());
    for (id, value) in raw {
        match value.as_f64() {
            Some(pop) if pop.is_finite() && pop >= 0.0 => {
                populations.insert(id, pop);
            }
            _ if value.is_null() => {}
            _ => warn!(region = %id, %value, "ignoring unusable population"),
        }
    }
    Ok(populations)
}

/// Build a region set from GeoJSON bytes. Features with bad geometry are kept
/// (so they still count as regions) but cannot be ranked.
pub fn parse_regions(
    bytes: &mut [u8],
    populations: &HashMap<RegionId, f64>,
    id_property: &str,
    name_property: &str,
) -> Result<RegionSet> {
    let value: serde_json::Value = simd_json::serde::from_slice(bytes)?;
    let GeoJson::FeatureCollection(fc) = GeoJson::from_json_value(value)? else {
        return Err(DatasetError::NotFeatureCollection.into());
    };

    let regions = fc
        .features
        .par_iter()
        .enumerate()
        .map(|(idx, feature)| -> Result<Region, DatasetError> {
            let id = feature_id(feature, id_property).ok_or(DatasetError::MissingId(idx))?;
            let population = populations.get(&id).copied();
            let region = match shape_from_geometry(feature.geometry.as_ref()) {
                Ok(shape) => Region::new(id, population, shape),
                Err(err) => Region::with_invalid_geometry(id, population, err),
            };
            Ok(match feature_string(feature, name_property) {
                Some(name) => region.with_name(name),
                None => region,
            })
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;

    for region in &regions {
        if let Err(err) = region.representative_point() {
            warn!(region = region.id(), %err, "region has no representative point and will not be ranked");
        }
    }

    Ok(RegionSet::new(regions).map_err(DatasetError::from)?)
}

/// Region id from the configured property, falling back to the feature id
fn feature_id(feature: &Feature, id_property: &str) -> Option<RegionId> {
    feature_string(feature, id_property).or_else(|| match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

fn feature_string(feature: &Feature, property: &str) -> Option<String> {
    match feature.property(property)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn shape_from_geometry(geometry: Option<&Geometry>) -> Result<Shape, GeometryError> {
    let geometry = geometry.ok_or(GeometryError::Missing)?;
    match &geometry.value {
        Value::Polygon(rings) => Ok(Shape::polygon(convert_rings(rings))),
        Value::MultiPolygon(polygons) => {
            Ok(Shape::new(polygons.iter().map(|rings| convert_rings(rings)).collect()))
        }
        other => Err(GeometryError::Unsupported(geometry_kind(other).to_string())),
    }
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|c| match c.as_slice() {
                    [lon, lat, ..] => (*lon, *lat),
                    _ => (f64::NAN, f64::NAN),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"id": "36061", "name": "New York County"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type": "Feature", "properties": {"id": 36047},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[2,0],[3,0],[3,1],[2,1],[2,0]]],
                [[[4,0],[5,0],[5,1],[4,1],[4,0]]]]}},
            {"type": "Feature", "id": "36081", "properties": {},
             "geometry": {"type": "Point", "coordinates": [0, 0]}},
            {"type": "Feature", "properties": {"id": "36085"}, "geometry": null}
        ]
    }"#;

    fn populations() -> HashMap<RegionId, f64> {
        let mut bytes = br#"{"36061": 1628706, "36047": 2559903, "36081": null, "99999": -4, "36085": "n/a"}"#.to_vec();
        parse_populations(&mut bytes).unwrap()
    }

    #[test]
    fn test_parse_populations() {
        let pops = populations();
        assert_eq!(pops.len(), 2);
        assert_eq!(pops["36061"], 1_628_706.0);
        assert!(!pops.contains_key("36081"));
        assert!(!pops.contains_key("99999"));
    }

    #[test]
    fn test_parse_regions() {
        let mut bytes = COUNTIES.as_bytes().to_vec();
        let set = parse_regions(&mut bytes, &populations(), "id", "name").unwrap();
        assert_eq!(set.len(), 4);

        let manhattan = set.get("36061").unwrap();
        assert_eq!(manhattan.display_name(), "New York County");
        assert_eq!(manhattan.population(), Some(1_628_706.0));

        // Numeric id property, two parts, centroid between them
        let brooklyn = set.get("36047").unwrap();
        let p = brooklyn.representative_point().unwrap();
        assert!((p.lon - 3.5).abs() < 1e-9);
        assert_eq!(brooklyn.shape().parts().len(), 2);

        // Feature-level id fallback, unsupported geometry
        let queens = set.get("36081").unwrap();
        assert_eq!(queens.population(), None);
        assert_eq!(
            queens.representative_point(),
            Err(GeometryError::Unsupported("Point".to_string()))
        );

        assert_eq!(set.get("36085").unwrap().representative_point(), Err(GeometryError::Missing));
        assert_eq!(set.rankable_count(), 2);
    }

    #[test]
    fn test_rejects_non_collection() {
        let mut bytes = br#"{"type": "Point", "coordinates": [0, 0]}"#.to_vec();
        let err = parse_regions(&mut bytes, &HashMap::new(), "id", "name").unwrap_err();
        assert!(err.downcast_ref::<DatasetError>().is_some());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let mut bytes = br#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": null}]}"#
            .to_vec();
        let err = parse_regions(&mut bytes, &HashMap::new(), "id", "name").unwrap_err();
        assert!(matches!(err.downcast_ref::<DatasetError>(), Some(DatasetError::MissingId(0))));
    }

    #[test]
    fn test_duplicate_id_is_an_error() {
        let mut bytes = br#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"id": "a"}, "geometry": null},
            {"type": "Feature", "properties": {"id": "a"}, "geometry": null}]}"#
            .to_vec();
        assert!(parse_regions(&mut bytes, &HashMap::new(), "id", "name").is_err());
    }
}
