mod distance;
mod shape;

pub use distance::{great_circle_distance, DistanceUnit, EARTH_RADIUS_KM};
pub use shape::{Ring, Shape};

use std::collections::HashMap;
use thiserror::Error;

/// Opaque region identifier (a county FIPS code in the bundled dataset)
pub type RegionId = String;

/// Why a region has no usable representative point
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("feature has no geometry")]
    Missing,
    #[error("unsupported geometry type {0}")]
    Unsupported(String),
    #[error("geometry has no polygon rings")]
    Empty,
    #[error("ring has fewer than three positions")]
    ShortRing,
    #[error("coordinate is not a finite number")]
    NonFinite,
    #[error("coordinate is outside the longitude/latitude range")]
    OutOfRange,
    #[error("polygon encloses zero area")]
    Degenerate,
}

/// The single (lon, lat) point a region is reduced to for distance ranking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepresentativePoint {
    pub lon: f64,
    pub lat: f64,
}

impl RepresentativePoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn distance_to(&self, other: &RepresentativePoint, unit: DistanceUnit) -> f64 {
        great_circle_distance((self.lon, self.lat), (other.lon, other.lat), unit)
    }
}

/// A named area with polygon geometry and an optional population count.
/// The representative point is derived once at construction.
#[derive(Clone, Debug)]
pub struct Region {
    id: RegionId,
    name: Option<String>,
    population: Option<f64>,
    shape: Shape,
    point: Result<RepresentativePoint, GeometryError>,
}

impl Region {
    pub fn new(id: impl Into<RegionId>, population: Option<f64>, shape: Shape) -> Self {
        let point = shape.centroid();
        Self {
            id: id.into(),
            name: None,
            population,
            shape,
            point,
        }
    }

    /// A region whose geometry could not be read at all
    pub fn with_invalid_geometry(
        id: impl Into<RegionId>,
        population: Option<f64>,
        error: GeometryError,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            population,
            shape: Shape::default(),
            point: Err(error),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name if known, otherwise the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn population(&self) -> Option<f64> {
        self.population
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn representative_point(&self) -> Result<RepresentativePoint, GeometryError> {
        self.point.clone()
    }
}

#[derive(Debug, Error)]
#[error("duplicate region id {0:?}")]
pub struct DuplicateRegionId(pub RegionId);

/// Immutable collection of every region, indexed by id
#[derive(Debug, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
    by_id: HashMap<RegionId, usize>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Result<Self, DuplicateRegionId> {
        let mut by_id = HashMap::with_capacity(regions.len());
        for (idx, region) in regions.iter().enumerate() {
            if by_id.insert(region.id.clone(), idx).is_some() {
                return Err(DuplicateRegionId(region.id.clone()));
            }
        }
        Ok(Self { regions, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.by_id.get(id).map(|&idx| &self.regions[idx])
    }

    /// Regions in load order; indices are stable for the set's lifetime
    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sum of every finite population
    pub fn total_population(&self) -> f64 {
        self.regions
            .iter()
            .filter_map(|r| r.population)
            .filter(|p| p.is_finite())
            .sum()
    }

    /// Number of regions that can take part in ranking
    pub fn rankable_count(&self) -> usize {
        self.regions.iter().filter(|r| r.point.is_ok()).count()
    }

    /// Bounds of every region shape, (min_lon, min_lat, max_lon, max_lat)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.regions
            .iter()
            .filter_map(|r| r.shape.bbox())
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }
}
