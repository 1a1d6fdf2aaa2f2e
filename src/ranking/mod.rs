//! Nearest-region population accumulation.
//!
//! A query ranks every region by great-circle distance between representative
//! points, nearest first, then walks that ranking summing populations until the
//! target is met. The region that crosses the target is included, so the reported
//! population is never below the target unless the whole set falls short.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::region::{DistanceUnit, GeometryError, Region, RegionId, RegionSet};

/// One ranked region for a single query
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceEntry {
    pub region_id: RegionId,
    /// None when the dataset has no population for this region
    pub population: Option<f64>,
    pub distance: f64,
}

/// Outcome of one hover/tap query
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulationResult {
    /// Region the query started from; None for the empty baseline
    pub query_id: Option<RegionId>,
    pub selected_ids: HashSet<RegionId>,
    pub accumulated_population: f64,
    pub count: usize,
    /// Whether the accumulated population met the target
    pub reached: bool,
    /// Distance of the farthest selected region
    pub farthest_distance: f64,
}

impl AccumulationResult {
    /// Baseline shown when nothing is under the pointer
    pub fn empty() -> Self {
        Self {
            query_id: None,
            selected_ids: HashSet::new(),
            accumulated_population: 0.0,
            count: 0,
            reached: false,
            farthest_distance: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }
}

impl Default for AccumulationResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Error)]
pub enum RankError {
    #[error("region {0:?} is not part of the region set")]
    UnknownRegion(RegionId),
    #[error("query region {id:?} has unusable geometry: {source}")]
    InvalidQueryGeometry {
        id: RegionId,
        #[source]
        source: GeometryError,
    },
}

/// Rank every region in `regions` by distance from `query`, nearest first.
///
/// The query itself comes first at distance 0. Ties are broken by ascending id so
/// repeated queries give identical output. Regions without a usable representative
/// point are left out of the ranking.
pub fn rank_by_distance(
    query: &Region,
    regions: &RegionSet,
    unit: DistanceUnit,
) -> Result<Vec<DistanceEntry>, RankError> {
    if regions.get(query.id()).is_none() {
        return Err(RankError::UnknownRegion(query.id().to_string()));
    }
    let origin = query
        .representative_point()
        .map_err(|source| RankError::InvalidQueryGeometry {
            id: query.id().to_string(),
            source,
        })?;

    let mut ranked = Vec::with_capacity(regions.len());
    let mut skipped = 0usize;

    for region in regions.iter().filter(|r| r.id() != query.id()) {
        let point = match region.representative_point() {
            Ok(point) => point,
            Err(err) => {
                debug!(region = region.id(), %err, "excluded from ranking");
                skipped += 1;
                continue;
            }
        };
        ranked.push(DistanceEntry {
            region_id: region.id().to_string(),
            population: region.population(),
            distance: origin.distance_to(&point, unit),
        });
    }

    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.region_id.cmp(&b.region_id))
    });

    // Strictly ahead of any other zero-distance entry
    ranked.insert(
        0,
        DistanceEntry {
            region_id: query.id().to_string(),
            population: query.population(),
            distance: 0.0,
        },
    );

    if skipped > 0 {
        debug!(query = query.id(), skipped, "ranked with regions excluded");
    }

    Ok(ranked)
}

/// Walk `ranked` summing finite populations until the sum reaches `target_population`.
///
/// The crossing entry is included. When the target is never reached every entry
/// is selected and the full sum reported.
pub fn accumulate(ranked: &[DistanceEntry], target_population: f64) -> AccumulationResult {
    let mut result = AccumulationResult {
        query_id: ranked.first().map(|e| e.region_id.clone()),
        ..AccumulationResult::empty()
    };

    for entry in ranked {
        if let Some(population) = entry.population.filter(|p| p.is_finite()) {
            result.accumulated_population += population;
        }
        result.selected_ids.insert(entry.region_id.clone());
        result.farthest_distance = entry.distance;

        if result.accumulated_population >= target_population {
            result.reached = true;
            break;
        }
    }

    result.count = result.selected_ids.len();
    result
}

/// Per-event entry point over a shared, immutable region set
pub struct RegionRanker {
    regions: Arc<RegionSet>,
    target_population: f64,
    unit: DistanceUnit,
}

impl RegionRanker {
    pub fn new(regions: Arc<RegionSet>, target_population: f64, unit: DistanceUnit) -> Self {
        Self {
            regions,
            target_population,
            unit,
        }
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn target_population(&self) -> f64 {
        self.target_population
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn rank_by_distance(&self, query: &Region) -> Result<Vec<DistanceEntry>, RankError> {
        rank_by_distance(query, &self.regions, self.unit)
    }

    pub fn accumulate(&self, ranked: &[DistanceEntry]) -> AccumulationResult {
        accumulate(ranked, self.target_population)
    }

    /// Rank then accumulate, recomputed from scratch every call
    pub fn query(&self, region: &Region) -> Result<AccumulationResult, RankError> {
        let ranked = self.rank_by_distance(region)?;
        let result = self.accumulate(&ranked);
        debug!(
            query = region.id(),
            count = result.count,
            population = result.accumulated_population,
            reached = result.reached,
            "query"
        );
        Ok(result)
    }

    /// Query for whatever is under the pointer. No region, or a region that cannot
    /// be ranked, resets to the empty baseline.
    pub fn select(&self, hovered: Option<&Region>) -> AccumulationResult {
        let Some(region) = hovered else {
            return AccumulationResult::empty();
        };
        match self.query(region) {
            Ok(result) => result,
            Err(err) => {
                warn!(%err, "selection cleared");
                AccumulationResult::empty()
            }
        }
    }
}
