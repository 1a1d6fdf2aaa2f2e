use std::collections::HashMap;

use crate::region::{Region, RegionSet};

/// Spatial index for pointer hit testing.
/// Each region's bounding box is indexed into every cell it overlaps, so a
/// lookup never misses; candidates are confirmed with a point-in-polygon test.
pub struct RegionIndex {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl RegionIndex {
    /// Build from every region with a non-empty shape in lon/lat. `cell_size` is in degrees.
    pub fn build(regions: &RegionSet, cell_size: f64) -> Self {
        let mut index = Self {
            cells: HashMap::new(),
            cell_size,
        };
        for (idx, region) in regions.as_slice().iter().enumerate() {
            let Some((min_lon, min_lat, max_lon, max_lat)) = region.shape().geographic_bbox() else {
                continue;
            };
            let min_cell = index.to_cell(min_lon, min_lat);
            let max_cell = index.to_cell(max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    index.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        index
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// The region whose polygon contains (lon, lat). Overlaps resolve to the
    /// first region in load order.
    pub fn region_at<'a>(&self, regions: &'a RegionSet, lon: f64, lat: f64) -> Option<&'a Region> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let candidates = self.cells.get(&self.to_cell(lon, lat))?;
        let slice = regions.as_slice();
        candidates
            .iter()
            .filter_map(|&idx| slice.get(idx))
            .find(|region| region.shape().contains(lon, lat))
    }
}
