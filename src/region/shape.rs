use glam::DVec2;

use super::{GeometryError, RepresentativePoint};

const MAX_LON: f64 = 180.0;
const MAX_LAT: f64 = 90.0;

/// A closed ring of (lon, lat) positions. The closing position may be repeated or omitted.
pub type Ring = Vec<(f64, f64)>;

/// Polygon parts of a region. Each part is an exterior ring followed by its holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    parts: Vec<Vec<Ring>>,
}

impl Shape {
    pub fn new(parts: Vec<Vec<Ring>>) -> Self {
        Self { parts }
    }

    /// Single polygon made of an exterior ring and optional holes
    pub fn polygon(rings: Vec<Ring>) -> Self {
        Self { parts: vec![rings] }
    }

    /// Axis-aligned rectangle, handy for synthetic datasets
    pub fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self::polygon(vec![vec![
            (min_lon, min_lat),
            (max_lon, min_lat),
            (max_lon, max_lat),
            (min_lon, max_lat),
            (min_lon, min_lat),
        ]])
    }

    pub fn parts(&self) -> &[Vec<Ring>] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|rings| rings.is_empty())
    }

    /// Every ring of every part (exteriors and holes)
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.parts.iter().flatten()
    }

    /// (min_lon, min_lat, max_lon, max_lat), or None for an empty shape
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let mut positions = self.rings().flatten().filter(|(x, y)| x.is_finite() && y.is_finite());
        let &(x0, y0) = positions.next()?;
        Some(positions.fold((x0, y0, x0, y0), |(min_x, min_y, max_x, max_y), &(x, y)| {
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        }))
    }

    /// Like `bbox`, but None when any corner is not a valid lon/lat position,
    /// e.g. a dataset in projected meters
    pub fn geographic_bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.bbox()
            .filter(|&(x0, y0, x1, y1)| in_range(x0, y0) && in_range(x1, y1))
    }

    /// Even-odd point-in-polygon test across all parts
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.parts.iter().any(|rings| {
            rings
                .iter()
                .fold(false, |inside, ring| inside ^ ring_contains(ring, lon, lat))
        })
    }

    /// Area-weighted planar centroid in degrees. Holes subtract from their part.
    pub fn centroid(&self) -> Result<RepresentativePoint, GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::Empty);
        }

        // Accumulate relative to the first position to keep the cross products small
        let origin = self
            .rings()
            .flatten()
            .next()
            .map(|&(x, y)| DVec2::new(x, y))
            .ok_or(GeometryError::Empty)?;

        let mut weighted = DVec2::ZERO;
        let mut total_area = 0.0;

        for rings in &self.parts {
            for (idx, ring) in rings.iter().enumerate() {
                let (area, centroid) = ring_moments(ring, origin)?;
                // Exterior adds, holes subtract, regardless of winding order
                let weight = if idx == 0 { area.abs() } else { -area.abs() };
                weighted += centroid * weight;
                total_area += weight;
            }
        }

        if total_area <= f64::EPSILON {
            return Err(GeometryError::Degenerate);
        }

        let c = origin + weighted / total_area;
        Ok(RepresentativePoint::new(c.x, c.y))
    }
}

/// Signed area and centroid of one ring, relative to `origin`
fn ring_moments(ring: &Ring, origin: DVec2) -> Result<(f64, DVec2), GeometryError> {
    if ring.len() < 3 {
        return Err(GeometryError::ShortRing);
    }
    if ring.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    if ring.iter().any(|&(x, y)| !in_range(x, y)) {
        return Err(GeometryError::OutOfRange);
    }

    let mut twice_area = 0.0;
    let mut moment = DVec2::ZERO;
    for (i, &(x, y)) in ring.iter().enumerate() {
        let (nx, ny) = ring[(i + 1) % ring.len()];
        let a = DVec2::new(x, y) - origin;
        let b = DVec2::new(nx, ny) - origin;
        let cross = a.perp_dot(b);
        twice_area += cross;
        moment += (a + b) * cross;
    }

    if twice_area.abs() <= f64::EPSILON {
        return Ok((0.0, DVec2::ZERO));
    }
    Ok((twice_area / 2.0, moment / (3.0 * twice_area)))
}

fn in_range(lon: f64, lat: f64) -> bool {
    lon.abs() <= MAX_LON && lat.abs() <= MAX_LAT
}

fn ring_contains(ring: &Ring, x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for (i, &(xi, yi)) in ring.iter().enumerate() {
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rect_centroid() {
        let p = Shape::rect(-2.0, 1.0, 4.0, 3.0).centroid().unwrap();
        assert!(approx(p.lon, 1.0));
        assert!(approx(p.lat, 2.0));
    }

    #[test]
    fn test_centroid_ignores_winding() {
        let cw = Shape::polygon(vec![vec![(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]]);
        let p = cw.centroid().unwrap();
        assert!(approx(p.lon, 1.0) && approx(p.lat, 1.0));
    }

    #[test]
    fn test_centroid_weights_parts_by_area() {
        // 2x2 square at origin (area 4) and 1x1 square far east (area 1)
        let mut parts = Shape::rect(0.0, 0.0, 2.0, 2.0).parts().to_vec();
        parts.extend(Shape::rect(9.5, 0.5, 10.5, 1.5).parts().to_vec());
        let p = Shape::new(parts).centroid().unwrap();
        assert!(approx(p.lon, (1.0 * 4.0 + 10.0 * 1.0) / 5.0));
        assert!(approx(p.lat, 1.0));
    }

    #[test]
    fn test_hole_shifts_centroid() {
        let outer = Shape::rect(0.0, 0.0, 4.0, 4.0).parts()[0][0].clone();
        let hole = Shape::rect(0.0, 0.0, 2.0, 4.0).parts()[0][0].clone();
        let p = Shape::polygon(vec![outer, hole]).centroid().unwrap();
        // Remaining area is the eastern half
        assert!(approx(p.lon, 3.0));
        assert!(approx(p.lat, 2.0));
    }

    #[test]
    fn test_invalid_geometry() {
        assert_eq!(Shape::default().centroid(), Err(GeometryError::Empty));
        assert_eq!(
            Shape::polygon(vec![vec![(0.0, 0.0), (1.0, 1.0)]]).centroid(),
            Err(GeometryError::ShortRing)
        );
        assert_eq!(
            Shape::polygon(vec![vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]]).centroid(),
            Err(GeometryError::Degenerate)
        );
        assert_eq!(
            Shape::polygon(vec![vec![(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]]).centroid(),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn test_projected_meters_rejected() {
        let shape = Shape::rect(-8.2e6, 4.9e6, -8.1e6, 5.0e6);
        assert_eq!(shape.centroid(), Err(GeometryError::OutOfRange));
        assert_eq!(shape.geographic_bbox(), None);
        assert!(shape.bbox().is_some());

        let edge = Shape::rect(179.0, 89.0, 180.0, 90.0);
        assert!(edge.centroid().is_ok());
        assert_eq!(edge.geographic_bbox(), Some((179.0, 89.0, 180.0, 90.0)));
    }

    #[test]
    fn test_contains_with_hole() {
        let outer = Shape::rect(0.0, 0.0, 4.0, 4.0).parts()[0][0].clone();
        let hole = Shape::rect(1.0, 1.0, 3.0, 3.0).parts()[0][0].clone();
        let shape = Shape::polygon(vec![outer, hole]);
        assert!(shape.contains(0.5, 0.5));
        assert!(!shape.contains(2.0, 2.0));
        assert!(!shape.contains(5.0, 2.0));
    }

    #[test]
    fn test_bbox() {
        let shape = Shape::new(vec![
            Shape::rect(-3.0, 1.0, 0.0, 2.0).parts()[0].clone(),
            Shape::rect(5.0, -1.0, 6.0, 0.0).parts()[0].clone(),
        ]);
        assert_eq!(shape.bbox(), Some((-3.0, -1.0, 6.0, 2.0)));
        assert_eq!(Shape::default().bbox(), None);
    }
}
