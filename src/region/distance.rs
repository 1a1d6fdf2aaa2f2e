use glam::DVec3;
use serde::Deserialize;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
const KM_PER_MILE: f64 = 1.609344;

/// Unit reported for centroid-to-centroid distances
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Miles => EARTH_RADIUS_KM / KM_PER_MILE,
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }
}

/// Great-circle distance between two (lon, lat) points in degrees.
/// Uses the atan2 form, which stays accurate for both tiny and antipodal separations.
pub fn great_circle_distance(a: (f64, f64), b: (f64, f64), unit: DistanceUnit) -> f64 {
    let pa = lonlat_to_vec3(a.0, a.1);
    let pb = lonlat_to_vec3(b.0, b.1);
    let angle = pa.cross(pb).length().atan2(pa.dot(pb));
    unit.earth_radius() * angle
}

/// Unit-sphere position for a lon/lat pair
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}
