use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 200.0;
/// Latitude limit of the Web Mercator square
const MAX_LAT: f64 = 85.05112878;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (1.0 = whole world across the canvas width)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Normalized Web Mercator x in [0, 1]
#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in [0, 1], north at 0
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Viewport of the given pixel size that shows `bounds` (min_lon, min_lat,
    /// max_lon, max_lat) with `padding` pixels on every side
    pub fn fit_bounds(bounds: [f64; 4], padding: usize, width: usize, height: usize) -> Self {
        let mut vp = Self::new(0.0, 0.0, 1.0, width, height);
        vp.fit(bounds, padding);
        vp
    }

    /// Recenter and rezoom so `bounds` fill the canvas
    pub fn fit(&mut self, bounds: [f64; 4], padding: usize) {
        let [min_lon, min_lat, max_lon, max_lat] = bounds;
        let x0 = mercator_x(min_lon);
        let x1 = mercator_x(max_lon);
        let y0 = mercator_y(max_lat);
        let y1 = mercator_y(min_lat);

        self.center_lon = (min_lon + max_lon) / 2.0;
        self.center_lat = inverse_mercator_y((y0 + y1) / 2.0);

        if self.width == 0 || self.height == 0 {
            return;
        }

        // Pixels span zoom * width per normalized unit on both axes
        let avail_w = self.width.saturating_sub(2 * padding).max(1) as f64;
        let avail_h = self.height.saturating_sub(2 * padding).max(1) as f64;
        let zoom_x = avail_w / ((x1 - x0).max(1e-9) * self.width as f64);
        let zoom_y = avail_h / ((y1 - y0).max(1e-9) * self.width as f64);
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.zoom * self.width.max(1) as f64;
        let x = mercator_x(self.center_lon) + dx as f64 / scale;
        let y = mercator_y(self.center_lat) + dy as f64 / scale;

        // Wrap longitude, clamp latitude
        self.center_lon = (x * 360.0).rem_euclid(360.0) - 180.0;
        self.center_lat = inverse_mercator_y(y).clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the geographic point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width.max(1) as f64;
        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);
        (x * 360.0 - 180.0, inverse_mercator_y(y))
    }

    /// Project a geographic coordinate (lon, lat) to sub-pixel coordinates
    pub fn project_f64(&self, lon: f64, lat: f64) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;
        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px, py)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f64(lon, lat);
        (px.floor() as i32, py.floor() as i32)
    }

    /// Geographic bounds of the canvas, (min_lon, min_lat, max_lon, max_lat)
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let (min_lon, max_lat) = self.unproject(0, 0);
        let (max_lon, min_lat) = self.unproject(self.width as i32, self.height as i32);
        (min_lon, min_lat, max_lon, max_lat)
    }

    /// Check whether a lon/lat box overlaps the canvas
    pub fn bbox_visible(&self, bbox: (f64, f64, f64, f64)) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.visible_bounds();
        bbox.0 <= max_lon && bbox.2 >= min_lon && bbox.1 <= max_lat && bbox.3 >= min_lat
    }
}
