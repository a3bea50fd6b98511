use std::f64::consts::PI;

use super::{LngLat, MapView, ScreenPoint};

/// Edge length of one Web Mercator tile at zoom 0, in pixels.
pub const TILE_SIZE: f64 = 512.0;
pub const MIN_ZOOM: f64 = 5.0;
pub const MAX_ZOOM: f64 = 18.0;
/// Latitudes beyond this are not representable in Web Mercator.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Boston / Cambridge, where the Bluebikes network lives.
pub const DEFAULT_CENTER: LngLat = LngLat {
    lon: -71.09415,
    lat: 42.36027,
};
pub const DEFAULT_ZOOM: f64 = 12.0;

/// A Web Mercator viewport: a centre, a zoom level and a pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: LngLat,
    zoom: f64,
    width: f64,
    height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM, 1024.0, 768.0)
    }
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Normalized Mercator coordinates: x and y in `[0, 1]`, y = 0 at the north edge.
    fn to_world(at: LngLat) -> (f64, f64) {
        let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (at.lon + 180.0) / 360.0;
        let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0;
        (x, y)
    }

    fn from_world(x: f64, y: f64) -> LngLat {
        let lon = x * 360.0 - 180.0;
        let lat = (PI - 2.0 * PI * y).sinh().atan().to_degrees();
        LngLat { lon, lat }
    }

    /// Shifts the centre by a pixel offset, as a drag would.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let ws = self.world_size();
        let (cx, cy) = Self::to_world(self.center);
        let x = (cx + dx / ws).rem_euclid(1.0);
        let y = (cy + dy / ws).clamp(0.0, 1.0);
        self.center = Self::from_world(x, y);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

impl MapView for Viewport {
    fn project(&self, at: LngLat) -> ScreenPoint {
        let ws = self.world_size();
        let (x, y) = Self::to_world(at);
        let (cx, cy) = Self::to_world(self.center);
        ScreenPoint {
            x: (x - cx) * ws + self.width / 2.0,
            y: (y - cy) * ws + self.height / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_center_projects_to_middle() {
        let vp = Viewport::default();
        let p = vp.project(DEFAULT_CENTER);
        assert!(close(p.x, 512.0));
        assert!(close(p.y, 384.0));
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let vp = Viewport::default();
        let north = vp.project(LngLat::new(DEFAULT_CENTER.lon, DEFAULT_CENTER.lat + 0.01));
        let east = vp.project(LngLat::new(DEFAULT_CENTER.lon + 0.01, DEFAULT_CENTER.lat));
        assert!(north.y < 384.0);
        assert!(east.x > 512.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = Viewport::new(DEFAULT_CENTER, 2.0, 800.0, 600.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.set_zoom(30.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_pan_moves_points_opposite() {
        let mut vp = Viewport::default();
        let target = LngLat::new(-71.06, 42.35);
        let before = vp.project(target);

        vp.pan_by(100.0, -50.0);
        let after = vp.project(target);

        assert!(close(before.x - after.x, 100.0));
        assert!(close(before.y - after.y, -50.0));
    }

    #[test]
    fn test_zoom_in_doubles_offsets() {
        let mut vp = Viewport::default();
        let target = LngLat::new(-71.06, 42.35);
        let before = vp.project(target);

        vp.set_zoom(DEFAULT_ZOOM + 1.0);
        let after = vp.project(target);

        assert!(close((after.x - 512.0) / (before.x - 512.0), 2.0));
    }

    #[test]
    fn test_world_round_trip() {
        let (x, y) = Viewport::to_world(DEFAULT_CENTER);
        let back = Viewport::from_world(x, y);
        assert!(close(back.lon, DEFAULT_CENTER.lon));
        assert!(close(back.lat, DEFAULT_CENTER.lat));
    }
}
