//! Geographic math for the map view.
//!
//! Distances use the haversine formula on a sphere of radius 6,371 km.
//! Screen placement uses spherical Web Mercator with 256 px slippy tiles,
//! the same projection the OpenStreetMap tile servers render in.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

// Sphere used for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0; // ~111,195m

// Slippy map tiles
pub const TILE_SIZE_PX: f64 = 256.0;
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON positions are `[lng, lat]`.
    pub fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Move by a metre offset (east, north). Flat-earth approximation, accurate
    /// at the few-hundred-metre scale the map works in.
    pub fn offset_meters(self, east_m: f64, north_m: f64) -> Self {
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-6);
        Self::new(
            self.lat + north_m / METERS_PER_DEGREE,
            self.lng + east_m / (METERS_PER_DEGREE * cos_lat),
        )
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Great-circle distance in metres.
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Width (and height) of the whole world in pixels at `zoom`.
pub fn world_size_px(zoom: u8) -> f64 {
    TILE_SIZE_PX * 2f64.powi(i32::from(zoom))
}

/// Project to absolute world pixels at `zoom`. Origin is the top-left
/// (180°W, ~85°N) corner.
pub fn project(point: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size_px(zoom);
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size_px(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    LatLng::new(n.sinh().atan().to_degrees(), lng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// Fill a `{z}/{x}/{y}` URL template.
pub fn tile_url(template: &str, tile: TileCoord) -> String {
    template
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

/// A rectangular window onto the projected world, centred on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    fn origin_px(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    /// Viewport-relative pixel position of a coordinate.
    pub fn to_screen(&self, point: LatLng) -> (f64, f64) {
        let (ox, oy) = self.origin_px();
        let (x, y) = project(point, self.zoom);
        (x - ox, y - oy)
    }

    /// Coordinate under a viewport-relative pixel position.
    pub fn from_screen(&self, x: f64, y: f64) -> LatLng {
        let (ox, oy) = self.origin_px();
        unproject(ox + x, oy + y, self.zoom)
    }

    /// Shift the content by a drag delta; dragging right moves the center west.
    pub fn panned_by(&self, dx: f64, dy: f64) -> Self {
        let (cx, cy) = project(self.center, self.zoom);
        Self {
            center: unproject(cx - dx, cy - dy, self.zoom),
            ..*self
        }
    }

    /// Tiles intersecting the viewport with the screen position of each
    /// tile's top-left corner. Columns wrap around the antimeridian; rows
    /// outside the world are skipped.
    pub fn visible_tiles(&self) -> Vec<(TileCoord, f64, f64)> {
        let (ox, oy) = self.origin_px();
        let n = 1i64 << self.zoom;
        let x0 = (ox / TILE_SIZE_PX).floor() as i64;
        let x1 = ((ox + self.width) / TILE_SIZE_PX).floor() as i64;
        let y0 = ((oy / TILE_SIZE_PX).floor() as i64).max(0);
        let y1 = (((oy + self.height) / TILE_SIZE_PX).floor() as i64).min(n - 1);

        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                let tile = TileCoord {
                    x: tx.rem_euclid(n) as u32,
                    y: ty as u32,
                    z: self.zoom,
                };
                let left = tx as f64 * TILE_SIZE_PX - ox;
                let top = ty as f64 * TILE_SIZE_PX - oy;
                tiles.push((tile, left, top));
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_haversine_one_degree_of_longitude_at_equator() {
        let d = haversine_distance(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_haversine_identical_points_is_zero() {
        let p = LatLng::new(37.031, 27.303);
        assert!(haversine_distance(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_known_pair() {
        // Bodrum castle to Bodrum marina, roughly 600m apart
        let castle = LatLng::new(37.0317, 27.4290);
        let marina = LatLng::new(37.0346, 27.4234);
        let d = haversine_distance(castle, marina);
        assert!(d > 550.0 && d < 650.0, "got {d}");
    }

    #[test]
    fn test_haversine_antipodes_is_half_circumference() {
        let d = haversine_distance(LatLng::new(0.0, 0.0), LatLng::new(0.0, 180.0));
        assert!((d - EARTH_RADIUS_M * PI).abs() < 1.0);
    }

    #[test]
    fn test_display_six_decimals() {
        assert_eq!(LatLng::new(37.031, 27.303).to_string(), "37.031000, 27.303000");
        assert_eq!(LatLng::new(-1.5, 0.1234567).to_string(), "-1.500000, 0.123457");
    }

    #[test]
    fn test_geojson_position_order() {
        let p = LatLng::from_position([27.3, 37.0]);
        assert_eq!(p.lat, 37.0);
        assert_eq!(p.lng, 27.3);
        assert_eq!(p.to_position(), [27.3, 37.0]);
    }

    #[test]
    fn test_offset_meters_north_and_east() {
        let origin = LatLng::new(37.0, 27.0);
        let north = origin.offset_meters(0.0, 100.0);
        let east = origin.offset_meters(100.0, 0.0);
        assert!((haversine_distance(origin, north) - 100.0).abs() < 0.5);
        assert!((haversine_distance(origin, east) - 100.0).abs() < 0.5);
        assert!(north.lat > origin.lat);
        assert!(east.lng > origin.lng);
    }

    #[test]
    fn test_project_origin_and_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
        let (x, _) = project(LatLng::new(0.0, -180.0), 3);
        assert!(x.abs() < 1e-9);
    }

    #[test]
    fn test_world_size_doubles_per_zoom() {
        assert_eq!(world_size_px(0), 256.0);
        assert_eq!(world_size_px(1), 512.0);
        assert_eq!(world_size_px(18), 256.0 * 262_144.0);
    }

    #[test]
    fn test_tile_url_template() {
        let url = tile_url(
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileCoord { x: 12, y: 34, z: 5 },
        );
        assert_eq!(url, "https://tile.openstreetmap.org/5/12/34.png");
    }

    #[test]
    fn test_viewport_center_maps_to_middle_of_screen() {
        let vp = Viewport {
            center: LatLng::new(37.031, 27.303),
            zoom: 18,
            width: 800.0,
            height: 600.0,
        };
        let (x, y) = vp.to_screen(vp.center);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_from_screen_inverts_to_screen() {
        let vp = Viewport {
            center: LatLng::new(37.031, 27.303),
            zoom: 17,
            width: 1024.0,
            height: 768.0,
        };
        let p = LatLng::new(37.0315, 27.3021);
        let (x, y) = vp.to_screen(p);
        let back = vp.from_screen(x, y);
        assert!(haversine_distance(p, back) < 0.01);
    }

    #[test]
    fn test_viewport_pan_moves_content_with_the_drag() {
        let vp = Viewport {
            center: LatLng::new(37.031, 27.303),
            zoom: 18,
            width: 800.0,
            height: 600.0,
        };
        let panned = vp.panned_by(100.0, 0.0);
        // Dragging right reveals what was to the west
        assert!(panned.center.lng < vp.center.lng);
        assert!((panned.center.lat - vp.center.lat).abs() < 1e-9);
        // The old center now sits 100px right of the screen middle
        let (x, _) = panned.to_screen(vp.center);
        assert!((x - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let vp = Viewport {
            center: LatLng::new(37.031, 27.303),
            zoom: 18,
            width: 800.0,
            height: 600.0,
        };
        let tiles = vp.visible_tiles();
        // 800px spans 4 or 5 columns, 600px spans 3 or 4 rows
        assert!(tiles.len() >= 12 && tiles.len() <= 20, "got {}", tiles.len());
        for (tile, left, top) in &tiles {
            assert_eq!(tile.z, 18);
            assert!(*left > -TILE_SIZE_PX && *left < 800.0);
            assert!(*top > -TILE_SIZE_PX && *top < 600.0);
        }
    }

    #[test]
    fn test_visible_tiles_wrap_antimeridian() {
        let vp = Viewport {
            center: LatLng::new(0.0, 179.99),
            zoom: 2,
            width: 512.0,
            height: 256.0,
        };
        let tiles = vp.visible_tiles();
        assert!(tiles.iter().any(|(t, _, _)| t.x == 0));
        assert!(tiles.iter().all(|(t, _, _)| t.x < 4 && t.y < 4));
    }

    proptest! {
        #[test]
        fn prop_haversine_symmetric(
            lat1 in -89.0f64..89.0, lng1 in -180.0f64..180.0,
            lat2 in -89.0f64..89.0, lng2 in -180.0f64..180.0,
        ) {
            let a = LatLng::new(lat1, lng1);
            let b = LatLng::new(lat2, lng2);
            prop_assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-6);
        }

        #[test]
        fn prop_haversine_self_distance_is_zero(lat in -90.0f64..90.0, lng in -180.0f64..180.0) {
            let p = LatLng::new(lat, lng);
            prop_assert!(haversine_distance(p, p).abs() < 1e-9);
        }

        #[test]
        fn prop_project_unproject_round_trip(
            lat in -80.0f64..80.0, lng in -179.0f64..179.0, zoom in 0u8..=20,
        ) {
            let p = LatLng::new(lat, lng);
            let (x, y) = project(p, zoom);
            let back = unproject(x, y, zoom);
            prop_assert!((back.lat - lat).abs() < 1e-7);
            prop_assert!((back.lng - lng).abs() < 1e-7);
        }
    }
}
