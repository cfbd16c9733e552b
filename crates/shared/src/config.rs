//! Game tuning knobs. Compiled-in defaults, optionally overridden at build
//! time through `RECARIA_*` environment variables.

use std::str::FromStr;

use crate::geo::LatLng;

pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    /// Where the map starts before geolocation answers.
    pub default_center: LatLng,
    pub fetch_radius_m: f64,
    /// Fraction of the radius the map may drift before features are refetched.
    pub refetch_threshold: f64,
    pub initial_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub save_interval_ms: u32,
    pub startup_delay_ms: u32,
    pub log_capacity: usize,
    pub interact_range_m: f64,
    pub tile_url_template: &'static str,
    /// Backend origin; `None` means same origin as the page.
    pub api_origin: Option<&'static str>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_center: LatLng::new(37.031, 27.303),
            fetch_radius_m: 150.0,
            refetch_threshold: 0.6,
            initial_zoom: 18,
            min_zoom: 15,
            max_zoom: 20,
            save_interval_ms: 30_000,
            startup_delay_ms: 1_000,
            log_capacity: 50,
            interact_range_m: 50.0,
            tile_url_template: DEFAULT_TILE_URL,
            api_origin: None,
        }
    }
}

impl GameConfig {
    pub fn from_build_env() -> Self {
        Self::default().with_overrides(|key| match key {
            "RECARIA_CENTER_LAT" => option_env!("RECARIA_CENTER_LAT"),
            "RECARIA_CENTER_LNG" => option_env!("RECARIA_CENTER_LNG"),
            "RECARIA_FETCH_RADIUS_M" => option_env!("RECARIA_FETCH_RADIUS_M"),
            "RECARIA_REFETCH_THRESHOLD" => option_env!("RECARIA_REFETCH_THRESHOLD"),
            "RECARIA_INITIAL_ZOOM" => option_env!("RECARIA_INITIAL_ZOOM"),
            "RECARIA_SAVE_INTERVAL_MS" => option_env!("RECARIA_SAVE_INTERVAL_MS"),
            "RECARIA_INTERACT_RANGE_M" => option_env!("RECARIA_INTERACT_RANGE_M"),
            "RECARIA_TILE_URL" => option_env!("RECARIA_TILE_URL"),
            "RECARIA_API_ORIGIN" => option_env!("RECARIA_API_ORIGIN"),
            _ => None,
        })
    }

    /// Apply overrides from `lookup`. Values that fail to parse or are out of
    /// range are logged and the current value is kept.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<&'static str>) -> Self {
        let lat = parse_or(&lookup, "RECARIA_CENTER_LAT", self.default_center.lat, |v| {
            (-90.0..=90.0).contains(v)
        });
        let lng = parse_or(&lookup, "RECARIA_CENTER_LNG", self.default_center.lng, |v| {
            (-180.0..=180.0).contains(v)
        });
        self.default_center = LatLng::new(lat, lng);
        self.fetch_radius_m =
            parse_or(&lookup, "RECARIA_FETCH_RADIUS_M", self.fetch_radius_m, |v| *v > 0.0);
        self.refetch_threshold = parse_or(
            &lookup,
            "RECARIA_REFETCH_THRESHOLD",
            self.refetch_threshold,
            |v| *v > 0.0 && *v <= 1.0,
        );
        let (min, max) = (self.min_zoom, self.max_zoom);
        self.initial_zoom = parse_or(&lookup, "RECARIA_INITIAL_ZOOM", self.initial_zoom, |v| {
            (min..=max).contains(v)
        });
        self.save_interval_ms =
            parse_or(&lookup, "RECARIA_SAVE_INTERVAL_MS", self.save_interval_ms, |v| *v >= 1_000);
        self.interact_range_m =
            parse_or(&lookup, "RECARIA_INTERACT_RANGE_M", self.interact_range_m, |v| *v > 0.0);

        if let Some(url) = lookup("RECARIA_TILE_URL") {
            if ["{z}", "{x}", "{y}"].iter().all(|p| url.contains(p)) {
                self.tile_url_template = url;
            } else {
                tracing::warn!("RECARIA_TILE_URL lacks {{z}}/{{x}}/{{y}} placeholders, using default");
            }
        }
        if let Some(origin) = lookup("RECARIA_API_ORIGIN") {
            let origin = origin.trim_end_matches('/');
            self.api_origin = (!origin.is_empty()).then_some(origin);
        }
        self
    }

    pub fn clamp_zoom(&self, zoom: i32) -> u8 {
        zoom.clamp(self.min_zoom as i32, self.max_zoom as i32) as u8
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<&'static str>,
    key: &str,
    current: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return current;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            tracing::warn!("ignoring {key}={raw:?}, keeping {current}");
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(pairs: &'static [(&'static str, &'static str)]) -> GameConfig {
        GameConfig::default().with_overrides(|key| {
            pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
        })
    }

    #[test]
    fn test_defaults() {
        let c = GameConfig::default();
        assert_eq!(c.default_center, LatLng::new(37.031, 27.303));
        assert_eq!(c.fetch_radius_m, 150.0);
        assert_eq!(c.refetch_threshold, 0.6);
        assert_eq!(c.initial_zoom, 18);
        assert_eq!(c.save_interval_ms, 30_000);
        assert_eq!(c.log_capacity, 50);
        assert!(c.api_origin.is_none());
    }

    #[test]
    fn test_no_overrides_is_default() {
        assert_eq!(with(&[]), GameConfig::default());
    }

    #[test]
    fn test_valid_overrides_apply() {
        let c = with(&[
            ("RECARIA_CENTER_LAT", "51.5"),
            ("RECARIA_CENTER_LNG", " -0.12 "),
            ("RECARIA_FETCH_RADIUS_M", "300"),
            ("RECARIA_INITIAL_ZOOM", "16"),
            ("RECARIA_API_ORIGIN", "https://api.example.com/"),
        ]);
        assert_eq!(c.default_center, LatLng::new(51.5, -0.12));
        assert_eq!(c.fetch_radius_m, 300.0);
        assert_eq!(c.initial_zoom, 16);
        assert_eq!(c.api_origin, Some("https://api.example.com"));
    }

    #[test]
    fn test_invalid_overrides_fall_back() {
        let c = with(&[
            ("RECARIA_CENTER_LAT", "north"),
            ("RECARIA_FETCH_RADIUS_M", "-5"),
            ("RECARIA_REFETCH_THRESHOLD", "1.5"),
            ("RECARIA_INITIAL_ZOOM", "3"),
            ("RECARIA_SAVE_INTERVAL_MS", "10"),
            ("RECARIA_TILE_URL", "https://tiles.example.com/tile.png"),
        ]);
        assert_eq!(c, GameConfig::default());
    }

    #[test]
    fn test_tile_url_with_placeholders_applies() {
        let c = with(&[("RECARIA_TILE_URL", "https://t.example.com/{z}/{x}/{y}.png")]);
        assert_eq!(c.tile_url_template, "https://t.example.com/{z}/{x}/{y}.png");
    }

    #[test]
    fn test_clamp_zoom() {
        let c = GameConfig::default();
        assert_eq!(c.clamp_zoom(25), 20);
        assert_eq!(c.clamp_zoom(-1), 15);
        assert_eq!(c.clamp_zoom(17), 17);
    }
}
