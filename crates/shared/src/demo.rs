//! Synthetic neighbourhood shown when the geo endpoint cannot be reached, so
//! the map is never empty. Offsets are fractions of the fetch radius, in
//! metres east/north of the center, so every vertex stays inside the radius.

use crate::features::{Geometry, MapFeature, Position};
use crate::geo::LatLng;

fn at(center: LatLng, radius_m: f64, east: f64, north: f64) -> Position {
    center
        .offset_meters(east * radius_m, north * radius_m)
        .to_position()
}

fn square(center: LatLng, radius_m: f64, from: (f64, f64), to: (f64, f64)) -> Vec<Position> {
    vec![
        at(center, radius_m, from.0, from.1),
        at(center, radius_m, from.0, to.1),
        at(center, radius_m, to.0, to.1),
        at(center, radius_m, to.0, from.1),
        at(center, radius_m, from.0, from.1),
    ]
}

/// Two roads, two buildings and one point of interest around `center`.
/// Deterministic: the same inputs always give the same features.
pub fn demo_features(center: LatLng, radius_m: f64) -> Vec<MapFeature> {
    let r = radius_m;
    vec![
        MapFeature::new(
            Geometry::LineString {
                coordinates: vec![
                    at(center, r, -0.6, -0.6),
                    at(center, r, 0.0, 0.0),
                    at(center, r, 0.6, 0.6),
                ],
            },
            "road",
            "Main Street",
            None,
        ),
        MapFeature::new(
            Geometry::LineString {
                coordinates: vec![at(center, r, -0.3, 0.0), at(center, r, 0.3, 0.0)],
            },
            "road",
            "Side Street",
            None,
        ),
        MapFeature::new(
            Geometry::Polygon {
                coordinates: vec![square(center, r, (-0.2, -0.2), (-0.07, -0.07))],
            },
            "building",
            "Market",
            None,
        ),
        MapFeature::new(
            Geometry::Polygon {
                coordinates: vec![square(center, r, (0.07, 0.07), (0.2, 0.2))],
            },
            "building",
            "Cafe",
            None,
        ),
        MapFeature::new(
            Geometry::Point {
                coordinates: at(center, r, 0.0, 0.37),
            },
            "point",
            "Point of Interest",
            Some("An important place"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureLayer, LayerSet};
    use crate::geo::haversine_distance;
    use proptest::prelude::*;

    fn vertices(feature: &MapFeature) -> Vec<Position> {
        match &feature.geometry {
            Geometry::LineString { coordinates } => coordinates.clone(),
            Geometry::Polygon { coordinates } => coordinates.concat(),
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::Unsupported => vec![],
        }
    }

    #[test]
    fn test_demo_has_every_geometry_kind() {
        let set = LayerSet::from_features(demo_features(LatLng::new(37.031, 27.303), 150.0));
        for layer in FeatureLayer::ALL {
            assert!(!set.layer(layer).is_empty(), "{layer:?} is empty");
        }
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_demo_is_deterministic() {
        let c = LatLng::new(37.031, 27.303);
        assert_eq!(demo_features(c, 150.0), demo_features(c, 150.0));
    }

    #[test]
    fn test_demo_matches_default_layout_near_bodrum() {
        // 90m north at the default radius is a little under 0.001°
        let c = LatLng::new(37.031, 27.303);
        let features = demo_features(c, 150.0);
        let road = vertices(&features[0]);
        assert!((road[2][1] - c.lat - 0.0008).abs() < 0.0001);
        assert_eq!(features[4].describe(), "POINT: Point of Interest - An important place");
    }

    #[test]
    fn test_polygons_are_closed_rings() {
        let features = demo_features(LatLng::new(0.0, 0.0), 150.0);
        for f in &features {
            if let Geometry::Polygon { coordinates } = &f.geometry {
                let ring = &coordinates[0];
                assert_eq!(ring.first(), ring.last());
            }
        }
    }

    proptest! {
        #[test]
        fn prop_demo_vertices_within_radius(
            lat in -80.0f64..80.0, lng in -179.0f64..179.0, radius in 10.0f64..5_000.0,
        ) {
            let center = LatLng::new(lat, lng);
            for feature in demo_features(center, radius) {
                for v in vertices(&feature) {
                    let d = haversine_distance(center, LatLng::from_position(v));
                    prop_assert!(d <= radius, "{} m from center with radius {}", d, radius);
                }
            }
        }
    }
}
