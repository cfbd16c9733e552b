use recaria_shared::features::{Geometry, LayerSet, LayerVisibility, MapFeature};
use recaria_shared::geo::{LatLng, Viewport};

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Container-relative position of a client-coordinate event, using the live
/// bounding rect of `container_id`.
pub fn click_to_container(client_x: f64, client_y: f64, container_id: &str) -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    Some(client_to_container(client_x, client_y, rect.left(), rect.top()))
}

pub fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point_distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    point_distance(p, (a.0 + t * dx, a.1 + t * dy))
}

/// Even-odd ray cast.
pub fn point_in_polygon(p: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polyline_distance(p: (f64, f64), pts: &[(f64, f64)]) -> Option<f64> {
    match pts {
        [] => None,
        [only] => Some(point_distance(p, *only)),
        _ => pts
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .min_by(|a, b| a.total_cmp(b)),
    }
}

/// Screen-space distance from `click` to a feature's drawn shape. Zero
/// inside a polygon.
pub fn feature_screen_distance(viewport: &Viewport, feature: &MapFeature, click: (f64, f64)) -> Option<f64> {
    let to_screen = |p: &[f64; 2]| viewport.to_screen(LatLng::from_position(*p));
    match &feature.geometry {
        Geometry::Point { coordinates } => Some(point_distance(click, to_screen(coordinates))),
        Geometry::LineString { coordinates } => {
            let pts: Vec<_> = coordinates.iter().map(to_screen).collect();
            polyline_distance(click, &pts)
        }
        Geometry::Polygon { coordinates } => {
            let ring: Vec<_> = coordinates.first()?.iter().map(to_screen).collect();
            if point_in_polygon(click, &ring) {
                Some(0.0)
            } else {
                polyline_distance(click, &ring)
            }
        }
        Geometry::Unsupported => None,
    }
}

/// The visible feature drawn closest to `click`, within `threshold` pixels.
pub fn find_nearest_feature<'a>(
    viewport: &Viewport,
    layers: &'a LayerSet,
    visibility: LayerVisibility,
    click: (f64, f64),
    threshold: f64,
) -> Option<&'a MapFeature> {
    let mut best = None;
    let mut best_dist = threshold;
    for (_, feature) in layers.visible(visibility) {
        let Some(dist) = feature_screen_distance(viewport, feature, click) else {
            continue;
        };
        if dist <= best_dist {
            best_dist = dist;
            best = Some(feature);
        }
    }
    best
}
