use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use recaria_shared::features::{Geometry, LayerSet, LayerVisibility, MapFeature, Position};
use recaria_shared::geo::{tile_url, LatLng, Viewport, TILE_SIZE_PX};

use crate::coords;
use crate::state::AppState;

pub const MAP_CONTAINER_ID: &str = "map";

/// Pointer movement below this many pixels is still a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch movement below this many pixels is still a tap.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// How far from a drawn shape a click or hover still counts as hitting it.
const HIT_TOLERANCE_PX: f64 = 10.0;

// --- Layer styles for SVG shapes ---

struct LayerStyle {
    stroke: &'static str,
    fill: &'static str,
    stroke_width: f64,
}

const BUILDING_STYLE: LayerStyle = LayerStyle {
    stroke: "#ff7800",
    fill: "rgba(255,120,0,0.35)",
    stroke_width: 2.0,
};

const ROAD_STYLE: LayerStyle = LayerStyle {
    stroke: "#3388ff",
    fill: "none",
    stroke_width: 4.0,
};

const POINT_STYLE: LayerStyle = LayerStyle {
    stroke: "#000000",
    fill: "#ff3860",
    stroke_width: 1.5,
};

const POINT_RADIUS: f64 = 8.0;
const PLAYER_RADIUS: f64 = 10.0;

// ---------------------------------------------------------------------------
// Drag / pan (pure, easily testable)
// ---------------------------------------------------------------------------

/// An in-progress press on the map: a click until it moves past the
/// threshold, a pan afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start: (f64, f64),
    start_viewport: Viewport,
    threshold: f64,
    moved: bool,
}

impl DragState {
    fn new(start: (f64, f64), viewport: Viewport, threshold: f64) -> Self {
        Self {
            start,
            start_viewport: viewport,
            threshold,
            moved: false,
        }
    }

    /// The panned viewport, once the press has become a drag.
    fn update(&mut self, at: (f64, f64)) -> Option<Viewport> {
        let dx = at.0 - self.start.0;
        let dy = at.1 - self.start.1;
        if !self.moved && (dx.abs() > self.threshold || dy.abs() > self.threshold) {
            self.moved = true;
        }
        self.moved.then(|| self.start_viewport.panned_by(dx, dy))
    }
}

/// Convert a wheel delta (pixels / lines / pages) to a zoom step.
fn wheel_zoom_step(delta: WheelDelta) -> i32 {
    let y = match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y,
        WheelDelta::Pages(d) => d.y,
    };
    if y < 0.0 {
        1
    } else if y > 0.0 {
        -1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn screen_points(viewport: &Viewport, positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| {
            let (x, y) = viewport.to_screen(LatLng::from_position(*p));
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the full SVG content as a string for reliable rendering.
/// Coordinates are viewport pixels.
fn build_svg_content(
    viewport: &Viewport,
    layers: &LayerSet,
    visibility: LayerVisibility,
    player: LatLng,
) -> String {
    let mut svg = String::with_capacity(8192);
    if visibility.buildings {
        build_buildings(&mut svg, viewport, &layers.buildings);
    }
    if visibility.roads {
        build_roads(&mut svg, viewport, &layers.roads);
    }
    if visibility.points {
        build_points(&mut svg, viewport, &layers.points);
    }
    build_player_marker(&mut svg, viewport, player);
    svg
}

fn build_buildings(svg: &mut String, viewport: &Viewport, features: &[MapFeature]) {
    let LayerStyle {
        stroke,
        fill,
        stroke_width,
    } = BUILDING_STYLE;
    for feature in features {
        let Geometry::Polygon { coordinates } = &feature.geometry else {
            continue;
        };
        let Some(ring) = coordinates.first() else {
            continue;
        };
        let points = screen_points(viewport, ring);
        let title = escape_xml(feature.name());
        svg.push_str(&format!(
            r#"<polygon class="feature building" points="{points}" fill="{fill}" stroke="{stroke}" stroke-width="{stroke_width}"><title>{title}</title></polygon>"#
        ));
    }
}

fn build_roads(svg: &mut String, viewport: &Viewport, features: &[MapFeature]) {
    let LayerStyle {
        stroke,
        fill,
        stroke_width,
    } = ROAD_STYLE;
    for feature in features {
        let Geometry::LineString { coordinates } = &feature.geometry else {
            continue;
        };
        let points = screen_points(viewport, coordinates);
        let title = escape_xml(feature.name());
        svg.push_str(&format!(
            r#"<polyline class="feature road" points="{points}" fill="{fill}" stroke="{stroke}" stroke-width="{stroke_width}" stroke-linecap="round" stroke-linejoin="round"><title>{title}</title></polyline>"#
        ));
    }
}

fn build_points(svg: &mut String, viewport: &Viewport, features: &[MapFeature]) {
    let LayerStyle {
        stroke,
        fill,
        stroke_width,
    } = POINT_STYLE;
    for feature in features {
        let Geometry::Point { coordinates } = &feature.geometry else {
            continue;
        };
        let (cx, cy) = viewport.to_screen(LatLng::from_position(*coordinates));
        let title = escape_xml(feature.name());
        svg.push_str(&format!(
            r#"<circle class="feature point" cx="{cx:.1}" cy="{cy:.1}" r="{POINT_RADIUS}" fill="{fill}" stroke="{stroke}" stroke-width="{stroke_width}"><title>{title}</title></circle>"#
        ));
    }
}

fn build_player_marker(svg: &mut String, viewport: &Viewport, player: LatLng) {
    let (cx, cy) = viewport.to_screen(player);
    let halo = PLAYER_RADIUS * 2.0;
    svg.push_str(&format!(
        r##"<g class="player-marker"><circle cx="{cx:.1}" cy="{cy:.1}" r="{halo}" fill="rgba(74,143,212,0.2)"/><circle cx="{cx:.1}" cy="{cy:.1}" r="{PLAYER_RADIUS}" fill="#4a8fd4" stroke="white" stroke-width="3"/><title>You are here</title></g>"##
    ));
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Tooltip {
    text: String,
    x: f64,
    y: f64,
}

#[component]
pub fn MapView(state: AppState) -> Element {
    let mut viewport = state.viewport;
    let mut drag = use_signal(|| None::<DragState>);
    let mut hover = use_signal(|| None::<Tooltip>);

    // Memoized SVG: rebuilt when the viewport, features,
    // layer toggles or player position change.
    let svg_html = use_memo(move || {
        let vp = *state.viewport.read();
        let content = build_svg_content(
            &vp,
            &state.layers.read(),
            *state.visibility.read(),
            *state.player_position.read(),
        );
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="position:absolute;top:0;left:0;pointer-events:none;z-index:5;">{content}</svg>"#,
            w = vp.width,
            h = vp.height,
        )
    });

    // Hit-test a container-relative position against the visible layers.
    let feature_at = move |at: (f64, f64)| -> Option<MapFeature> {
        let vp = *state.viewport.peek();
        let layers = state.layers.peek();
        coords::find_nearest_feature(&vp, &layers, *state.visibility.peek(), at, HIT_TOLERANCE_PX)
            .cloned()
    };

    let mut press = move |client: (f64, f64), threshold: f64| {
        drag.set(Some(DragState::new(client, *viewport.peek(), threshold)));
    };

    let mut move_to = move |client: (f64, f64)| -> bool {
        let Some(mut d) = *drag.peek() else {
            return false;
        };
        if let Some(panned) = d.update(client) {
            viewport.set(panned);
            hover.set(None);
        }
        drag.set(Some(d));
        true
    };

    // End of a press: a pan triggers the refetch check, a click hits features.
    let mut release = move |client: (f64, f64)| {
        let Some(d) = drag.take() else { return };
        if d.moved {
            state.on_move_end();
        } else if let Some(at) = coords::click_to_container(client.0, client.1, MAP_CONTAINER_ID) {
            if let Some(feature) = feature_at(at) {
                state.on_feature_click(&feature);
            }
        }
    };

    let vp = *viewport.read();
    let tiles = vp.visible_tiles();
    let container_class = match *drag.read() {
        Some(d) if d.moved => "map-container dragging",
        _ => "map-container",
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onmounted: move |_| state.on_resize(),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let step = wheel_zoom_step(evt.data().delta());
                if step != 0 {
                    state.zoom_by(step);
                }
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Only track drag/click for left mouse button
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                press((client.x, client.y), DRAG_THRESHOLD);
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                if move_to((client.x, client.y)) {
                    return;
                }
                let Some(at) = coords::click_to_container(client.x, client.y, MAP_CONTAINER_ID) else {
                    return;
                };
                let tip = feature_at(at).map(|f| Tooltip {
                    text: f.name().to_string(),
                    x: at.0,
                    y: at.1,
                });
                if *hover.peek() != tip {
                    hover.set(tip);
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                release((client.x, client.y));
            },

            onmouseleave: move |_| {
                if let Some(d) = drag.take() {
                    if d.moved {
                        state.on_move_end();
                    }
                }
                hover.set(None);
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                let touches = evt.data().touches();
                if let [t] = touches.as_slice() {
                    evt.prevent_default();
                    let c = t.client_coordinates();
                    press((c.x, c.y), TOUCH_DRAG_THRESHOLD);
                } else {
                    drag.set(None);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                if let [t] = evt.data().touches().as_slice() {
                    evt.prevent_default();
                    let c = t.client_coordinates();
                    move_to((c.x, c.y));
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                if !evt.data().touches().is_empty() {
                    return;
                }
                // A tap lands where it started
                let start = drag.peek().as_ref().map(|d| d.start);
                if let Some(start) = start {
                    release(start);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                drag.set(None);
            },

            div { class: "map-tiles",
                for (tile, left, top) in tiles {
                    img {
                        key: "{tile.z}-{tile.x}-{tile.y}-{left}",
                        class: "map-tile",
                        src: tile_url(state.config.tile_url_template, tile),
                        draggable: "false",
                        alt: "",
                        style: "left: {left}px; top: {top}px; width: {TILE_SIZE_PX}px; height: {TILE_SIZE_PX}px;",
                    }
                }
            }

            div {
                class: "map-features",
                dangerous_inner_html: "{svg_html}",
            }

            if let Some(tip) = hover.read().as_ref() {
                div {
                    class: "feature-tooltip",
                    style: "left: {tip.x + 12.0}px; top: {tip.y + 12.0}px;",
                    "{tip.text}"
                }
            }

            // Zoom / center controls (outside the drag handling)
            div {
                class: "map-controls",
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                ontouchstart: move |evt: Event<TouchData>| evt.stop_propagation(),
                button { id: "btn-zoom-in", title: "Zoom in", onclick: move |_| state.zoom_by(1), "+" }
                button { id: "btn-zoom-out", title: "Zoom out", onclick: move |_| state.zoom_by(-1), "\u{2212}" }
                button { id: "btn-center-map", title: "Center on me", onclick: move |_| state.center_on_player(), "\u{25ce}" }
            }

            div { class: "map-attribution", "\u{00a9} OpenStreetMap contributors" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recaria_shared::demo::demo_features;
    use recaria_shared::features::FeatureLayer;

    fn viewport() -> Viewport {
        Viewport {
            center: LatLng::new(37.031, 27.303),
            zoom: 18,
            width: 800.0,
            height: 600.0,
        }
    }

    fn demo_layers() -> LayerSet {
        LayerSet::from_features(demo_features(viewport().center, 150.0))
    }

    // --- build_svg_content tests ---

    #[test]
    fn test_svg_draws_every_layer() {
        let svg = build_svg_content(&viewport(), &demo_layers(), LayerVisibility::default(), viewport().center);
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches(r#"class="feature point""#).count(), 1);
        assert!(svg.contains("<title>Main Street</title>"));
        assert!(svg.contains(r#"class="player-marker""#));
    }

    #[test]
    fn test_svg_omits_hidden_layers() {
        let mut vis = LayerVisibility::default();
        vis.set(FeatureLayer::Roads, false);
        let svg = build_svg_content(&viewport(), &demo_layers(), vis, viewport().center);
        assert!(!svg.contains("<polyline"));
        assert_eq!(svg.matches("<polygon").count(), 2);
    }

    #[test]
    fn test_player_marker_at_viewport_center() {
        let vp = viewport();
        let mut svg = String::new();
        build_player_marker(&mut svg, &vp, vp.center);
        assert!(svg.contains(r#"cx="400.0""#));
        assert!(svg.contains(r#"cy="300.0""#));
    }

    #[test]
    fn test_feature_names_are_escaped() {
        let f = MapFeature::new(
            Geometry::Point { coordinates: [27.303, 37.031] },
            "point",
            "<script>\"Tom & Jerry's\"</script>",
            None,
        );
        let mut svg = String::new();
        build_points(&mut svg, &viewport(), &[f]);
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/script&gt;"));
    }

    #[test]
    fn test_mismatched_geometry_is_skipped() {
        let f = MapFeature::new(Geometry::Unsupported, "building", "Ghost", None);
        let mut svg = String::new();
        build_buildings(&mut svg, &viewport(), &[f]);
        assert!(svg.is_empty());
    }

    // --- DragState tests ---

    #[test]
    fn test_small_movement_stays_a_click() {
        let mut d = DragState::new((100.0, 100.0), viewport(), DRAG_THRESHOLD);
        assert!(d.update((102.0, 101.0)).is_none());
        assert!(!d.moved);
    }

    #[test]
    fn test_drag_past_threshold_pans() {
        let vp = viewport();
        let mut d = DragState::new((100.0, 100.0), vp, DRAG_THRESHOLD);
        let panned = d.update((150.0, 100.0)).unwrap();
        assert!(d.moved);
        // dragging right moves the center west
        assert!(panned.center.lng < vp.center.lng);
        assert!((panned.center.lat - vp.center.lat).abs() < 1e-9);
        // once moving, even small offsets keep panning
        assert!(d.update((101.0, 100.0)).is_some());
    }

    #[test]
    fn test_drag_is_relative_to_start_viewport() {
        let vp = viewport();
        let mut d = DragState::new((0.0, 0.0), vp, DRAG_THRESHOLD);
        d.update((40.0, 0.0));
        let back = d.update((0.0, 0.0)).unwrap();
        assert!((back.center.lng - vp.center.lng).abs() < 1e-9);
    }

    // --- helpers ---

    #[test]
    fn test_screen_points_format() {
        let vp = viewport();
        let pts = screen_points(&vp, &[vp.center.to_position()]);
        assert_eq!(pts, "400.0,300.0");
    }
}
