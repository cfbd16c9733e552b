use dioxus::prelude::*;
use recaria_shared::demo::demo_features;
use recaria_shared::features::{FeatureLayer, LayerSet, MapFeature};
use recaria_shared::geo::LatLng;
use recaria_shared::scoring::{self, ScoreUpdate};

use crate::api;
use crate::browser;
use crate::components::map_view::MAP_CONTAINER_ID;
use crate::game_controller::level_up_line;
use crate::geolocation::GeoEvent;
use crate::state::AppState;

/// Features are discovered at most once per anchor, within this tolerance.
const SAME_PLACE_M: f64 = 1.0;

impl AppState {
    /// Fetch features around `center`, falling back to demo data on any
    /// failure. Only the most recently issued fetch may replace the layers.
    pub async fn fetch_features(mut self, center: LatLng) {
        let radius = self.config.fetch_radius_m;
        let ticket = self.fetches.write().begin(center);
        self.log("Fetching map data...");

        let features = match self.tracked(api::fetch_geo(&self.config, center, radius)).await {
            Ok(resp) => {
                self.log(format!("Loaded {} map features", resp.features.len()));
                resp.features
            }
            Err(e) => {
                tracing::warn!(%center, "feature fetch failed: {e}");
                self.log(format!("Error fetching map data: {e}"));
                self.log("Using demo data instead");
                demo_features(center, radius)
            }
        };

        if !self.fetches.read().is_current(ticket) {
            tracing::debug!(?ticket, "discarding stale feature fetch");
            return;
        }
        self.render_features(features);
    }

    /// Replace all three layers with `features` and award the render bonus.
    pub fn render_features(mut self, features: Vec<MapFeature>) {
        let layers = LayerSet::from_features(features);
        let count = layers.len();
        tracing::debug!(
            buildings = layers.layer(FeatureLayer::Buildings).len(),
            roads = layers.layer(FeatureLayer::Roads).len(),
            points = layers.layer(FeatureLayer::Points).len(),
            "rendering features"
        );
        self.layers.set(layers);
        self.award(scoring::render_points(count));
    }

    /// Add points to the player, logging a level-up if one happened.
    pub fn award(mut self, points: u32) -> ScoreUpdate {
        let update = self.player.write().add_score(points);
        if let Some(level) = update.level_up {
            self.log(level_up_line(level));
        }
        update
    }

    /// Pan or zoom finished: refetch once the center drifted far enough.
    pub fn on_move_end(self) {
        let center = self.viewport.read().center;
        let should = self.fetches.read().should_refetch(
            center,
            self.config.fetch_radius_m,
            self.config.refetch_threshold,
        );
        if should {
            spawn(self.fetch_features(center));
        }
    }

    pub fn on_feature_click(self, feature: &MapFeature) {
        self.log(feature.describe());
        self.award(scoring::FEATURE_INTERACTION_POINTS);

        let Some(anchor) = feature.anchor() else {
            return;
        };
        let kind = feature.discovery_type();
        let seen = self
            .player
            .read()
            .has_discovered(feature.name(), &kind, anchor, SAME_PLACE_M);
        if !seen {
            self.record_discovery(anchor, feature.name(), kind);
        }
    }

    pub fn zoom_by(mut self, delta: i32) {
        let current = self.viewport.read().zoom;
        let zoom = self.config.clamp_zoom(current as i32 + delta);
        if zoom != current {
            self.viewport.write().zoom = zoom;
            self.on_move_end();
        }
    }

    pub fn center_on_player(mut self) {
        let at = *self.player_position.read();
        self.viewport.write().center = at;
        self.log("Map centered on your location");
        self.on_move_end();
    }

    pub fn on_geo_event(mut self, event: GeoEvent) {
        match event {
            GeoEvent::Fix {
                at,
                accuracy_m,
                initial,
            } => {
                tracing::debug!(%at, accuracy_m, initial, "position fix");
                self.player_position.set(at);
                if initial {
                    self.viewport.write().center = at;
                    self.log(format!("Location found: {at}"));
                    spawn(self.fetch_features(at));
                } else {
                    self.on_move_end();
                }
            }
            GeoEvent::Error(message) => {
                tracing::warn!("geolocation error: {message}");
                self.log(format!("Geolocation error: {message}"));
            }
            GeoEvent::Unsupported => {
                self.log("Geolocation is not supported by your browser");
            }
        }
    }

    /// Match the map viewport and the effect layer to their on-screen size.
    pub fn on_resize(mut self) {
        if let Some((width, height)) = browser::window_size() {
            self.effects.write().resize(width, height);
        }
        if let Some(rect) = browser::element_rect(MAP_CONTAINER_ID) {
            let (width, height) = (rect.width(), rect.height());
            let current = *self.viewport.peek();
            if current.width != width || current.height != height {
                let mut viewport = self.viewport.write();
                viewport.width = width;
                viewport.height = height;
            }
        }
    }
}
