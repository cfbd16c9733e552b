use chrono::Utc;
use dioxus::prelude::*;
use recaria_shared::achievements::{self, GrantedAchievement};
use recaria_shared::geo::LatLng;
use recaria_shared::models::{Discovery, DiscoveryType, InventoryItem, PlayerState};
use recaria_shared::scoring::DiscoveryOutcome;
use recaria_shared::storage::{GameStorage, KeyValueStore};

use crate::api::{self, ApiError};
use crate::browser;
use crate::state::AppState;

const EXPLORED_AREA: &str = "Explored Area";

/// One log line for the inventory button.
pub fn format_inventory(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "Your inventory is empty.".to_string();
    }
    let listed: Vec<String> = items
        .iter()
        .map(|item| format!("{} ({})", item.name, item.kind))
        .collect();
    format!("Inventory: {}", listed.join(", "))
}

pub fn level_up_line(level: u32) -> String {
    format!("Level up! You are now level {level}")
}

/// Log lines for one granted achievement, including the level-up its points caused.
pub fn achievement_lines(granted: &GrantedAchievement) -> Vec<String> {
    let a = granted.achievement;
    let mut lines = vec![format!("Achievement unlocked: {} (+{} points)", a.name, a.points)];
    lines.extend(granted.score.level_up.map(level_up_line));
    lines
}

/// Log lines for a recorded discovery. Each level is announced by the award
/// that reached it: the discovery's own points first, then each achievement.
pub fn discovery_lines(discovery: &Discovery, outcome: &DiscoveryOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "New discovery: {} ({}) - {} points!",
        discovery.name, discovery.kind, outcome.points
    )];
    lines.extend(outcome.score.level_up.map(level_up_line));
    for granted in &outcome.achievements {
        lines.extend(achievement_lines(granted));
    }
    lines
}

/// Put a discovery the backend did not accept on the offline queue.
/// Returns the log line.
pub fn queue_offline<S: KeyValueStore>(storage: &GameStorage<S>, discovery: &Discovery) -> String {
    match storage.enqueue_discovery(discovery) {
        Ok(pending) => {
            tracing::debug!(pending, "queued discovery offline");
            "Discovery saved offline. Will sync when online.".to_string()
        }
        Err(e) => {
            tracing::warn!("could not queue discovery: {e}");
            format!("Could not save discovery offline: {e}")
        }
    }
}

/// Apply the result of uploading the first `sent` queued discoveries.
/// The queue only shrinks on success. Returns the log line.
pub fn settle_sync<S: KeyValueStore>(
    storage: &GameStorage<S>,
    sent: usize,
    result: Result<(), ApiError>,
) -> String {
    match result {
        Ok(()) => {
            if let Err(e) = storage.drain_synced(sent) {
                tracing::warn!("could not clear synced discoveries: {e}");
            }
            format!("Synced {sent} offline discoveries")
        }
        Err(e) => format!("Failed to sync offline discoveries: {e}"),
    }
}

/// The backend could not supply the player: use the local snapshot if any.
pub fn restore_local<S: KeyValueStore>(
    storage: &GameStorage<S>,
    error: &ApiError,
) -> (Option<PlayerState>, Vec<String>) {
    let mut lines = vec![format!("Could not load player data: {error}")];
    let player = storage.load_player();
    if player.is_some() {
        lines.push("Loaded saved player data".to_string());
    }
    (player, lines)
}

impl AppState {
    /// Record a discovery, award its points and unlocked achievements, then
    /// report it to the backend. Unreachable backend: queue it locally.
    pub fn record_discovery(mut self, at: LatLng, name: &str, kind: DiscoveryType) {
        let discovery = Discovery::new(at, name, kind, Utc::now());
        let outcome = self.player.write().record_discovery(discovery.clone());

        for line in discovery_lines(&discovery, &outcome) {
            self.log(line);
        }
        for granted in &outcome.achievements {
            self.show_achievement_popup(granted);
        }

        spawn(async move {
            if let Err(e) = self.tracked(api::post_discovery(&self.config, &discovery)).await {
                tracing::warn!("discovery upload failed: {e}");
                self.log(queue_offline(&browser::game_storage(), &discovery));
            }
        });
    }

    /// Grant whatever the current discoveries now satisfy.
    pub fn evaluate_achievements(mut self) {
        let granted = achievements::evaluate(&mut self.player.write());
        for g in &granted {
            self.show_achievement_popup(g);
            for line in achievement_lines(g) {
                self.log(line);
            }
        }
    }

    fn show_achievement_popup(mut self, granted: &GrantedAchievement) {
        let a = granted.achievement;
        self.effects.write().show_popup(a.name, a.description, a.points);
    }

    /// Push the offline queue in one bulk request. Only the entries that
    /// request carried are removed, and only after a 2xx.
    pub async fn sync_offline_discoveries(self) {
        let storage = browser::game_storage();
        let pending = storage.pending_discoveries();
        if pending.is_empty() {
            return;
        }
        let result = self
            .tracked(api::post_bulk_discoveries(&self.config, &pending))
            .await;
        self.log(settle_sync(&storage, pending.len(), result));
    }

    /// Take the backend's player record, or the local snapshot when the
    /// backend cannot be reached.
    pub async fn load_player_data(mut self) {
        match self.tracked(api::fetch_player(&self.config)).await {
            Ok(player) => {
                self.player.set(player);
                self.log("Player data loaded");
                self.evaluate_achievements();
                self.sync_offline_discoveries().await;
            }
            Err(e) => {
                tracing::warn!("player fetch failed: {e}");
                let (player, lines) = restore_local(&browser::game_storage(), &e);
                for line in lines {
                    self.log(line);
                }
                if let Some(player) = player {
                    self.player.set(player);
                }
            }
        }
    }

    /// Snapshot the player into local storage.
    pub fn save_local(self) {
        if let Err(e) = browser::game_storage().save_player(&self.player.read()) {
            tracing::warn!("could not save player data: {e}");
        }
    }

    pub fn explore(self) {
        let center = self.viewport.read().center;
        self.record_discovery(center, EXPLORED_AREA, DiscoveryType::Area);
    }

    /// Interact with the nearest visible feature in reach of the player.
    pub fn interact(self) {
        let at = *self.player_position.read();
        let nearest = self
            .layers
            .read()
            .nearest_visible(at, *self.visibility.read(), self.config.interact_range_m)
            .cloned();
        match nearest {
            Some(feature) => self.on_feature_click(&feature),
            None => self.log("Nothing to interact with nearby."),
        }
    }

    pub fn show_inventory(self) {
        let line = format_inventory(&self.player.read().inventory);
        self.log(line);
    }

    pub fn on_pointer_down(mut self, x: f64, y: f64) {
        self.effects.write().spawn_click(x, y);
    }
}
