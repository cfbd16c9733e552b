use dioxus::prelude::*;
use futures::StreamExt;
use gloo_timers::future::{IntervalStream, TimeoutFuture};
use recaria_shared::config::GameConfig;

use crate::components::controls::Controls;
use crate::components::game_log::GameLogPanel;
use crate::components::game_overlay::GameOverlay;
use crate::components::hud::Hud;
use crate::components::map_view::MapView;
use crate::geolocation::{self, GeoEvent};
use crate::state::use_app_state;

const GAME_STARTED: &str = "Game started. Move around the map to start exploring.";

#[component]
pub fn Game() -> Element {
    let state = use_app_state(GameConfig::from_build_env());
    let config = state.config;

    // Geolocation callbacks arrive from outside the runtime
    let geo = use_coroutine(move |mut rx: UnboundedReceiver<GeoEvent>| async move {
        while let Some(event) = rx.next().await {
            state.on_geo_event(event);
        }
    });

    // One-time startup: first fetch at the default center, position
    // tracking, delayed player load, periodic local save.
    use_hook(move || {
        tracing::info!(
            center = %config.default_center,
            radius_m = config.fetch_radius_m,
            zoom = config.initial_zoom,
            "starting game"
        );
        spawn(state.fetch_features(config.default_center));
        geolocation::start(geo.tx());

        spawn(async move {
            TimeoutFuture::new(config.startup_delay_ms).await;
            state.log(GAME_STARTED);
            state.load_player_data().await;
        });

        spawn(async move {
            let mut ticks = IntervalStream::new(config.save_interval_ms);
            while ticks.next().await.is_some() {
                state.save_local();
            }
        });
    });

    rsx! {
        div {
            class: "game-root",
            onpointerdown: move |evt: Event<PointerData>| {
                let client = evt.client_coordinates();
                state.on_pointer_down(client.x, client.y);
            },

            header { class: "game-header",
                h1 { "Recaria" }
                Hud { state }
            }

            div { class: "game-main",
                MapView { state }
                aside { class: "game-sidebar",
                    Controls { state }
                    GameLogPanel { state }
                }
            }

            GameOverlay { state }
        }
    }
}
