use dioxus::prelude::*;

use crate::state::AppState;

#[component]
pub fn Hud(state: AppState) -> Element {
    let player = state.player.read();
    let position = *state.player_position.read();
    let connection = *state.connection.read();

    rsx! {
        div { class: "hud panel",
            div { class: "hud-stats",
                div { class: "stat",
                    span { class: "stat-label", "Level" }
                    span { id: "player-level", class: "stat-value", "{player.level}" }
                }
                div { class: "stat",
                    span { class: "stat-label", "Score" }
                    span { id: "player-score", class: "stat-value", "{player.score}" }
                }
                div { class: "stat",
                    span { class: "stat-label", "Explored" }
                    span { id: "player-exploration", class: "stat-value", "{player.exploration}%" }
                }
            }
            div { class: "hud-location",
                span { class: "stat-label", "Position" }
                span { id: "current-coords", "{position}" }
            }
            div { class: "connection-status",
                span {
                    id: "connection-indicator",
                    class: "connection-indicator {connection.css_class()}",
                }
                span { id: "connection-text", "{connection.label()}" }
            }
        }
    }
}
