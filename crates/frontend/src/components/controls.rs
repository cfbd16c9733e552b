use dioxus::prelude::*;
use recaria_shared::features::FeatureLayer;

use crate::state::AppState;

#[component]
pub fn Controls(state: AppState) -> Element {
    let mut visibility = state.visibility;
    let current = *visibility.read();

    rsx! {
        div { class: "controls panel",
            div { class: "action-buttons",
                button { id: "btn-explore", onclick: move |_| state.explore(), "Explore" }
                button { id: "btn-interact", onclick: move |_| state.interact(), "Interact" }
                button { id: "btn-inventory", onclick: move |_| state.show_inventory(), "Inventory" }
            }
            div { class: "layer-toggles",
                h3 { "Layers" }
                for layer in FeatureLayer::ALL {
                    label { class: "toggle",
                        input {
                            id: layer.toggle_id(),
                            r#type: "checkbox",
                            checked: current.is_visible(layer),
                            onchange: move |_| {
                                let on = !visibility.peek().is_visible(layer);
                                visibility.write().set(layer, on);
                                tracing::debug!(?layer, on, "layer toggled");
                            },
                        }
                        " {layer.label()}"
                    }
                }
            }
        }
    }
}
