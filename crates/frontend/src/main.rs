mod api;
mod browser;
mod components;
mod coords;
mod game_controller;
mod geolocation;
mod map_controller;
mod pages;
mod state;

use dioxus::prelude::*;

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        pages::game::Game {}
    }
}

fn main() {
    launch(App);
}
