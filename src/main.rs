use dioxus::prelude::*;

mod api;
mod components;
mod config;
mod controller;
mod state;

use components::Panel;

const PANEL_CSS: Asset = asset!("/assets/styling/panel.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(config::load_config);

    rsx! {
        document::Title { "MPD" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        document::Meta { name: "theme-color", content: "#1d1f21" }
        document::Stylesheet { href: PANEL_CSS }

        Panel {}
    }
}
