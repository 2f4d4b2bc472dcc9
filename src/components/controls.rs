use crate::api::{Mode, MpdCommand};
use crate::components::{Icon, PanelActions};
use crate::state::{mode_opacity, PanelState, Toggle};
use dioxus::prelude::*;

/// Previous, play/pause and next.
#[component]
pub fn TransportControls() -> Element {
    let state = use_context::<Signal<PanelState>>();
    let actions = use_context::<PanelActions>();
    let playing = state.read().playing;

    let on_prev = {
        let actions = actions.clone();
        move |_| actions.send(MpdCommand::Previous)
    };
    let on_toggle = {
        let actions = actions.clone();
        move |_| actions.toggle(Toggle::Playback)
    };
    let on_next = move |_| actions.send(MpdCommand::Next);

    rsx! {
        div { class: "transport",
            button {
                id: "prev",
                r#type: "button",
                class: "control-btn",
                title: "Previous",
                onclick: on_prev,
                Icon { name: "prev".to_string(), class: "icon".to_string() }
            }
            button {
                id: "toggle",
                r#type: "button",
                class: "control-btn control-btn--main",
                title: if playing { "Pause" } else { "Play" },
                onclick: on_toggle,
                Icon {
                    name: if playing { "pause".to_string() } else { "play".to_string() },
                    class: "icon icon-md".to_string(),
                }
            }
            button {
                id: "next",
                r#type: "button",
                class: "control-btn",
                title: "Next",
                onclick: on_next,
                Icon { name: "next".to_string(), class: "icon".to_string() }
            }
        }
    }
}

/// Repeat, consume and random indicators, plus queue shuffle.
#[component]
pub fn ModeToggles() -> Element {
    let actions = use_context::<PanelActions>();

    rsx! {
        div { class: "modes",
            for mode in Mode::ALL {
                ModeButton { key: "{mode:?}", mode }
            }
            button {
                id: "shuf-play",
                r#type: "button",
                class: "control-btn",
                title: "Shuffle queue",
                onclick: move |_| actions.send(MpdCommand::Shuffle),
                Icon { name: "list-shuffle".to_string(), class: "icon".to_string() }
            }
        }
    }
}

#[component]
fn ModeButton(mode: Mode) -> Element {
    let state = use_context::<Signal<PanelState>>();
    let actions = use_context::<PanelActions>();
    let enabled = state.read().modes.get(mode);
    let opacity = mode_opacity(enabled);
    let label = mode.as_str();

    rsx! {
        button {
            id: "{label}",
            r#type: "button",
            class: "control-btn",
            title: "{label}",
            aria_pressed: "{enabled}",
            style: "opacity: {opacity}",
            onclick: move |_| actions.toggle(Toggle::Mode(mode)),
            Icon { name: mode.icon().to_string(), class: "icon".to_string() }
        }
    }
}
