use crate::api::{events, MpdClient};
use crate::components::{
    ModeToggles, NextSongCard, NowPlayingCard, PanelActions, PlaylistView, TransportControls,
};
use crate::config::PanelConfig;
use crate::controller::RefreshScope;
use crate::state::PanelState;
#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::window;

#[component]
pub fn Panel() -> Element {
    let config = use_context::<PanelConfig>();
    let state = use_signal(PanelState::default);
    let actions = use_hook(|| PanelActions::new(MpdClient::new(&config), state));
    let visible_ticks = use_signal(|| 0u64);

    use_context_provider(|| state);
    use_context_provider(|| actions.clone());

    // Initial load, then again whenever the tab comes back into view.
    {
        let actions = actions.clone();
        use_effect(move || {
            let _ = visible_ticks();
            actions.refresh(RefreshScope::All);
        });
    }

    #[cfg(target_arch = "wasm32")]
    use_hook(move || watch_visibility(visible_ticks));

    // Live updates for as long as the panel is mounted.
    {
        let actions = actions.clone();
        let reconnect_delay_ms = config.reconnect_delay_ms;
        use_hook(move || {
            spawn(async move {
                let url = actions.client().events_url();
                let result = events::watch(&url, reconnect_delay_ms, || {
                    actions.refresh_now(RefreshScope::All)
                })
                .await;
                if let Err(err) = result {
                    tracing::warn!(error = %err, "live updates disabled");
                }
            })
        });
    }

    rsx! {
        main { class: "panel",
            div { class: "panel-player",
                NowPlayingCard {}
                TransportControls {}
                ModeToggles {}
                NextSongCard {}
            }
            PlaylistView {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn watch_visibility(mut visible_ticks: Signal<u64>) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    let runtime = Runtime::current();
    let doc = document.clone();
    let callback = Closure::wrap(Box::new(move || {
        if doc.visibility_state() != web_sys::VisibilityState::Visible {
            return;
        }
        let _guard = RuntimeGuard::new(runtime.clone());
        let next = *visible_ticks.peek() + 1;
        visible_ticks.set(next);
    }) as Box<dyn FnMut()>);

    let _ = document
        .add_event_listener_with_callback("visibilitychange", callback.as_ref().unchecked_ref());
    callback.forget();
}
