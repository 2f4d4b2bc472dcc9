use crate::api::MpdCommand;
use crate::components::PanelActions;
use crate::state::{PanelState, PlaylistRow};
use dioxus::prelude::*;

#[component]
pub fn PlaylistView() -> Element {
    let state = use_context::<Signal<PanelState>>();
    let (rows, progress) = {
        let snapshot = state.read();
        (snapshot.playlist.clone(), snapshot.queue_progress())
    };

    rsx! {
        section { class: "queue",
            header { class: "queue-header",
                h2 { "Queue" }
                span { class: "queue-meta", "{progress}" }
            }
            div { id: "playlist",
                ul { class: "list-group",
                    for row in rows {
                        PlaylistItem { key: "{row.position}", row }
                    }
                }
            }
        }
    }
}

/// One queue entry; clicking it plays that position.
#[component]
fn PlaylistItem(row: PlaylistRow) -> Element {
    let actions = use_context::<PanelActions>();
    let position = row.position;

    rsx! {
        li {
            class: if row.active { "list-group-item active" } else { "list-group-item" },
            onclick: move |_| actions.send(MpdCommand::Play(position)),
            onmousedown: move |evt: MouseEvent| evt.prevent_default(),
            "{row.label}"
        }
    }
}
