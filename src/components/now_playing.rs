use crate::api::{MpdCommand, SongInfo};
use crate::components::{Icon, PanelActions};
use crate::state::{PanelState, Toggle};
use dioxus::prelude::*;

/// Cover art and tags of the current song. Clicking the cover toggles playback.
#[component]
pub fn NowPlayingCard() -> Element {
    let state = use_context::<Signal<PanelState>>();
    let actions = use_context::<PanelActions>();

    let (song, cover_url) = {
        let snapshot = state.read();
        (
            snapshot.current.clone().unwrap_or_default(),
            snapshot.cover_url.clone(),
        )
    };
    let title = song.title_text().to_string();
    let artist = song.artist_text().to_string();
    let album = song.album_text().to_string();

    rsx! {
        section { class: "now-playing",
            div {
                class: "cover",
                onclick: move |_| actions.toggle(Toggle::Playback),
                if let Some(src) = cover_url.as_ref() {
                    img {
                        id: "coverimg",
                        src: "{src}",
                        alt: "{album}",
                        draggable: "false",
                    }
                } else {
                    div { id: "coverimg", class: "cover-placeholder",
                        Icon { name: "music".to_string(), class: "icon icon-lg".to_string() }
                    }
                }
            }
            div { class: "song-tags",
                h1 { id: "song-title", class: "song-title", "{title}" }
                p { id: "song-artist", class: "song-artist", "{artist}" }
                p { id: "song-album", class: "song-album", "{album}" }
            }
        }
    }
}

/// The queued next song. Clicking it skips ahead.
#[component]
pub fn NextSongCard() -> Element {
    let state = use_context::<Signal<PanelState>>();
    let actions = use_context::<PanelActions>();

    let next: SongInfo = state.read().next.clone().unwrap_or_default();
    let title = next.title_text().to_string();
    let artist = next.artist_text().to_string();
    let album = next.album_text().to_string();

    rsx! {
        button {
            id: "next-song",
            r#type: "button",
            class: "next-song",
            onclick: move |_| actions.send(MpdCommand::Next),
            onmousedown: move |evt: MouseEvent| evt.prevent_default(),
            span { class: "next-label", "Up next" }
            span { id: "song-title-next", class: "next-title", "{title}" }
            span { id: "song-artist-next", class: "next-artist", "{artist}" }
            span { id: "song-album-next", class: "next-album", "{album}" }
        }
    }
}
