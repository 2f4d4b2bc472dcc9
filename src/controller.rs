//! Refresh and command operations, independent of the UI.
//!
//! Each operation talks to an [`MpdBackend`] and returns the [`PanelUpdate`]s
//! the caller should feed into the panel state.

use crate::api::{ApiError, Mode, MpdBackend, MpdCommand};
use crate::state::{
    playlist_rows, CurrentSong, ModeFlags, PanelUpdate, PlayerView, PlaylistRow, Toggle,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    NowPlaying,
    All,
}

async fn load_current_song<B: MpdBackend>(backend: &B) -> Result<CurrentSong, ApiError> {
    let song = backend.current_song().await?;
    Ok(CurrentSong {
        cover_url: backend.cover_url(song.album_text()),
        song,
    })
}

async fn load_player_view<B: MpdBackend>(backend: &B) -> Result<PlayerView, ApiError> {
    let status = backend.status().await?;

    // MPD omits nextsongid on the last track.
    let next = match status.nextsongid.as_deref() {
        Some(id) => match backend.song_by_id(id).await {
            Ok(song) => Some(song),
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to load next song");
                None
            }
        },
        None => None,
    };

    Ok(PlayerView {
        next,
        playing: status.is_playing(),
        modes: ModeFlags::from_status(&status),
    })
}

/// Loads the current song and the status-derived view side by side. Each one
/// that fails is logged and left out; the other is still returned.
pub async fn refresh_now_playing<B: MpdBackend>(backend: &B) -> Vec<PanelUpdate> {
    let (current, player) =
        futures_util::join!(load_current_song(backend), load_player_view(backend));

    let mut updates = Vec::with_capacity(2);
    match current {
        Ok(current) => updates.push(PanelUpdate::CurrentSong(current)),
        Err(err) => tracing::warn!(error = %err, "current song refresh failed"),
    }
    match player {
        Ok(player) => updates.push(PanelUpdate::Player(player)),
        Err(err) => tracing::warn!(error = %err, "status refresh failed"),
    }
    updates
}

pub async fn refresh_playlist<B: MpdBackend>(backend: &B) -> Result<Vec<PlaylistRow>, ApiError> {
    let (status, entries) = futures_util::join!(backend.status(), backend.playlist());
    let (status, entries) = (status?, entries?);
    Ok(playlist_rows(&entries, status.song_position()))
}

/// Runs the requested refreshes concurrently. Failed refreshes are logged and
/// left out.
pub async fn refresh<B: MpdBackend>(backend: &B, scope: RefreshScope) -> Vec<PanelUpdate> {
    match scope {
        RefreshScope::NowPlaying => refresh_now_playing(backend).await,
        RefreshScope::All => {
            let (mut updates, playlist) =
                futures_util::join!(refresh_now_playing(backend), refresh_playlist(backend));
            match playlist {
                Ok(rows) => {
                    tracing::debug!(rows = rows.len(), "playlist refreshed");
                    updates.push(PanelUpdate::Playlist(rows));
                }
                Err(err) => tracing::warn!(error = %err, "playlist refresh failed"),
            }
            updates
        }
    }
}

pub async fn send_command<B: MpdBackend>(
    backend: &B,
    command: MpdCommand,
) -> Result<PanelUpdate, ApiError> {
    backend.send(&command).await?;
    Ok(PanelUpdate::Sent(command))
}

/// Reads the status and requests the opposite state for `toggle`.
///
/// Returns `Ok(None)` without touching the backend while an earlier toggle of
/// the same control is still pending.
pub async fn toggle<B: MpdBackend>(
    backend: &B,
    in_flight: &InFlight,
    toggle: Toggle,
) -> Result<Option<PanelUpdate>, ApiError> {
    let Some(_ticket) = in_flight.begin(toggle) else {
        tracing::debug!(?toggle, "toggle already pending");
        return Ok(None);
    };
    let status = backend.status().await?;
    send_command(backend, toggle.command_for(&status)).await.map(Some)
}

/// Refresh to run right after a command instead of waiting for the stream.
pub fn follow_up(command: &MpdCommand) -> Option<RefreshScope> {
    match command {
        MpdCommand::SetMode(Mode::Random, _) => Some(RefreshScope::NowPlaying),
        MpdCommand::Shuffle => Some(RefreshScope::All),
        _ => None,
    }
}

/// Toggles with a request still outstanding.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Rc<RefCell<HashSet<Toggle>>>);

impl InFlight {
    pub fn begin(&self, toggle: Toggle) -> Option<InFlightTicket> {
        if !self.0.borrow_mut().insert(toggle) {
            return None;
        }
        Some(InFlightTicket {
            pending: self.0.clone(),
            toggle,
        })
    }

    pub fn is_pending(&self, toggle: Toggle) -> bool {
        self.0.borrow().contains(&toggle)
    }
}

/// Marks a toggle as pending until dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    pending: Rc<RefCell<HashSet<Toggle>>>,
    toggle: Toggle,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.pending.borrow_mut().remove(&self.toggle);
    }
}
