//! Client-side view of the player.
//!
//! Refreshes and commands produce [`PanelUpdate`]s; [`PanelState::apply`] is the
//! only place the state changes. Components render from the state and Dioxus
//! diffs the result.

use crate::api::{Mode, MpdCommand, PlayerStatus, PlaylistEntries, SongInfo};

pub const OPACITY_FULL: &str = "1";
pub const OPACITY_DIMMED: &str = "0.3";

/// Opacity of a mode indicator.
pub fn mode_opacity(enabled: bool) -> &'static str {
    if enabled {
        OPACITY_FULL
    } else {
        OPACITY_DIMMED
    }
}

/// Display label for a playlist path: the extension is dropped and
/// directories become ` - ` separated parts.
pub fn playlist_label(path: &str) -> String {
    let stem = match path.rfind('.') {
        Some(dot) if dot + 1 < path.len() && !path[dot + 1..].contains('/') => &path[..dot],
        _ => path,
    };
    stem.replace('/', " - ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    pub random: bool,
    pub consume: bool,
    pub repeat: bool,
}

impl ModeFlags {
    pub fn from_status(status: &PlayerStatus) -> Self {
        Self {
            random: status.mode_enabled(Mode::Random),
            consume: status.mode_enabled(Mode::Consume),
            repeat: status.mode_enabled(Mode::Repeat),
        }
    }

    pub fn get(&self, mode: Mode) -> bool {
        match mode {
            Mode::Random => self.random,
            Mode::Consume => self.consume,
            Mode::Repeat => self.repeat,
        }
    }

    pub fn set(&mut self, mode: Mode, enabled: bool) {
        match mode {
            Mode::Random => self.random = enabled,
            Mode::Consume => self.consume = enabled,
            Mode::Repeat => self.repeat = enabled,
        }
    }
}

/// Tags and cover of the song being played, from `currentsong`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentSong {
    pub song: SongInfo,
    pub cover_url: String,
}

/// Everything derived from `status`, plus the song it names as next.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerView {
    pub next: Option<SongInfo>,
    pub playing: bool,
    pub modes: ModeFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRow {
    pub position: u32,
    pub label: String,
    pub active: bool,
}

/// Rows in position order; the row at `current` is active.
pub fn playlist_rows(entries: &PlaylistEntries, current: Option<u32>) -> Vec<PlaylistRow> {
    entries
        .ordered()
        .into_iter()
        .map(|(position, path)| PlaylistRow {
            position,
            label: playlist_label(path),
            active: Some(position) == current,
        })
        .collect()
}

/// Controls that flip a two-state setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Playback,
    Mode(Mode),
}

impl Toggle {
    /// The command that flips this control away from what `status` reports.
    pub fn command_for(self, status: &PlayerStatus) -> MpdCommand {
        match self {
            Toggle::Playback => MpdCommand::Pause(status.is_playing()),
            Toggle::Mode(mode) => MpdCommand::SetMode(mode, !status.mode_enabled(mode)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelUpdate {
    CurrentSong(CurrentSong),
    Player(PlayerView),
    Playlist(Vec<PlaylistRow>),
    /// A command was accepted by the proxy.
    Sent(MpdCommand),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub current: Option<SongInfo>,
    pub next: Option<SongInfo>,
    pub playing: bool,
    pub modes: ModeFlags,
    pub cover_url: Option<String>,
    pub playlist: Vec<PlaylistRow>,
}

impl PanelState {
    pub fn apply(&mut self, update: PanelUpdate) {
        match update {
            PanelUpdate::CurrentSong(current) => {
                self.current = Some(current.song);
                self.cover_url = Some(current.cover_url);
            }
            PanelUpdate::Player(player) => {
                self.next = player.next;
                self.playing = player.playing;
                self.modes = player.modes;
            }
            PanelUpdate::Playlist(rows) => self.playlist = rows,
            // Optimistic until the next refresh reports the real state.
            PanelUpdate::Sent(MpdCommand::Pause(paused)) => self.playing = !paused,
            PanelUpdate::Sent(MpdCommand::SetMode(mode, enabled)) => self.modes.set(mode, enabled),
            PanelUpdate::Sent(_) => {}
        }
    }

    pub fn active_position(&self) -> Option<u32> {
        self.playlist.iter().find(|row| row.active).map(|row| row.position)
    }

    /// Queue header text: `"<n> / <total>"` while a row is active.
    pub fn queue_progress(&self) -> String {
        let total = self.playlist.len();
        match self.active_position() {
            Some(position) => format!("{} / {total}", u64::from(position) + 1),
            None => format!("{total} tracks"),
        }
    }
}
