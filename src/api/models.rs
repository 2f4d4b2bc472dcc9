use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Subset of the MPD `status` response the panel reads.
///
/// The proxy relays MPD's `key: value` pairs as JSON, so every field arrives
/// as a string. Numbers are accepted too in case a proxy decodes them.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct PlayerStatus {
    #[serde(default, deserialize_with = "string_or_number")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub random: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub consume: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub repeat: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub song: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub nextsongid: Option<String>,
}

impl PlayerStatus {
    pub fn is_playing(&self) -> bool {
        self.state.as_deref() == Some("play")
    }

    /// A mode is on only when MPD reports exactly `"1"`.
    pub fn mode_enabled(&self, mode: Mode) -> bool {
        let value = match mode {
            Mode::Random => &self.random,
            Mode::Consume => &self.consume,
            Mode::Repeat => &self.repeat,
        };
        value.as_deref() == Some("1")
    }

    /// Playlist position of the current song, if any.
    pub fn song_position(&self) -> Option<u32> {
        self.song.as_deref().and_then(parse_position)
    }
}

/// Track tags as returned by `currentsong` and `playlistid`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct SongInfo {
    #[serde(default, rename = "Title")]
    pub title: Option<String>,
    #[serde(default, rename = "Artist")]
    pub artist: Option<String>,
    #[serde(default, rename = "Album")]
    pub album: Option<String>,
}

impl SongInfo {
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn artist_text(&self) -> &str {
        self.artist.as_deref().unwrap_or_default()
    }

    pub fn album_text(&self) -> &str {
        self.album.as_deref().unwrap_or_default()
    }
}

/// The `playlist` response: position key to file path, in no particular order.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(transparent)]
pub struct PlaylistEntries(pub HashMap<String, String>);

impl PlaylistEntries {
    /// Entries sorted by numeric position. Keys without a leading number are
    /// dropped.
    pub fn ordered(&self) -> Vec<(u32, &str)> {
        let mut entries: Vec<(u32, &str)> = self
            .0
            .iter()
            .filter_map(|(key, path)| match parse_position(key) {
                Some(position) => Some((position, path.as_str())),
                None => {
                    tracing::debug!(key = %key, "skipping playlist entry without a position");
                    None
                }
            })
            .collect();
        entries.sort_by_key(|(position, _)| *position);
        entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaylistEntries {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Playback modes that are switched on and off with `<mode> 0|1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Random,
    Consume,
    Repeat,
}

impl Mode {
    /// Display order of the mode indicators.
    pub const ALL: [Mode; 3] = [Mode::Repeat, Mode::Consume, Mode::Random];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Random => "random",
            Mode::Consume => "consume",
            Mode::Repeat => "repeat",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Mode::Random => "shuffle",
            Mode::Consume => "consume",
            Mode::Repeat => "repeat",
        }
    }
}

/// Reads the leading decimal digits of a key, the way MPD keys such as
/// `"3"` or `"3:file"` carry the position.
pub fn parse_position(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_strings_and_numbers() {
        let status: PlayerStatus = serde_json::from_str(
            r#"{"state":"play","random":"1","consume":0,"repeat":"0","song":2,"nextsongid":"7","volume":"50"}"#,
        )
        .unwrap();
        assert!(status.is_playing());
        assert!(status.mode_enabled(Mode::Random));
        assert!(!status.mode_enabled(Mode::Consume));
        assert!(!status.mode_enabled(Mode::Repeat));
        assert_eq!(status.song_position(), Some(2));
        assert_eq!(status.nextsongid.as_deref(), Some("7"));
    }

    #[test]
    fn empty_status_is_stopped_with_modes_off() {
        let status: PlayerStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.is_playing());
        assert!(Mode::ALL.iter().all(|mode| !status.mode_enabled(*mode)));
        assert_eq!(status.song_position(), None);
    }

    #[test]
    fn song_info_tolerates_missing_tags() {
        let song: SongInfo = serde_json::from_str(r#"{"Title":"Intro","file":"x/intro.ogg"}"#).unwrap();
        assert_eq!(song.title_text(), "Intro");
        assert_eq!(song.artist_text(), "");
        assert_eq!(song.album_text(), "");
    }

    #[test]
    fn playlist_orders_numerically() {
        let entries: PlaylistEntries = [("10", "k"), ("2", "c"), ("0", "a"), ("1", "b")]
            .into_iter()
            .collect();
        let positions: Vec<u32> = entries.ordered().iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2, 10]);
    }

    #[test]
    fn playlist_skips_keys_without_position() {
        let entries: PlaylistEntries = [("1:file", "b"), ("file", "x"), ("0", "a")]
            .into_iter()
            .collect();
        assert_eq!(entries.ordered(), vec![(0, "a"), (1, "b")]);
    }

    #[test]
    fn position_reads_leading_digits() {
        assert_eq!(parse_position("12"), Some(12));
        assert_eq!(parse_position(" 4:file"), Some(4));
        assert_eq!(parse_position("-1"), None);
        assert_eq!(parse_position(""), None);
    }

    #[test]
    fn modes_list_repeat_consume_random() {
        let labels: Vec<(&str, &str)> = Mode::ALL.iter().map(|m| (m.as_str(), m.icon())).collect();
        assert_eq!(
            labels,
            vec![("repeat", "repeat"), ("consume", "consume"), ("random", "shuffle")]
        );
    }
}
