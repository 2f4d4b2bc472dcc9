use crate::api::error::ApiError;
use crate::api::models::*;
use crate::api::HTTP_CLIENT;
use crate::config::PanelConfig;
use serde::de::DeserializeOwned;
use std::fmt;

/// A request understood by the proxy's `/mpd/<command>` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpdCommand {
    Status,
    CurrentSong,
    PlaylistId(String),
    Playlist,
    Next,
    Previous,
    Shuffle,
    Play(u32),
    /// `pause 1` pauses, `pause 0` resumes.
    Pause(bool),
    SetMode(Mode, bool),
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

impl fmt::Display for MpdCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpdCommand::Status => f.write_str("status"),
            MpdCommand::CurrentSong => f.write_str("currentsong"),
            MpdCommand::PlaylistId(id) => write!(f, "playlistid {id}"),
            MpdCommand::Playlist => f.write_str("playlist"),
            MpdCommand::Next => f.write_str("next"),
            MpdCommand::Previous => f.write_str("previous"),
            MpdCommand::Shuffle => f.write_str("shuffle"),
            MpdCommand::Play(position) => write!(f, "play {position}"),
            MpdCommand::Pause(on) => write!(f, "pause {}", flag(*on)),
            MpdCommand::SetMode(mode, on) => write!(f, "{} {}", mode.as_str(), flag(*on)),
        }
    }
}

/// Everything the panel needs from the proxy.
///
/// `MpdClient` talks HTTP; tests substitute a recording fake.
#[allow(async_fn_in_trait)]
pub trait MpdBackend {
    async fn query<T: DeserializeOwned>(&self, command: &MpdCommand) -> Result<T, ApiError>;

    /// Fire a command and ignore the body.
    async fn send(&self, command: &MpdCommand) -> Result<(), ApiError>;

    fn cover_url(&self, album: &str) -> String;

    async fn status(&self) -> Result<PlayerStatus, ApiError> {
        self.query(&MpdCommand::Status).await
    }

    async fn current_song(&self) -> Result<SongInfo, ApiError> {
        self.query(&MpdCommand::CurrentSong).await
    }

    async fn song_by_id(&self, id: &str) -> Result<SongInfo, ApiError> {
        self.query(&MpdCommand::PlaylistId(id.to_string())).await
    }

    async fn playlist(&self) -> Result<PlaylistEntries, ApiError> {
        self.query(&MpdCommand::Playlist).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MpdClient {
    base_url: String,
}

impl MpdClient {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            base_url: config.server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn command_url(&self, command: &MpdCommand) -> String {
        format!(
            "{}/mpd/{}",
            self.base_url,
            urlencoding::encode(&command.to_string())
        )
    }

    pub fn events_url(&self) -> String {
        format!("{}/sse", self.base_url)
    }

    async fn get(&self, command: &MpdCommand) -> Result<reqwest::Response, ApiError> {
        let url = self.command_url(command);
        let response = HTTP_CLIENT.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl MpdBackend for MpdClient {
    async fn query<T: DeserializeOwned>(&self, command: &MpdCommand) -> Result<T, ApiError> {
        let body = self.get(command).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, command: &MpdCommand) -> Result<(), ApiError> {
        tracing::debug!(%command, "sending command");
        self.get(command).await?;
        Ok(())
    }

    fn cover_url(&self, album: &str) -> String {
        format!("{}/cover?A={}", self.base_url, urlencoding::encode(album))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MpdClient {
        MpdClient::new(&PanelConfig {
            server_url: "http://music.local:8080/".to_string(),
            ..PanelConfig::default()
        })
    }

    #[test]
    fn command_text_matches_mpd_syntax() {
        assert_eq!(MpdCommand::Play(3).to_string(), "play 3");
        assert_eq!(MpdCommand::Pause(true).to_string(), "pause 1");
        assert_eq!(MpdCommand::Pause(false).to_string(), "pause 0");
        assert_eq!(MpdCommand::SetMode(Mode::Consume, true).to_string(), "consume 1");
        assert_eq!(MpdCommand::SetMode(Mode::Repeat, false).to_string(), "repeat 0");
        assert_eq!(MpdCommand::PlaylistId("7".into()).to_string(), "playlistid 7");
        assert_eq!(MpdCommand::Shuffle.to_string(), "shuffle");
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client = client();
        assert_eq!(
            client.command_url(&MpdCommand::Play(3)),
            "http://music.local:8080/mpd/play%203"
        );
        assert_eq!(client.command_url(&MpdCommand::Status), "http://music.local:8080/mpd/status");
        assert_eq!(client.events_url(), "http://music.local:8080/sse");
    }

    #[test]
    fn cover_url_encodes_album() {
        assert_eq!(
            client().cover_url("Kind of Blue & More"),
            "http://music.local:8080/cover?A=Kind%20of%20Blue%20%26%20More"
        );
    }
}
