use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

#[cfg(target_arch = "wasm32")]
const CONFIG_KEY: &str = "mpd-panel.config";

#[cfg(not(target_arch = "wasm32"))]
const URL_ENV: &str = "MPD_PANEL_URL";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Where the proxy lives and how the live update stream behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub server_url: String,
    /// Wait before reopening a dropped live update stream (desktop only;
    /// browsers use their own delay).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl PanelConfig {
    fn normalized(mut self) -> Self {
        self.server_url = self.server_url.trim().trim_end_matches('/').to_string();
        self
    }
}

/// Stored override first, then the page origin the panel was served from.
#[cfg(target_arch = "wasm32")]
pub fn load_config() -> PanelConfig {
    let stored: Option<PanelConfig> = LocalStorage::get(CONFIG_KEY).ok();
    let mut config = stored.unwrap_or_default();
    if config.server_url.trim().is_empty() {
        config.server_url = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
    }
    config.normalized()
}

/// `MPD_PANEL_URL`, then `<config dir>/mpd-panel/config.json`, then localhost.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_config() -> PanelConfig {
    let mut config = config_file_path()
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(raw) => parse_config(&raw)
                .map_err(|err| {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config file");
                })
                .ok(),
            Err(_) => None,
        })
        .unwrap_or_default();

    if let Ok(url) = std::env::var(URL_ENV) {
        if !url.trim().is_empty() {
            config.server_url = url;
        }
    }
    if config.server_url.trim().is_empty() {
        config.server_url = DEFAULT_SERVER_URL.to_string();
    }
    config.normalized()
}

#[cfg(not(target_arch = "wasm32"))]
fn config_file_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mpd-panel").join("config.json"))
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_config(raw: &str) -> Result<PanelConfig, serde_json::Error> {
    serde_json::from_str(raw)
}
