use thiserror::Error;

/// Failure talking to the MPD proxy.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[cfg(target_arch = "wasm32")]
    #[error("live update stream unavailable: {0}")]
    EventStream(String),
}
