pub mod error;
pub mod events;
pub mod models;
pub mod mpd;

pub use error::ApiError;
pub use models::*;
pub use mpd::*;

use once_cell::sync::Lazy;

pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);
