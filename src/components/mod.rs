//! The components module contains every piece of the panel UI.

mod actions;
mod controls;
mod icons;
mod now_playing;
mod panel;
mod playlist;

pub use actions::*;
pub use controls::*;
pub use icons::*;
pub use now_playing::*;
pub use panel::*;
pub use playlist::*;
