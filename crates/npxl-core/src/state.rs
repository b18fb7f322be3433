// crates/npxl-core/src/state.rs
//
// The coordinator's externally-visible lifecycle state. `Defunct` is
// terminal: no operation transitions out of it except re-initialisation via
// a fresh coordinator.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Paused,
    Playing,
    Buffering,
    Defunct,
}

impl PlaybackState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, PlaybackState::Defunct)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Paused
    }
}
