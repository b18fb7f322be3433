// crates/npxl-playback/src/lib.rs
//
// Playback coordinator for the npxl vector-video format: seek clock, full/
// soft buffering, concealment, observer notification, and the external
// collaborator boundary. Built on npxl-core's timed queue and buffers
// controller.

pub mod clock;
pub mod collaborators;
pub mod concealment;
pub mod coordinator;
mod log;
pub mod observer;

pub use coordinator::Coordinator;
pub use npxl_core::duration::Duration;
pub use npxl_core::error::PlaybackError;
pub use npxl_core::media_page::{
    AudioProperties, MediaPageHeader, PayloadLocator, ReadableMediaPage, ReadyToPlayPage,
    RenderingInstructions,
};
pub use npxl_core::state::PlaybackState;
