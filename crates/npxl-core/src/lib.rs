// crates/npxl-core/src/lib.rs
//
// Pure data model and time-indexed queue/buffer logic for the npxl playback
// engine. No async, no I/O, no collaborator traits — those live in
// npxl-playback.

pub mod buffers;
pub mod duration;
pub mod error;
pub mod helpers;
pub mod media_page;
pub mod queue;
pub mod state;
