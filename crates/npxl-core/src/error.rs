// crates/npxl-core/src/error.rs
//
// C7 support — the error taxonomy the classifier matches on. Kept in
// npxl-core (rather than npxl-playback) since `BuffersController`'s config
// setter also needs `InvalidConfiguration`.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("initialisation failed: {source}")]
    InitializationError { source: String },

    #[error("I/O error: {source}")]
    Io { source: String },

    #[error("decoding error: {source}")]
    Decoding { source: String },

    #[error("decoder is defunct: {source}")]
    DefunctDecoder { source: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl PlaybackError {
    /// Whether this error, surfaced during full buffering, should drive the
    /// coordinator into `Defunct`. `Decoding` errors are recoverable —
    /// the offending page is dropped and buffering continues.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, PlaybackError::Decoding { .. })
    }
}
