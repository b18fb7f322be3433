// crates/npxl-playback/src/collaborators.rs
//
// External collaborator boundary. The container parser, audio decoder, and
// audio sink are consumed here as capability traits — the coordinator never
// constructs or knows about their concrete types, only holds
// `Box<dyn Trait>` handles for the lifetime from `initialise` through
// `release`.
//
// All three are `#[async_trait]` since `get_pages_in_range`, `initialise`,
// and `decode` are the coordinator's only suspension points.

use async_trait::async_trait;

use npxl_core::duration::Duration;
use npxl_core::error::PlaybackError;
use npxl_core::media_page::{AudioProperties, ReadableMediaPage};

/// Produces media pages from a random-access byte source. Out of scope for
/// this crate's own implementation — the host supplies a concrete reader
/// (e.g. an npxl container parser).
#[async_trait]
pub trait VideoReader: Send + Sync {
    async fn initialise(&mut self) -> Result<(), PlaybackError>;

    /// `0` means "unknown / live stream" — the coordinator disables its
    /// video-finished check in that case.
    fn get_video_duration(&self) -> Duration;

    fn get_audio_properties(&self) -> AudioProperties;

    /// Pages overlapping `[inclusive_start, exclusive_end)`. Lost or
    /// corrupted pages appear as void entries in order. Assumes the first
    /// page of the video is page number 0 or 1 (no lost prefix).
    async fn get_pages_in_range(
        &mut self,
        inclusive_start: Duration,
        exclusive_end: Duration,
    ) -> Result<Vec<ReadableMediaPage>, PlaybackError>;

    /// Idempotent; errors are suppressed by the coordinator.
    async fn release(&mut self) -> Result<(), PlaybackError>;
}

/// Decodes compressed audio frames to PCM. Optional — when absent, the
/// coordinator never calls into it and no audio is ever decoded.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn initialise(&mut self, properties: AudioProperties) -> Result<(), PlaybackError>;

    /// Empty input means loss concealment: returns the best-estimate PCM for
    /// the missing frame. `PlaybackError::Decoding` is recoverable (the page
    /// is dropped); `PlaybackError::DefunctDecoder` is fatal.
    async fn decode(&mut self, compressed: &[u8]) -> Result<Vec<u8>, PlaybackError>;

    async fn release(&mut self) -> Result<(), PlaybackError>;
}

/// Plays decoded PCM audio. Optional — when absent, the coordinator never
/// writes to it.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn initialise(&mut self, properties: AudioProperties) -> Result<(), PlaybackError>;

    /// Queue PCM for playback; the sink auto-pauses when empty.
    fn write(&mut self, pcm: &[u8]);

    /// Discard queued and currently-playing audio.
    fn clear(&mut self);

    async fn release(&mut self) -> Result<(), PlaybackError>;
}

/// Test-double collaborators backing the coordinator's unit and
/// integration tests rather than any production path.
pub mod test_doubles {
    use std::collections::VecDeque;

    use super::*;

    /// A `VideoReader` seeded with a fixed, in-memory page sequence and an
    /// optional scripted failure on a given call index.
    pub struct ScriptedVideoReader {
        pub video_duration: Duration,
        pub audio_properties: AudioProperties,
        /// Successive `get_pages_in_range` calls pop from here in order;
        /// each entry is either a batch of pages or a scripted error.
        pub responses: VecDeque<Result<Vec<ReadableMediaPage>, PlaybackError>>,
        pub released: bool,
    }

    impl ScriptedVideoReader {
        pub fn new(video_duration: Duration) -> Self {
            Self {
                video_duration,
                audio_properties: AudioProperties::default(),
                responses: VecDeque::new(),
                released: false,
            }
        }

        pub fn push_response(&mut self, response: Result<Vec<ReadableMediaPage>, PlaybackError>) {
            self.responses.push_back(response);
        }
    }

    #[async_trait]
    impl VideoReader for ScriptedVideoReader {
        async fn initialise(&mut self) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn get_video_duration(&self) -> Duration {
            self.video_duration
        }

        fn get_audio_properties(&self) -> AudioProperties {
            self.audio_properties
        }

        async fn get_pages_in_range(
            &mut self,
            _inclusive_start: Duration,
            _exclusive_end: Duration,
        ) -> Result<Vec<ReadableMediaPage>, PlaybackError> {
            self.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn release(&mut self) -> Result<(), PlaybackError> {
            self.released = true;
            Ok(())
        }
    }

    /// Pass-through decoder: returns the compressed bytes unchanged, and a
    /// fixed concealment frame for empty (loss-concealment) input.
    #[derive(Default)]
    pub struct PassthroughAudioDecoder {
        pub concealment_frame: Vec<u8>,
        pub released: bool,
    }

    #[async_trait]
    impl AudioDecoder for PassthroughAudioDecoder {
        async fn initialise(&mut self, _properties: AudioProperties) -> Result<(), PlaybackError> {
            Ok(())
        }

        async fn decode(&mut self, compressed: &[u8]) -> Result<Vec<u8>, PlaybackError> {
            if compressed.is_empty() {
                Ok(self.concealment_frame.clone())
            } else {
                Ok(compressed.to_vec())
            }
        }

        async fn release(&mut self) -> Result<(), PlaybackError> {
            self.released = true;
            Ok(())
        }
    }

    /// Records every `write` call so tests can assert dedup behavior.
    #[derive(Default)]
    pub struct RecordingAudioSink {
        pub writes: Vec<Vec<u8>>,
        pub cleared: bool,
        pub released: bool,
    }

    #[async_trait]
    impl AudioSink for RecordingAudioSink {
        async fn initialise(&mut self, _properties: AudioProperties) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn write(&mut self, pcm: &[u8]) {
            self.writes.push(pcm.to_vec());
        }

        fn clear(&mut self) {
            self.cleared = true;
        }

        async fn release(&mut self) -> Result<(), PlaybackError> {
            self.released = true;
            Ok(())
        }
    }
}
