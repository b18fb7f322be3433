// crates/npxl-core/src/media_page.rs
//
// Page-level data model: what a container parser hands the coordinator
// (`ReadableMediaPage`), and what the coordinator hands the buffers
// controller after decoding audio and resolving concealment
// (`ReadyToPlayPage`). Both are "void" iff their header is absent — see
// `is_void` below. No `null`: absence is always `Option::None`.

use serde::{Deserialize, Serialize};

use crate::duration::Duration;

/// Rendering instructions produced by the container parser — opaque to the
/// playback core. A frame is *void* iff `viewport` is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderingInstructions {
    /// Presence marks the frame as non-void.
    pub viewport: Option<Viewport>,
    pub background: Option<Background>,
    pub paths: Vec<StrokedPath>,
    pub pointer: Option<Pointer>,
}

impl RenderingInstructions {
    pub const fn void() -> Self {
        Self { viewport: None, background: None, paths: Vec::new(), pointer: None }
    }

    pub const fn is_void(&self) -> bool {
        self.viewport.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    pub color_rgba: u32,
}

/// A single stroked path, opaque beyond its identity to the playback core —
/// the 2D canvas painter is the only consumer that interprets its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokedPath {
    pub points: Vec<(f32, f32)>,
    pub stroke_width: f32,
    pub color_rgba: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

/// Opaque locator for a page's compressed payload inside the source byte
/// stream. The core never interprets the bytes — only carries and compares
/// them by value as part of header equality.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLocator(pub Vec<u8>);

/// Opaque audio format descriptor passed from the reader through to the
/// decoder and sink. The core never interprets its fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioProperties {
    pub sample_rate_hz: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
}

/// Header carried by every non-void media page.
///
/// `media_page_number` is assigned monotonically by the producer; gaps in
/// the sequence indicate lost pages upstream of the reader. Equality is by
/// value (all fields), which is what the coordinator's audio-dedup rule
/// relies on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaPageHeader {
    pub media_page_number: u64,
    pub page_duration_ms: u64,
    #[serde(skip)]
    pub vector_frame: RenderingInstructionsHandle,
    pub payload_locator: Option<PayloadLocator>,
}

/// `RenderingInstructions` isn't (de)serializable (it carries opaque painter
/// data); this handle lets `MediaPageHeader` still derive `Serialize` for
/// host-side snapshotting of coordinator state without
/// forcing the vector frame itself through serde.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderingInstructionsHandle(pub RenderingInstructions);

/// A page as produced by the external video reader: header plus the raw
/// compressed audio payload. Void iff `header` is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadableMediaPage {
    pub header: Option<MediaPageHeader>,
    pub compressed_audio: Vec<u8>,
}

impl ReadableMediaPage {
    pub const fn void() -> Self {
        Self { header: None, compressed_audio: Vec::new() }
    }

    pub const fn is_void(&self) -> bool {
        self.header.is_none()
    }
}

/// A page ready to hand to the host: header plus decoded PCM audio. Produced
/// either by decoding a `ReadableMediaPage`'s audio, or by the concealment
/// policy (C5). Void iff `header` is `None` — equivalently iff the vector
/// frame is void.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadyToPlayPage {
    pub header: Option<MediaPageHeader>,
    pub decoded_audio: Vec<u8>,
}

impl ReadyToPlayPage {
    pub const fn void() -> Self {
        Self { header: None, decoded_audio: Vec::new() }
    }

    pub const fn is_void(&self) -> bool {
        self.header.is_none()
    }

    pub fn vector_frame(&self) -> RenderingInstructions {
        match &self.header {
            Some(h) => h.vector_frame.0.clone(),
            None => RenderingInstructions::void(),
        }
    }

    pub fn duration(&self) -> Duration {
        match &self.header {
            Some(h) => Duration::from_millis(h.page_duration_ms),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_page_has_no_header() {
        assert!(ReadableMediaPage::void().is_void());
        assert!(ReadyToPlayPage::void().is_void());
        assert!(RenderingInstructions::void().is_void());
    }

    #[test]
    fn vector_frame_of_void_ready_page_is_void() {
        assert!(ReadyToPlayPage::void().vector_frame().is_void());
    }
}
