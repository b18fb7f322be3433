// crates/npxl-playback/src/concealment.rs
//
// C5 — Concealment Policy. Stateless: given the last known non-void page and
// (optionally) a decoder to ask for a loss-concealment audio frame, produces
// a replacement `ReadyToPlayPage` whose vector frame is the previous
// non-void page's and whose audio is the decoder's best estimate.

use npxl_core::error::PlaybackError;
use npxl_core::media_page::{MediaPageHeader, ReadyToPlayPage};

use crate::collaborators::AudioDecoder;

/// Build a concealed page from the last non-void header seen, or `None` if
/// none is known yet (the incoming void page is then dropped silently by the
/// caller).
pub async fn conceal(
    last_non_void: Option<&MediaPageHeader>,
    decoder: Option<&mut dyn AudioDecoder>,
) -> Result<Option<ReadyToPlayPage>, PlaybackError> {
    let Some(header) = last_non_void else {
        return Ok(None);
    };

    let decoded_audio = match decoder {
        Some(d) => d.decode(&[]).await?,
        None => Vec::new(),
    };

    Ok(Some(ReadyToPlayPage { header: Some(header.clone()), decoded_audio }))
}
