// crates/npxl-playback/src/coordinator.rs
//
// C4 — Playback Coordinator. The state machine: play/pause/stop/seek/replay/
// release/frame-query, driving full and soft buffering, concealment, state
// updates, and observer notification.
//
// Suspension points live only inside `initialise`, `release`,
// and the two buffering continuations (`run_full_buffer`/`run_soft_buffer`).
// Frame queries and transport ops never suspend on a collaborator — the
// lock they take resolves immediately under the single-task model this
// crate assumes; the real awaiting happens only inside tasks spawned via
// `tokio::spawn`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use npxl_core::buffers::BuffersController;
use npxl_core::duration::Duration;
use npxl_core::error::PlaybackError;
use npxl_core::media_page::{MediaPageHeader, ReadableMediaPage, ReadyToPlayPage, RenderingInstructions};
use npxl_core::state::PlaybackState;

use crate::clock::SeekClock;
use crate::collaborators::{AudioDecoder, AudioSink, VideoReader};
use crate::concealment::conceal;
use crate::nlog;
use crate::observer::{CoordinatorEvent, ObserverHub, SubscriptionId};

struct Inner {
    state: PlaybackState,
    clock: SeekClock,
    buffers: BuffersController,
    video_duration: Duration,
    last_queued_non_void_page: Option<MediaPageHeader>,
    last_seen_page_number: Option<u64>,
    page_whose_audio_was_last_pushed: Option<MediaPageHeader>,
    last_error: Option<PlaybackError>,
    soft_buffering_enabled: bool,
    video_reader: Option<Box<dyn VideoReader>>,
    audio_decoder: Option<Box<dyn AudioDecoder>>,
    audio_sink: Option<Box<dyn AudioSink>>,
    observers: ObserverHub,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: PlaybackState::Paused,
            clock: SeekClock::new(),
            buffers: BuffersController::default(),
            video_duration: Duration::ZERO,
            last_queued_non_void_page: None,
            last_seen_page_number: None,
            page_whose_audio_was_last_pushed: None,
            last_error: None,
            soft_buffering_enabled: true,
            video_reader: None,
            audio_decoder: None,
            audio_sink: None,
            observers: ObserverHub::new(),
        }
    }
}

impl Inner {
    fn notify(&self, event: CoordinatorEvent) {
        self.observers.notify(event);
    }
}

/// Handle to a playback coordinator. Cheap to clone — clones share the same
/// underlying state and collaborator handles (`Arc<Mutex<Inner>>`).
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Mutex<Inner>>,
    soft_buffer_in_flight: Arc<AtomicBool>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            soft_buffer_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Stores the collaborators, initialises them in order, and reads back
    /// `audio_properties`/`video_duration`. State remains `Paused` and no
    /// further operation is valid if any collaborator call fails.
    pub async fn initialise(
        &self,
        mut video_reader: Box<dyn VideoReader>,
        mut audio_decoder: Option<Box<dyn AudioDecoder>>,
        mut audio_sink: Option<Box<dyn AudioSink>>,
    ) -> Result<(), PlaybackError> {
        video_reader
            .initialise()
            .await
            .map_err(|e| PlaybackError::InitializationError { source: e.to_string() })?;

        let audio_properties = video_reader.get_audio_properties();
        let video_duration = video_reader.get_video_duration();

        if let Some(decoder) = audio_decoder.as_mut() {
            decoder
                .initialise(audio_properties)
                .await
                .map_err(|e| PlaybackError::InitializationError { source: e.to_string() })?;
        }
        if let Some(sink) = audio_sink.as_mut() {
            sink.initialise(audio_properties)
                .await
                .map_err(|e| PlaybackError::InitializationError { source: e.to_string() })?;
        }

        let mut inner = self.inner.lock().await;
        inner.video_reader = Some(video_reader);
        inner.audio_decoder = audio_decoder;
        inner.audio_sink = audio_sink;
        inner.video_duration = video_duration;
        nlog!("initialised — video_duration={video_duration}");
        inner.notify(CoordinatorEvent::StateChanged(inner.state));
        Ok(())
    }

    /// Best-effort release on reader, decoder, sink (errors suppressed);
    /// `state = Defunct`; `last_error` cleared.
    pub async fn release(&self) {
        let (reader, decoder, sink) = {
            let mut inner = self.inner.lock().await;
            (inner.video_reader.take(), inner.audio_decoder.take(), inner.audio_sink.take())
        };
        if let Some(mut r) = reader {
            let _ = r.release().await;
        }
        if let Some(mut d) = decoder {
            let _ = d.release().await;
        }
        if let Some(mut s) = sink {
            let _ = s.release().await;
        }

        let mut inner = self.inner.lock().await;
        inner.state = PlaybackState::Defunct;
        inner.last_error = None;
        nlog!("released — state -> Defunct");
        inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Defunct));
    }

    // ── Transport ──────────────────────────────────────────────────────────

    pub async fn play(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() {
            return;
        }
        inner.clock.start();
        inner.state = PlaybackState::Playing;
        inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Playing));
    }

    pub async fn pause(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() {
            return;
        }
        inner.clock.stop();
        inner.state = PlaybackState::Paused;
        inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Paused));
    }

    /// Audio sink cleared; media buffers preserved.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() {
            return;
        }
        inner.clock = SeekClock::new();
        if let Some(sink) = inner.audio_sink.as_mut() {
            sink.clear();
        }
        inner.state = PlaybackState::Paused;
        inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Paused));
        inner.notify(CoordinatorEvent::SeekPositionJumped);
    }

    pub async fn replay(&self) {
        self.stop().await;
        self.play().await;
    }

    /// Replaces the clock with one offset to `to`. The replacement always
    /// starts stopped — the host calls `play()` if it wants playback to
    /// resume; seeking never auto-resumes. No state transition other than
    /// the clock reset; a seek landing outside the buffered range is
    /// resolved only on the next frame query.
    pub async fn seek(&self, to: Duration) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() {
            return;
        }
        inner.clock = SeekClock::with_offset(to);
        inner.notify(CoordinatorEvent::SeekPositionJumped);
    }

    // ── Frame query (hot path) ────────────────────────────────────────────

    /// Returns the vector frame for the current seek position, optionally
    /// pushing that page's audio to the sink (at most once per distinct
    /// page, per the audio-dedup rule).
    pub async fn get_current_vector_frame(&self, push_audio: bool) -> RenderingInstructions {
        let mut begin_full_buffer: Option<(PlaybackState, Duration)> = None;
        let mut begin_soft_buffer = false;
        let result;

        {
            let mut inner = self.inner.lock().await;

            if inner.state.is_terminal() {
                return RenderingInstructions::void();
            }

            if !inner.video_duration.is_zero() && inner.clock.elapsed() >= inner.video_duration {
                inner.clock.stop();
                inner.state = PlaybackState::Paused;
                inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Paused));
                return inner.buffers.last_page().vector_frame();
            }

            let seek = inner.clock.elapsed();
            let poll = inner.buffers.get_at(seek);

            if poll.needs_full {
                // A miss already in flight (state == Buffering) does not
                // relaunch full buffering — it just keeps returning void
                // until the in-flight attempt resolves.
                if inner.state != PlaybackState::Buffering {
                    let prior_state = inner.state;
                    inner.buffers.clear();
                    inner.state = PlaybackState::Buffering;
                    inner.notify(CoordinatorEvent::StateChanged(PlaybackState::Buffering));
                    begin_full_buffer = Some((prior_state, seek));
                }
                result = RenderingInstructions::void();
            } else {
                if poll.needs_soft && inner.soft_buffering_enabled {
                    begin_soft_buffer = true;
                }
                if push_audio && !poll.page.is_void() {
                    let is_new_page =
                        inner.page_whose_audio_was_last_pushed.as_ref() != poll.page.header.as_ref();
                    if is_new_page {
                        if let Some(sink) = inner.audio_sink.as_mut() {
                            sink.write(&poll.page.decoded_audio);
                        }
                        inner.page_whose_audio_was_last_pushed = poll.page.header.clone();
                    }
                }
                result = poll.page.vector_frame();
            }
        }

        if let Some((prior_state, seek)) = begin_full_buffer {
            self.spawn_full_buffer(prior_state, seek);
        }
        if begin_soft_buffer {
            self.spawn_soft_buffer();
        }

        result
    }

    // ── Full buffering (hard seek) ────────────────────────────────────────

    fn spawn_full_buffer(&self, prior_state: PlaybackState, seek: Duration) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            Self::run_full_buffer(inner, prior_state, seek).await;
        });
    }

    async fn run_full_buffer(inner: Arc<Mutex<Inner>>, prior_state: PlaybackState, seek: Duration) {
        let end = {
            let guard = inner.lock().await;
            seek + guard.buffers.forward_capacity()
        };

        let pages = {
            let mut guard = inner.lock().await;
            match guard.video_reader.as_mut() {
                Some(reader) => reader.get_pages_in_range(seek, end).await,
                None => Ok(Vec::new()),
            }
        };

        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                nlog!("full buffer failed: {e}");
                Self::enter_defunct(&inner, e).await;
                return;
            }
        };

        let mut fatal = None;
        {
            let mut guard = inner.lock().await;
            for page in pages {
                if let Err(e) = queue_and_conceal(&mut guard, page).await {
                    fatal = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = fatal {
            nlog!("full buffer decode failure: {e}");
            Self::enter_defunct(&inner, e).await;
            return;
        }

        let mut guard = inner.lock().await;
        // A `release()` that landed while this task was suspended already
        // drove state to Defunct — don't supersede it.
        if guard.state == PlaybackState::Defunct {
            return;
        }
        guard.state = prior_state;
        if let Some(decoder) = guard.audio_decoder.as_mut() {
            let _ = decoder.decode(&[]).await; // primes the decoder across the discontinuity
        }
        nlog!("full buffer complete — state -> {:?}", prior_state);
        guard.notify(CoordinatorEvent::StateChanged(prior_state));
    }

    async fn enter_defunct(inner: &Arc<Mutex<Inner>>, error: PlaybackError) {
        let (reader, decoder, sink) = {
            let mut guard = inner.lock().await;
            guard.last_error = Some(error.clone());
            guard.state = PlaybackState::Defunct;
            guard.notify(CoordinatorEvent::ErrorChanged(guard.last_error.clone()));
            guard.notify(CoordinatorEvent::StateChanged(PlaybackState::Defunct));
            (guard.video_reader.take(), guard.audio_decoder.take(), guard.audio_sink.take())
        };
        if let Some(mut r) = reader {
            let _ = r.release().await;
        }
        if let Some(mut d) = decoder {
            let _ = d.release().await;
        }
        if let Some(mut s) = sink {
            let _ = s.release().await;
        }
    }

    // ── Soft buffering ─────────────────────────────────────────────────────

    fn spawn_soft_buffer(&self) {
        if self.soft_buffer_in_flight.swap(true, Ordering::AcqRel) {
            return; // already in flight — drop the re-entrant trigger
        }
        let inner = Arc::clone(&self.inner);
        let flag = Arc::clone(&self.soft_buffer_in_flight);
        tokio::spawn(async move {
            Self::run_soft_buffer(Arc::clone(&inner)).await;
            flag.store(false, Ordering::Release);
        });
    }

    async fn run_soft_buffer(inner: Arc<Mutex<Inner>>) {
        let (start, end) = {
            let guard = inner.lock().await;
            let start = guard.buffers.end_of_last_queued_page();
            let seek = guard.clock.elapsed();
            let to_fill = guard.buffers.forward_space_to_fill(seek);
            (start, start + to_fill)
        };
        if start >= end {
            return;
        }

        let pages = {
            let mut guard = inner.lock().await;
            match guard.video_reader.as_mut() {
                Some(reader) => reader.get_pages_in_range(start, end).await,
                None => Ok(Vec::new()),
            }
        };

        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                Self::disable_soft_buffering(&inner, e).await;
                return;
            }
        };

        let mut guard = inner.lock().await;
        for page in pages {
            if let Err(e) = queue_and_conceal(&mut guard, page).await {
                drop(guard);
                Self::disable_soft_buffering(&inner, e).await;
                return;
            }
        }
    }

    /// `DefunctDecoderError` inside soft buffering disables soft buffering
    /// rather than driving the coordinator to `Defunct` — the player keeps
    /// playing on the already-buffered forward window (resolution recorded
    /// in DESIGN.md).
    async fn disable_soft_buffering(inner: &Arc<Mutex<Inner>>, error: PlaybackError) {
        let mut guard = inner.lock().await;
        nlog!("soft buffer failed, disabling: {error}");
        guard.last_error = Some(error);
        guard.soft_buffering_enabled = false;
        guard.notify(CoordinatorEvent::SoftBufferingToggled(false));
        guard.notify(CoordinatorEvent::ErrorChanged(guard.last_error.clone()));
    }

    /// Re-enables `soft_buffering_enabled` and immediately triggers one
    /// soft-buffer attempt.
    pub async fn try_soft_buffering_again(&self) {
        {
            let mut inner = self.inner.lock().await;
            if inner.state.is_terminal() {
                return;
            }
            inner.soft_buffering_enabled = true;
            inner.notify(CoordinatorEvent::SoftBufferingToggled(true));
        }
        self.spawn_soft_buffer();
    }

    // ── Configuration & introspection ─────────────────────────────────────

    pub async fn set_forward_buffer_size(&self, capacity: Duration) -> Result<(), PlaybackError> {
        if capacity.is_zero() {
            return Err(PlaybackError::InvalidConfiguration {
                reason: "forward buffer size must be greater than zero".into(),
            });
        }
        let mut inner = self.inner.lock().await;
        inner.buffers.set_forward_capacity(capacity);
        Ok(())
    }

    pub async fn video_duration(&self) -> Duration {
        self.inner.lock().await.video_duration
    }

    pub async fn seek_position(&self) -> Duration {
        self.inner.lock().await.clock.elapsed()
    }

    pub async fn state(&self) -> PlaybackState {
        self.inner.lock().await.state
    }

    pub async fn last_error(&self) -> Option<PlaybackError> {
        self.inner.lock().await.last_error.clone()
    }

    pub async fn soft_buffering_enabled(&self) -> bool {
        self.inner.lock().await.soft_buffering_enabled
    }

    pub async fn subscribe(
        &self,
        listener: impl Fn(&CoordinatorEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.inner.lock().await.observers.subscribe(listener)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().await.observers.unsubscribe(id);
    }
}

/// Per incoming page: decode/conceal, then append to the buffer. Returns
/// `Err` only for fatal decode errors (`DefunctDecoder`, or any
/// non-`Decoding` variant) which the caller propagates per its own policy
/// (full buffer -> Defunct, soft buffer -> disable soft buffering).
/// `PlaybackError::Decoding` is recoverable — the offending page is dropped
/// and `Ok(())` is returned so buffering continues with the next page.
async fn queue_and_conceal(inner: &mut Inner, incoming: ReadableMediaPage) -> Result<(), PlaybackError> {
    if let Some(header) = &incoming.header {
        if let Some(last_seen) = inner.last_seen_page_number {
            if header.media_page_number <= last_seen {
                nlog!(
                    "page {} arrived at or behind last-seen page {} — inserting without gap-fill",
                    header.media_page_number,
                    last_seen
                );
            }
        }
        inner.last_seen_page_number = Some(header.media_page_number);
    }

    if incoming.is_void() {
        let last_non_void = inner.last_queued_non_void_page.clone();
        let conceal_result = conceal(last_non_void.as_ref(), inner.audio_decoder.as_deref_mut()).await;
        match conceal_result {
            Ok(Some(page)) => {
                let start = inner.buffers.end_of_last_queued_page();
                let length = page.duration();
                inner.buffers.push_page(page, start, length);
                Ok(())
            }
            // No prior non-void page known yet — drop silently; the gap is
            // implicitly left for the next full buffer to correct.
            Ok(None) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(_) => Ok(()),
        }
    } else {
        let decode_result = if incoming.compressed_audio.is_empty() || inner.audio_decoder.is_none() {
            Ok(Vec::new())
        } else {
            inner.audio_decoder.as_mut().unwrap().decode(&incoming.compressed_audio).await
        };
        match decode_result {
            Ok(decoded_audio) => {
                let header = incoming.header.clone().expect("checked non-void above");
                let length = Duration::from_millis(header.page_duration_ms);
                let start = inner.buffers.end_of_last_queued_page();
                inner.last_queued_non_void_page = incoming.header.clone();
                inner.buffers.push_page(ReadyToPlayPage { header: incoming.header, decoded_audio }, start, length);
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(_) => Ok(()),
        }
    }
}
