// crates/npxl-core/src/buffers.rs
//
// C2 — Buffers Controller. Wraps a single `TimedMediaQueue<ReadyToPlayPage>`
// and enforces the forward/backward capacity invariants. Forward capacity
// defaults to 15s; backward capacity is always `0.7 * forward_capacity`.

use crate::duration::Duration;
use crate::media_page::ReadyToPlayPage;
use crate::queue::TimedMediaQueue;

pub const DEFAULT_FORWARD_CAPACITY: Duration = Duration::from_secs(15);
const BACKWARD_RATIO: f64 = 0.7;

/// Result of a `get_at` poll: whether the caller should kick off full or
/// soft buffering, alongside the page itself (void on a miss).
pub struct BufferPoll {
    pub page: ReadyToPlayPage,
    pub needs_full: bool,
    pub needs_soft: bool,
}

pub struct BuffersController {
    queue: TimedMediaQueue<ReadyToPlayPage>,
    forward_capacity: Duration,
    backward_capacity: Duration,
}

impl Default for BuffersController {
    fn default() -> Self {
        Self::new(DEFAULT_FORWARD_CAPACITY)
    }
}

impl BuffersController {
    pub fn new(forward_capacity: Duration) -> Self {
        Self {
            queue: TimedMediaQueue::new(),
            forward_capacity,
            backward_capacity: forward_capacity.scale(BACKWARD_RATIO),
        }
    }

    pub fn forward_capacity(&self) -> Duration {
        self.forward_capacity
    }

    pub fn backward_capacity(&self) -> Duration {
        self.backward_capacity
    }

    pub fn set_forward_capacity(&mut self, capacity: Duration) {
        self.forward_capacity = capacity;
        self.backward_capacity = capacity.scale(BACKWARD_RATIO);
    }

    /// `forward_capacity - (end_of_last_queued - seek)`, saturating
    /// non-negative.
    pub fn forward_space_to_fill(&self, seek: Duration) -> Duration {
        let buffered_ahead = self.end_of_last_queued_page().saturating_sub(seek);
        self.forward_capacity.saturating_sub(buffered_ahead)
    }

    pub fn end_of_last_queued_page(&self) -> Duration {
        self.queue.last().map(|it| it.end()).unwrap_or(Duration::ZERO)
    }

    pub fn last_page(&self) -> ReadyToPlayPage {
        self.queue.last().map(|it| it.payload.clone()).unwrap_or_else(ReadyToPlayPage::void)
    }

    /// Poll the buffer at `seek`. On a miss, signals `needs_full` (the
    /// full-buffer routine runs asynchronously; subsequent polls during that
    /// interval keep observing misses and returning void). On a hit, signals
    /// `needs_soft` when the forward window has drained below 70% capacity,
    /// then evicts backward overflow before returning the hit payload.
    pub fn get_at(&mut self, seek: Duration) -> BufferPoll {
        let Some(page) = self.queue.get_at(seek).cloned() else {
            return BufferPoll { page: ReadyToPlayPage::void(), needs_full: true, needs_soft: false };
        };

        let buffered_ahead = self.end_of_last_queued_page().saturating_sub(seek);
        let needs_soft = buffered_ahead < self.forward_capacity.scale(BACKWARD_RATIO);

        self.evict_backward_overflow(seek);

        BufferPoll { page, needs_full: false, needs_soft }
    }

    fn evict_backward_overflow(&mut self, seek: Duration) {
        let Some(first) = self.queue.first() else { return };
        let used_back = seek.saturating_sub(first.start);
        if used_back > self.backward_capacity {
            self.queue.pop_front_by_length(used_back.saturating_sub(self.backward_capacity));
        }
    }

    pub fn push_page(&mut self, page: ReadyToPlayPage, start: Duration, length: Duration) {
        self.queue.push_back(page, start, length);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total length of the portion of the queue strictly before `seek` —
    /// exposed so the dual-buffer invariant can be asserted from tests
    /// outside this module.
    pub fn buffered_before(&self, seek: Duration) -> Duration {
        match self.queue.first() {
            Some(first) if first.start < seek => seek.saturating_sub(first.start).min(seek),
            _ => Duration::ZERO,
        }
    }
}
