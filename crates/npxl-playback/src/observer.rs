// crates/npxl-playback/src/observer.rs
//
// C6 — Observer Notification. A single broadcast point; `unsubscribe`
// provides removal. Notification is synchronous from the caller's thread,
// so this is a plain `Vec` of callbacks rather than a channel — a channel
// would decouple the notification from the state change that produced it.

use npxl_core::error::PlaybackError;
use npxl_core::state::PlaybackState;

/// Emitted whenever `state`, `seek_position` (discontinuously), `last_error`,
/// or `soft_buffering_enabled` changes.
#[derive(Clone, Debug, PartialEq)]
pub enum CoordinatorEvent {
    StateChanged(PlaybackState),
    SeekPositionJumped,
    ErrorChanged(Option<PlaybackError>),
    SoftBufferingToggled(bool),
}

pub type SubscriptionId = u64;

#[derive(Default)]
pub struct ObserverHub {
    listeners: Vec<(SubscriptionId, Box<dyn Fn(&CoordinatorEvent) + Send + Sync>)>,
    next_id: SubscriptionId,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&CoordinatorEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    pub fn notify(&self, event: CoordinatorEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
