//! Cross-thread handoff of engine events onto the UI thread
//!
//! The engine side holds an [`EngineNotifier`] and calls [`EngineNotifier::notify`]
//! from whatever thread it runs on. The UI side holds [`EngineEvents`] and
//! drains them on the UI thread (usually through an iced subscription).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};

use super::EngineEvent;

/// Default queue depth between engine and UI
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Global counter for subscription identity
static CHANNEL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Create a connected notifier / receiver pair
pub fn event_channel(capacity: usize) -> (EngineNotifier, EngineEvents) {
    let (tx, rx) = flume::bounded(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    let notifier = EngineNotifier {
        tx,
        dropped: dropped.clone(),
    };
    let events = EngineEvents {
        id: CHANNEL_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
        rx,
        dropped,
    };

    (notifier, events)
}

/// Engine-side sending half (cheap to clone, safe to call from the audio thread)
#[derive(Debug, Clone)]
pub struct EngineNotifier {
    tx: Sender<EngineEvent>,
    dropped: Arc<AtomicU64>,
}

impl EngineNotifier {
    /// Queue an event for the UI thread without blocking
    ///
    /// Returns false if the event was dropped (queue full or UI gone).
    pub fn notify(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// True once the UI side has been dropped
    pub fn is_disconnected(&self) -> bool {
        self.tx.is_disconnected()
    }
}

/// UI-side receiving half
#[derive(Debug, Clone)]
pub struct EngineEvents {
    id: u64,
    rx: Receiver<EngineEvent>,
    dropped: Arc<AtomicU64>,
}

impl EngineEvents {
    /// Stable identity of this channel (used to key subscriptions)
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Take every event currently queued
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.rx.try_iter().collect()
    }

    /// Underlying receiver, for async consumers
    pub fn receiver(&self) -> &Receiver<EngineEvent> {
        &self.rx
    }

    /// Number of events dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
