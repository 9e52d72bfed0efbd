use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::RepositoryEvent;

/// Trait for consuming repository events.
///
/// Observers (an indexing scheduler, a UI, tests) provide their own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RepositoryEvent);
}

/// Channel-based event sink.
///
/// Events go through a standard mpsc channel; the receiver can be polled by any consumer.
pub struct ChannelSink {
    sender: Sender<RepositoryEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<RepositoryEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: RepositoryEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RepositoryEvent) {}
}

/// Collector sink that stores all events for inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<RepositoryEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<RepositoryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: RepositoryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
