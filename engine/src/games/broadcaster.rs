use crate::games::snake::{GameEvent, RenderFrame};

/// Outbound side of a session: the renderer and the lifecycle listener.
/// Both calls are fire-and-forget and run while the game lock is held, so
/// implementations should hand the data off rather than block.
pub trait GameBroadcaster: Send + 'static {
    fn broadcast_state(&self, frame: &RenderFrame);

    fn broadcast_event(&self, event: GameEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullBroadcaster;

impl GameBroadcaster for NullBroadcaster {
    fn broadcast_state(&self, _frame: &RenderFrame) {}

    fn broadcast_event(&self, _event: GameEvent) {}
}

/// Captures everything it is sent. Clones share the same log.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingBroadcaster {
    events: std::sync::Arc<std::sync::Mutex<Vec<GameEvent>>>,
    frames: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl RecordingBroadcaster {
    pub(crate) fn events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.frames.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl GameBroadcaster for RecordingBroadcaster {
    fn broadcast_state(&self, _frame: &RenderFrame) {
        self.frames.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn broadcast_event(&self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}
