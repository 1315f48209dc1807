use snake_engine::games::GameBroadcaster;
use snake_engine::games::snake::{GameEvent, RenderFrame};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum UiUpdate {
    Frame(Box<RenderFrame>),
    Event(GameEvent),
}

/// Hands frames and events to the UI loop. Sends after the UI has gone
/// away are dropped.
#[derive(Clone)]
pub struct TerminalBroadcaster {
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl TerminalBroadcaster {
    pub fn new(tx: mpsc::UnboundedSender<UiUpdate>) -> Self {
        Self { tx }
    }
}

impl GameBroadcaster for TerminalBroadcaster {
    fn broadcast_state(&self, frame: &RenderFrame) {
        let _ = self.tx.send(UiUpdate::Frame(Box::new(frame.clone())));
    }

    fn broadcast_event(&self, event: GameEvent) {
        let _ = self.tx.send(UiUpdate::Event(event));
    }
}
