use std::sync::{Arc, Mutex};

/// Persistence for the best score across sessions. Loaded once when a
/// simulation is created, saved whenever the record is beaten.
pub trait HighScoreStore: Send {
    fn load(&self) -> u32;
    fn save(&mut self, score: u32);
}

/// Keeps the record for the lifetime of the process. Clones share the same
/// value.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHighScoreStore {
    score: Arc<Mutex<u32>>,
}

impl InMemoryHighScoreStore {
    pub fn new(initial: u32) -> Self {
        Self { score: Arc::new(Mutex::new(initial)) }
    }
}

impl HighScoreStore for InMemoryHighScoreStore {
    fn load(&self) -> u32 {
        *self.score.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&mut self, score: u32) {
        *self.score.lock().unwrap_or_else(|e| e.into_inner()) = score;
    }
}
