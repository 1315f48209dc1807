use chrono::Local;
use ringbuffer::{AllocRingBuffer, RingBuffer};
use snake_engine::games::snake::GameEvent;

/// Most recent lifecycle events, newest last.
pub struct EventLog {
    entries: AllocRingBuffer<String>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self { entries: AllocRingBuffer::new(capacity.max(1)) }
    }

    pub fn push(&mut self, event: &GameEvent) {
        let timestamp = Local::now().format("%H:%M:%S");
        self.entries.push(format!("{} {}", timestamp, describe(event)));
    }

    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }
}

pub fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::Started => "Game started".to_string(),
        GameEvent::Paused => "Paused".to_string(),
        GameEvent::Resumed => "Resumed".to_string(),
        GameEvent::Ended { score, elapsed, reason } => {
            format!("Game over: {} after {}s with {} points", reason, elapsed.as_secs(), score)
        }
        GameEvent::LevelStarted(level) => format!("Level {} started", level),
        GameEvent::LevelComplete(level) => format!("Level {} complete", level),
        GameEvent::GameComplete => "All levels cleared".to_string(),
        GameEvent::PowerUpActivated(kind) => format!("{} active", kind),
        GameEvent::PowerUpExpired(kind) => format!("{} expired", kind),
        GameEvent::NewHighScore(score) => format!("New high score: {}", score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_engine::games::snake::{DeathReason, PowerUpKind};
    use std::time::Duration;

    #[test]
    fn test_oldest_entries_are_evicted() {
        let mut log = EventLog::new(2);
        log.push(&GameEvent::Started);
        log.push(&GameEvent::Paused);
        log.push(&GameEvent::Resumed);

        let lines: Vec<&String> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Paused"));
        assert!(lines[1].ends_with("Resumed"));
    }

    #[test]
    fn test_describe_game_over() {
        let text = describe(&GameEvent::Ended {
            score: 30,
            elapsed: Duration::from_millis(4_500),
            reason: DeathReason::WallCollision,
        });
        assert_eq!(text, "Game over: hit the wall after 4s with 30 points");
    }

    #[test]
    fn test_describe_power_up() {
        assert_eq!(describe(&GameEvent::PowerUpActivated(PowerUpKind::Shield)), "shield active");
    }
}
