use crate::{GameError, log};
use super::settings::LevelDefinition;
use super::simulation::Simulation;
use super::types::{DeathReason, LevelSignal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// Countdown decremented; seconds left.
    Running(u32),
    /// Target reached before the decrement was applied.
    Completed(LevelSignal),
    Expired,
    /// No countdown is active.
    Idle,
}

/// Level mode progression: per-level target score and countdown over an
/// ordered list of definitions.
#[derive(Clone, Debug)]
pub struct LevelController {
    levels: Vec<LevelDefinition>,
    current: Option<u32>,
    remaining_secs: u32,
    countdown_active: bool,
}

impl LevelController {
    pub fn new(levels: Vec<LevelDefinition>) -> Self {
        Self {
            levels,
            current: None,
            remaining_secs: 0,
            countdown_active: false,
        }
    }

    pub fn current_level(&self) -> Option<u32> {
        self.current
    }

    pub fn current_definition(&self) -> Option<&LevelDefinition> {
        let level = self.current?;
        self.levels.get(level as usize - 1)
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown_active.then_some(self.remaining_secs)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Configures and resets `simulation` for level `level` (1-based) and
    /// arms the countdown. A level past the end of the list is
    /// `IndexOutOfRange`, which callers treat as the game being complete.
    pub fn start_level(&mut self, level: u32, simulation: &mut Simulation) -> Result<(), GameError> {
        let definition = level
            .checked_sub(1)
            .and_then(|index| self.levels.get(index as usize))
            .ok_or(GameError::IndexOutOfRange {
                index: level as usize,
                len: self.levels.len(),
            })?;

        simulation.configure_level(definition);
        simulation.reset()?;

        self.current = Some(level);
        self.remaining_secs = definition.time_limit_secs;
        self.countdown_active = true;

        log!(
            "Level {} started: {} (target {}, {}s)",
            level,
            definition.description,
            definition.target_score,
            definition.time_limit_secs
        );
        Ok(())
    }

    /// Call after every scoring tick. Reaching the target cancels the
    /// countdown.
    pub fn check_level_complete(&mut self, simulation: &Simulation) -> Option<LevelSignal> {
        if !self.countdown_active {
            return None;
        }
        let definition = self.current_definition()?;
        if simulation.state().score < definition.target_score {
            return None;
        }

        let level = definition.level;
        self.countdown_active = false;

        if level as usize >= self.levels.len() {
            log!("Final level {} cleared", level);
            Some(LevelSignal::GameComplete)
        } else {
            log!("Level {} cleared", level);
            Some(LevelSignal::LevelComplete(level))
        }
    }

    /// One real second of countdown. Completion is checked first, so a
    /// target reached in the same instant wins over expiry.
    pub fn countdown_tick(&mut self, simulation: &mut Simulation) -> CountdownOutcome {
        if !self.countdown_active {
            return CountdownOutcome::Idle;
        }
        if let Some(signal) = self.check_level_complete(simulation) {
            return CountdownOutcome::Completed(signal);
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return CountdownOutcome::Running(self.remaining_secs);
        }

        self.countdown_active = false;
        simulation.end(DeathReason::TimeLimit);
        CountdownOutcome::Expired
    }

    pub fn cancel_countdown(&mut self) {
        self.countdown_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::SessionRng;
    use crate::games::snake::high_score::InMemoryHighScoreStore;
    use crate::games::snake::settings::{SnakeSessionSettings, default_levels};
    use crate::games::snake::types::{GameMode, SessionStatus};
    use std::time::Duration;

    fn level_simulation() -> Simulation {
        let settings = SnakeSessionSettings {
            mode: GameMode::Level,
            ..SnakeSessionSettings::default()
        };
        Simulation::new(&settings, SessionRng::new(21), Box::new(InMemoryHighScoreStore::default())).unwrap()
    }

    #[test]
    fn test_start_level_configures_simulation() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());

        controller.start_level(2, &mut simulation).unwrap();

        assert_eq!(controller.current_level(), Some(2));
        assert_eq!(controller.remaining_secs(), Some(60));
        assert_eq!(simulation.state().current_level, Some(2));
        assert_eq!(simulation.obstacles().len(), 5);
        assert_eq!(simulation.tick_interval(), Duration::from_millis(135));
        assert_eq!(simulation.status(), SessionStatus::NotStarted);
    }

    #[test]
    fn test_level_past_end_is_out_of_range() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());

        let error = controller.start_level(6, &mut simulation).unwrap_err();
        assert!(matches!(error, GameError::IndexOutOfRange { index: 6, len: 5 }));
        assert!(controller.start_level(0, &mut simulation).is_err());
    }

    #[test]
    fn test_target_reached_before_countdown_decrement() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());
        controller.start_level(1, &mut simulation).unwrap();
        simulation.start();
        for _ in 0..20 {
            controller.countdown_tick(&mut simulation);
        }
        assert_eq!(controller.remaining_secs(), Some(40));

        simulation.set_score(50);

        assert_eq!(
            controller.countdown_tick(&mut simulation),
            CountdownOutcome::Completed(LevelSignal::LevelComplete(1))
        );
        assert_eq!(controller.remaining_secs(), None);
        assert_eq!(controller.countdown_tick(&mut simulation), CountdownOutcome::Idle);
        assert_eq!(simulation.status(), SessionStatus::Running);
    }

    #[test]
    fn test_check_after_scoring_tick() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());
        controller.start_level(1, &mut simulation).unwrap();

        simulation.set_score(40);
        assert_eq!(controller.check_level_complete(&simulation), None);
        simulation.set_score(50);
        assert_eq!(
            controller.check_level_complete(&simulation),
            Some(LevelSignal::LevelComplete(1))
        );
    }

    #[test]
    fn test_last_level_signals_game_complete() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());
        controller.start_level(5, &mut simulation).unwrap();

        simulation.set_score(300);
        assert_eq!(controller.check_level_complete(&simulation), Some(LevelSignal::GameComplete));
    }

    #[test]
    fn test_countdown_expiry_ends_game() {
        let mut simulation = level_simulation();
        let mut controller = LevelController::new(default_levels());
        controller.start_level(1, &mut simulation).unwrap();
        simulation.start();

        for _ in 0..59 {
            assert!(matches!(controller.countdown_tick(&mut simulation), CountdownOutcome::Running(_)));
        }
        assert_eq!(controller.countdown_tick(&mut simulation), CountdownOutcome::Expired);
        assert_eq!(simulation.status(), SessionStatus::Ended(DeathReason::TimeLimit));
    }
}
