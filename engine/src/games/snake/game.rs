use std::time::Duration;

use crate::{GameError, log};
use crate::games::{GameBroadcaster, SessionRng};
use super::high_score::HighScoreStore;
use super::level::{CountdownOutcome, LevelController};
use super::settings::SnakeSessionSettings;
use super::simulation::{RenderFrame, SessionState, Simulation};
use super::types::{Direction, GameEvent, GameMode, LevelSignal, SessionStatus, TickOutcome};

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub level_signal: Option<LevelSignal>,
    pub finished: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownReport {
    pub outcome: CountdownOutcome,
    pub finished: bool,
}

/// Synchronous game: the simulation, level progression in level mode, and
/// the broadcaster that renders frames and receives lifecycle events.
/// Timers live outside, in [`super::SnakeSession`].
pub struct SnakeGame<B: GameBroadcaster> {
    simulation: Simulation,
    levels: Option<LevelController>,
    broadcaster: B,
}

impl<B: GameBroadcaster> SnakeGame<B> {
    pub fn new(
        settings: &SnakeSessionSettings,
        rng: SessionRng,
        high_scores: Box<dyn HighScoreStore>,
        broadcaster: B,
    ) -> Result<Self, GameError> {
        let simulation = Simulation::new(settings, rng, high_scores)?;
        let levels = (settings.mode == GameMode::Level)
            .then(|| LevelController::new(settings.levels.clone()));

        let mut game = Self {
            simulation,
            levels,
            broadcaster,
        };
        game.prepare()?;
        Ok(game)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn state(&self) -> &SessionState {
        self.simulation.state()
    }

    pub fn status(&self) -> SessionStatus {
        self.simulation.status()
    }

    pub fn is_finished(&self) -> bool {
        self.simulation.status().is_finished()
    }

    pub fn tick_interval(&self) -> Duration {
        self.simulation.tick_interval()
    }

    pub fn has_countdown(&self) -> bool {
        self.levels.is_some()
    }

    pub fn time_remaining_secs(&self) -> Option<u32> {
        self.levels.as_ref().and_then(|levels| levels.remaining_secs())
    }

    pub fn render_frame(&self) -> RenderFrame {
        let mut frame = self.simulation.render_frame();
        frame.time_remaining_secs = self.time_remaining_secs();
        frame
    }

    pub fn start(&mut self) -> bool {
        if !self.simulation.start() {
            return false;
        }
        self.broadcaster.broadcast_event(GameEvent::Started);
        self.render();
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.simulation.pause() {
            return false;
        }
        self.broadcaster.broadcast_event(GameEvent::Paused);
        self.render();
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.simulation.resume() {
            return false;
        }
        self.broadcaster.broadcast_event(GameEvent::Resumed);
        self.render();
        true
    }

    /// New game in the configured mode. Level mode restarts from level 1.
    pub fn reset(&mut self) -> Result<(), GameError> {
        if let Some(levels) = self.levels.as_mut() {
            levels.cancel_countdown();
        }
        self.prepare()
    }

    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.simulation.set_direction(direction)
    }

    pub fn on_tick(&mut self) -> TickReport {
        let outcome = self.simulation.tick();

        for kind in outcome.collected_power_up.iter() {
            self.broadcaster.broadcast_event(GameEvent::PowerUpActivated(*kind));
        }
        for kind in &outcome.expired_power_ups {
            self.broadcaster.broadcast_event(GameEvent::PowerUpExpired(*kind));
        }
        if let Some(score) = outcome.new_high_score {
            self.broadcaster.broadcast_event(GameEvent::NewHighScore(score));
        }

        let mut level_signal = None;
        if outcome.died.is_some() {
            self.announce_end();
        } else if outcome.ate_food
            && let Some(levels) = self.levels.as_mut()
            && let Some(signal) = levels.check_level_complete(&self.simulation)
        {
            level_signal = Some(signal);
            self.advance(signal);
        }

        if outcome.moved || outcome.died.is_some() {
            self.render();
        }

        TickReport {
            outcome,
            level_signal,
            finished: self.is_finished(),
        }
    }

    /// One real second of the level clock. Ignored outside level mode and
    /// while the game is not running.
    pub fn on_countdown(&mut self) -> CountdownReport {
        let outcome = match self.levels.as_mut() {
            Some(levels) if self.simulation.status() == SessionStatus::Running => {
                levels.countdown_tick(&mut self.simulation)
            }
            _ => CountdownOutcome::Idle,
        };

        match outcome {
            CountdownOutcome::Running(_) => self.render(),
            CountdownOutcome::Completed(signal) => {
                self.advance(signal);
                self.render();
            }
            CountdownOutcome::Expired => {
                self.announce_end();
                self.render();
            }
            CountdownOutcome::Idle => {}
        }

        CountdownReport {
            outcome,
            finished: self.is_finished(),
        }
    }

    fn prepare(&mut self) -> Result<(), GameError> {
        match self.levels.as_mut() {
            Some(levels) => {
                levels.start_level(1, &mut self.simulation)?;
                self.broadcaster.broadcast_event(GameEvent::LevelStarted(1));
            }
            None => self.simulation.reset()?,
        }
        self.render();
        Ok(())
    }

    fn advance(&mut self, signal: LevelSignal) {
        let level = match signal {
            LevelSignal::LevelComplete(level) => level,
            LevelSignal::GameComplete => {
                self.finish_all_levels();
                return;
            }
        };
        self.broadcaster.broadcast_event(GameEvent::LevelComplete(level));

        let next = level + 1;
        let Some(levels) = self.levels.as_mut() else {
            return;
        };
        match levels.start_level(next, &mut self.simulation) {
            Ok(()) => {
                self.simulation.start();
                self.broadcaster.broadcast_event(GameEvent::LevelStarted(next));
            }
            Err(GameError::IndexOutOfRange { .. }) => self.finish_all_levels(),
            Err(e) => {
                log!("Failed to start level {}: {}", next, e);
                self.finish_all_levels();
            }
        }
    }

    fn finish_all_levels(&mut self) {
        if self.simulation.complete() {
            log!("All levels cleared with score {}", self.simulation.state().score);
            self.broadcaster.broadcast_event(GameEvent::GameComplete);
        }
    }

    fn announce_end(&mut self) {
        if let SessionStatus::Ended(reason) = self.simulation.status() {
            let state = self.simulation.state();
            self.broadcaster.broadcast_event(GameEvent::Ended {
                score: state.score,
                elapsed: state.elapsed,
                reason,
            });
        }
    }

    fn render(&self) {
        self.broadcaster.broadcast_state(&self.render_frame());
    }
}

#[cfg(test)]
impl<B: GameBroadcaster> SnakeGame<B> {
    pub(crate) fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }
}
