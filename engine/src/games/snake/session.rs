use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::{GameError, log};
use crate::games::{GameBroadcaster, Scheduler, SessionRng, TimerControl, TimerHandle, TokioScheduler};
use super::game::SnakeGame;
use super::high_score::HighScoreStore;
use super::settings::SnakeSessionSettings;
use super::types::{Direction, LevelSignal};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Default)]
struct SessionTimers {
    tick: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
    /// Next countdown firing while the countdown is armed.
    countdown_deadline: Option<Instant>,
    /// Time left until the next countdown firing, saved on pause.
    countdown_carry: Option<Duration>,
}

impl SessionTimers {
    fn cancel_all(&mut self) {
        if let Some(tick) = self.tick.take() {
            tick.cancel();
        }
        self.cancel_countdown();
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.countdown_deadline = None;
    }

    /// Cancels everything and forgets the saved countdown phase.
    fn clear(&mut self) {
        self.cancel_all();
        self.countdown_carry = None;
    }

    fn save_countdown_phase(&mut self) {
        self.countdown_carry = self
            .countdown_deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
    }
}

/// Drives a [`SnakeGame`] in real time: a tick timer at the game's current
/// interval and, in level mode, a one second countdown. Timers only run
/// while the game is running.
///
/// Locks are always taken game first, then timers.
pub struct SnakeSession<B: GameBroadcaster, S: Scheduler = TokioScheduler> {
    game: Arc<Mutex<SnakeGame<B>>>,
    timers: Arc<Mutex<SessionTimers>>,
    scheduler: Arc<S>,
}

impl<B: GameBroadcaster> SnakeSession<B> {
    pub fn new(
        settings: &SnakeSessionSettings,
        rng: SessionRng,
        high_scores: Box<dyn HighScoreStore>,
        broadcaster: B,
    ) -> Result<Self, GameError> {
        Self::with_scheduler(settings, rng, high_scores, broadcaster, TokioScheduler)
    }
}

impl<B: GameBroadcaster, S: Scheduler> SnakeSession<B, S> {
    pub fn with_scheduler(
        settings: &SnakeSessionSettings,
        rng: SessionRng,
        high_scores: Box<dyn HighScoreStore>,
        broadcaster: B,
        scheduler: S,
    ) -> Result<Self, GameError> {
        log!(
            "Creating {} session on {} ({}x{}, seed {})",
            settings.mode,
            settings.difficulty,
            settings.field_width,
            settings.field_height,
            rng.seed()
        );
        let game = SnakeGame::new(settings, rng, high_scores, broadcaster)?;

        Ok(Self {
            game: Arc::new(Mutex::new(game)),
            timers: Arc::new(Mutex::new(SessionTimers::default())),
            scheduler: Arc::new(scheduler),
        })
    }

    pub fn start(&self) -> bool {
        let mut game = lock(&self.game);
        if !game.start() {
            return false;
        }
        self.arm_timers(&game);
        true
    }

    pub fn pause(&self) -> bool {
        let mut game = lock(&self.game);
        if !game.pause() {
            return false;
        }
        let mut timers = lock(&self.timers);
        timers.save_countdown_phase();
        timers.cancel_all();
        true
    }

    pub fn resume(&self) -> bool {
        let mut game = lock(&self.game);
        if !game.resume() {
            return false;
        }
        self.arm_timers(&game);
        true
    }

    /// Stops the timers and prepares a new game. Call [`Self::start`] to
    /// play it.
    pub fn reset(&self) -> Result<(), GameError> {
        let mut game = lock(&self.game);
        lock(&self.timers).clear();
        game.reset()
    }

    pub fn set_direction(&self, direction: Direction) -> bool {
        lock(&self.game).set_direction(direction)
    }

    /// Cancels all timers without touching the game state.
    pub fn stop(&self) {
        let _game = lock(&self.game);
        lock(&self.timers).clear();
    }

    pub fn with_game<R>(&self, f: impl FnOnce(&SnakeGame<B>) -> R) -> R {
        f(&lock(&self.game))
    }

    #[cfg(test)]
    pub(crate) fn with_game_mut<R>(&self, f: impl FnOnce(&mut SnakeGame<B>) -> R) -> R {
        f(&mut lock(&self.game))
    }

    /// Starts both timers. The countdown picks up the phase saved by the
    /// last pause, if any.
    fn arm_timers(&self, game: &SnakeGame<B>) {
        let mut timers = lock(&self.timers);
        let carry = timers.countdown_carry.take();
        timers.cancel_all();

        let mut period = game.tick_interval();
        let game_ref = Arc::clone(&self.game);
        let timers_ref = Arc::clone(&self.timers);
        let scheduler = Arc::clone(&self.scheduler);
        timers.tick = Some(self.scheduler.schedule_periodic(period, move || {
            let mut game = lock(&game_ref);
            let report = game.on_tick();
            if report.finished {
                lock(&timers_ref).cancel_countdown();
                return TimerControl::Stop;
            }

            // A new level gets a full first second.
            if let Some(LevelSignal::LevelComplete(_)) = report.level_signal {
                let mut timers = lock(&timers_ref);
                arm_countdown(&game_ref, &timers_ref, scheduler.as_ref(), &mut timers, COUNTDOWN_PERIOD);
            }

            let next = game.tick_interval();
            if next == period {
                TimerControl::Continue
            } else {
                period = next;
                TimerControl::Reschedule(next)
            }
        }));

        if game.has_countdown() {
            let first_delay = carry.unwrap_or(COUNTDOWN_PERIOD);
            arm_countdown(&self.game, &self.timers, self.scheduler.as_ref(), &mut timers, first_delay);
        }
    }
}

/// Replaces the countdown timer with one that first fires after
/// `first_delay`. The caller holds the timers lock.
fn arm_countdown<B: GameBroadcaster, S: Scheduler>(
    game: &Arc<Mutex<SnakeGame<B>>>,
    timers_ref: &Arc<Mutex<SessionTimers>>,
    scheduler: &S,
    timers: &mut SessionTimers,
    first_delay: Duration,
) {
    timers.cancel_countdown();
    timers.countdown_deadline = Some(Instant::now() + first_delay);

    let game_ref = Arc::clone(game);
    let timers_ref = Arc::clone(timers_ref);
    timers.countdown = Some(scheduler.schedule_periodic_at(first_delay, COUNTDOWN_PERIOD, move || {
        let mut game = lock(&game_ref);
        let report = game.on_countdown();
        let mut timers = lock(&timers_ref);
        if !report.finished {
            timers.countdown_deadline = Some(Instant::now() + COUNTDOWN_PERIOD);
            return TimerControl::Continue;
        }
        timers.countdown_deadline = None;
        if let Some(tick) = timers.tick.take() {
            tick.cancel();
        }
        TimerControl::Stop
    }));
}

impl<B: GameBroadcaster, S: Scheduler> Drop for SnakeSession<B, S> {
    fn drop(&mut self) {
        lock(&self.timers).cancel_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::RecordingBroadcaster;
    use crate::games::snake::high_score::InMemoryHighScoreStore;
    use crate::games::snake::settings::default_levels;
    use crate::games::snake::types::{DeathReason, GameEvent, GameMode, Point, SessionStatus};
    use tokio::time::sleep;

    fn session(mode: GameMode) -> (SnakeSession<RecordingBroadcaster>, RecordingBroadcaster) {
        let settings = SnakeSessionSettings {
            mode,
            power_up_spawn_probability: 0.0,
            ..SnakeSessionSettings::default()
        };
        session_with(&settings)
    }

    fn session_with(settings: &SnakeSessionSettings) -> (SnakeSession<RecordingBroadcaster>, RecordingBroadcaster) {
        let broadcaster = RecordingBroadcaster::default();
        let session = SnakeSession::new(
            settings,
            SessionRng::new(5),
            Box::new(InMemoryHighScoreStore::default()),
            broadcaster.clone(),
        )
        .unwrap();
        (session, broadcaster)
    }

    fn elapsed(session: &SnakeSession<RecordingBroadcaster>) -> Duration {
        session.with_game(|game| game.state().elapsed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_interval() {
        let (session, _) = session(GameMode::Classic);
        assert!(session.start());

        sleep(Duration::from_millis(460)).await;

        assert_eq!(elapsed(&session), Duration::from_millis(450));
        assert_eq!(session.with_game(|game| game.simulation().snake().head().x), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_the_clock() {
        let (session, _) = session(GameMode::Classic);
        session.start();
        sleep(Duration::from_millis(310)).await;
        assert!(session.pause());

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(elapsed(&session), Duration::from_millis(300));

        assert!(session.resume());
        sleep(Duration::from_millis(160)).await;
        assert_eq!(elapsed(&session), Duration::from_millis(450));
    }

    #[tokio::test(start_paused = true)]
    async fn test_death_stops_ticking() {
        let (session, broadcaster) = session(GameMode::Classic);
        session.start();

        sleep(Duration::from_millis(150 * 20)).await;
        assert_eq!(
            session.with_game(|game| game.status()),
            SessionStatus::Ended(DeathReason::WallCollision)
        );
        let at_death = elapsed(&session);
        assert_eq!(at_death, Duration::from_millis(150 * 15));

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(elapsed(&session), at_death);
        assert!(matches!(broadcaster.events().last(), Some(GameEvent::Ended { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_countdown_runs_each_second() {
        let (session, _) = session(GameMode::Level);
        session.start();

        sleep(Duration::from_millis(1050)).await;

        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_time_limit_stops_ticking() {
        let mut levels = default_levels();
        levels[0].time_limit_secs = 2;
        let settings = SnakeSessionSettings {
            mode: GameMode::Level,
            power_up_spawn_probability: 0.0,
            levels,
            ..SnakeSessionSettings::default()
        };
        let (session, _) = session_with(&settings);
        session.start();

        sleep(Duration::from_millis(2050)).await;
        assert_eq!(
            session.with_game(|game| game.status()),
            SessionStatus::Ended(DeathReason::TimeLimit)
        );
        let at_expiry = elapsed(&session);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(elapsed(&session), at_expiry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_timers() {
        let (session, _) = session(GameMode::Classic);
        session.start();
        sleep(Duration::from_millis(310)).await;

        session.reset().unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(session.with_game(|game| game.status()), SessionStatus::NotStarted);
        assert_eq!(elapsed(&session), Duration::ZERO);
    }

    fn level_settings(levels: Vec<crate::games::snake::settings::LevelDefinition>) -> SnakeSessionSettings {
        SnakeSessionSettings {
            mode: GameMode::Level,
            field_width: 60,
            power_up_spawn_probability: 0.0,
            levels,
            ..SnakeSessionSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_keeps_its_phase_across_pauses() {
        let mut levels = default_levels();
        levels[0].target_score = 10_000;
        let (session, _) = session_with(&level_settings(levels));
        session.start();

        for _ in 0..5 {
            sleep(Duration::from_millis(900)).await;
            assert!(session.pause());
            assert!(session.resume());
        }

        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(56));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_forgets_the_countdown_phase() {
        let (session, _) = session_with(&level_settings(default_levels()));
        session.start();
        sleep(Duration::from_millis(900)).await;
        session.pause();

        session.reset().unwrap();
        session.start();
        sleep(Duration::from_millis(950)).await;
        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(60));

        sleep(Duration::from_millis(100)).await;
        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_level_gets_a_full_first_second() {
        let mut levels = default_levels();
        levels[1].obstacle_count = 0;
        let (session, _) = session_with(&level_settings(levels));
        session.start();
        sleep(Duration::from_millis(500)).await;

        session.with_game_mut(|game| {
            let simulation = game.simulation_mut();
            simulation.set_score(40);
            simulation.place_snake(&[Point::new(8, 5)], Direction::Right);
            simulation.set_food(Some(Point::new(9, 5)));
        });

        // The tick at 600 ms eats the food and starts level 2.
        sleep(Duration::from_millis(150)).await;
        assert_eq!(session.with_game(|game| game.state().current_level), Some(2));

        sleep(Duration::from_millis(900)).await;
        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(60));

        sleep(Duration::from_millis(100)).await;
        assert_eq!(session.with_game(|game| game.time_remaining_secs()), Some(59));
    }
}
