use std::collections::HashSet;
use std::time::Duration;

use crate::{GameError, log};
use crate::config::Validate;
use crate::games::SessionRng;
use super::entity::Snake;
use super::grid::Grid;
use super::high_score::HighScoreStore;
use super::map_generator::{MAZE_START, MapGenerator};
use super::power_ups::{PowerUpManager, PowerUpState};
use super::settings::{LevelDefinition, SnakeSessionSettings};
use super::types::{
    DeathReason, Difficulty, Direction, GameMode, Point, PowerUpKind, PowerUpPickup,
    SessionStatus, TickOutcome,
};

pub const START_POSITION: Point = Point::new(5, 5);
pub const START_DIRECTION: Direction = Direction::Right;

/// Cells ahead of the start position kept clear of obstacles.
const START_SAFE_DISTANCE: i32 = 3;

const SPEED_RAMP_STEP: f64 = 0.05;
const SPEED_RAMP_MAX: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub score: u32,
    pub high_score: u32,
    pub elapsed: Duration,
    pub status: SessionStatus,
    pub direction: Direction,
    pub speed_multiplier: f64,
    pub current_level: Option<u32>,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub session: SessionState,
    pub field_width: i32,
    pub field_height: i32,
    pub snake: Vec<Point>,
    pub food: Option<Point>,
    pub obstacles: Vec<Point>,
    pub maze_walls: Vec<Point>,
    pub portals: Option<(Point, Point)>,
    pub pickup: Option<PowerUpPickup>,
    pub power_ups: [(PowerUpKind, PowerUpState); 3],
    pub time_remaining_secs: Option<u32>,
}

pub struct Simulation {
    generator: MapGenerator,
    rng: SessionRng,
    high_scores: Box<dyn HighScoreStore>,
    mode: GameMode,
    difficulty: Difficulty,
    base_interval: Duration,
    obstacle_count: usize,
    power_up_spawn_probability: f64,
    snake: Snake,
    food: Option<Point>,
    obstacles: HashSet<Point>,
    maze_walls: HashSet<Point>,
    portals: Option<(Point, Point)>,
    pickup: Option<PowerUpPickup>,
    power_ups: PowerUpManager,
    pending_direction: Option<Direction>,
    foods_eaten: u32,
    state: SessionState,
}

impl Simulation {
    pub fn new(
        settings: &SnakeSessionSettings,
        rng: SessionRng,
        high_scores: Box<dyn HighScoreStore>,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let grid = Grid::new(settings.field_width, settings.field_height)?;
        let profile = settings.difficulty.profile();
        let high_score = high_scores.load();

        let mut simulation = Self {
            generator: MapGenerator::new(grid),
            rng,
            high_scores,
            mode: settings.mode,
            difficulty: settings.difficulty,
            base_interval: profile.base_interval,
            obstacle_count: match settings.mode {
                GameMode::Obstacle => profile.obstacle_count,
                _ => 0,
            },
            power_up_spawn_probability: settings.power_up_spawn_probability,
            snake: Snake::new(START_POSITION),
            food: None,
            obstacles: HashSet::new(),
            maze_walls: HashSet::new(),
            portals: None,
            pickup: None,
            power_ups: PowerUpManager::new(),
            pending_direction: None,
            foods_eaten: 0,
            state: SessionState {
                score: 0,
                high_score,
                elapsed: Duration::ZERO,
                status: SessionStatus::NotStarted,
                direction: START_DIRECTION,
                speed_multiplier: 1.0,
                current_level: None,
            },
        };
        simulation.reset()?;
        Ok(simulation)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn grid(&self) -> Grid {
        self.generator.grid()
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    pub fn obstacles(&self) -> &HashSet<Point> {
        &self.obstacles
    }

    pub fn maze_walls(&self) -> &HashSet<Point> {
        &self.maze_walls
    }

    pub fn portals(&self) -> Option<(Point, Point)> {
        self.portals
    }

    pub fn pickup(&self) -> Option<PowerUpPickup> {
        self.pickup
    }

    pub fn power_ups(&self) -> &PowerUpManager {
        &self.power_ups
    }

    pub fn tick_interval(&self) -> Duration {
        let nanos = self.base_interval.as_nanos() as f64 / self.state.speed_multiplier;
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Applies a level's speed and obstacle count. Takes effect on the next
    /// reset.
    pub fn configure_level(&mut self, definition: &LevelDefinition) {
        self.base_interval = definition.tick_interval();
        self.obstacle_count = definition.obstacle_count;
        self.state.current_level = Some(definition.level);
    }

    /// Back to NotStarted with a fresh snake, food, power-ups and mode
    /// features. The high score survives.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.snake = Snake::new(START_POSITION);
        self.state.direction = START_DIRECTION;
        self.pending_direction = None;
        self.food = None;
        self.obstacles.clear();
        self.maze_walls.clear();
        self.portals = None;
        self.pickup = None;
        self.power_ups.reset();
        self.foods_eaten = 0;
        self.state.score = 0;
        self.state.elapsed = Duration::ZERO;
        self.state.status = SessionStatus::NotStarted;
        self.refresh_speed();

        match self.mode {
            GameMode::Classic | GameMode::Speed => {}
            GameMode::Obstacle | GameMode::Level => {
                let mut reserved = self.occupied_cells();
                let mut ahead = START_POSITION;
                for _ in 0..START_SAFE_DISTANCE {
                    ahead = ahead.step(START_DIRECTION);
                    reserved.insert(ahead);
                }
                self.obstacles =
                    self.generator
                        .place_obstacles(&mut self.rng, &reserved, self.obstacle_count)?;
            }
            GameMode::Maze => {
                self.maze_walls = self.generator.generate_maze(&mut self.rng)?;
                self.snake = Snake::new(MAZE_START);
                self.state.direction = Direction::ALL
                    .into_iter()
                    .find(|direction| {
                        let next = MAZE_START.step(*direction);
                        self.grid().contains(next) && !self.maze_walls.contains(&next)
                    })
                    .unwrap_or(START_DIRECTION);
            }
            GameMode::Portal => {
                let occupied = self.occupied_cells();
                self.portals = Some(self.generator.place_portals(&mut self.rng, &occupied)?);
            }
        }

        let occupied = self.occupied_cells();
        self.food = Some(self.generator.place_food(&mut self.rng, &occupied)?);

        log!(
            "Reset {} game on {} ({} obstacles, {} maze walls)",
            self.mode,
            self.difficulty,
            self.obstacles.len(),
            self.maze_walls.len()
        );
        Ok(())
    }

    pub fn start(&mut self) -> bool {
        self.transition(SessionStatus::NotStarted, SessionStatus::Running)
    }

    pub fn pause(&mut self) -> bool {
        self.transition(SessionStatus::Running, SessionStatus::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(SessionStatus::Paused, SessionStatus::Running)
    }

    /// Ends a live session for a reason outside the board, such as the
    /// level clock running out.
    pub fn end(&mut self, reason: DeathReason) -> bool {
        if self.state.status.is_finished() {
            return false;
        }
        log!("Game over: snake {} with score {}", reason, self.state.score);
        self.state.status = SessionStatus::Ended(reason);
        true
    }

    pub fn complete(&mut self) -> bool {
        if self.state.status.is_finished() {
            return false;
        }
        self.state.status = SessionStatus::Completed;
        true
    }

    /// Queues a turn for the next tick. Opposite turns and turns while
    /// paused or finished are ignored; the last accepted turn wins.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if matches!(self.state.status, SessionStatus::Paused) || self.state.status.is_finished() {
            return false;
        }
        if direction.is_opposite(&self.state.direction) {
            return false;
        }
        self.pending_direction = Some(direction);
        true
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> bool {
        let activated = self.power_ups.activate(kind);
        if activated {
            log!("Power-up activated: {}", kind);
            self.refresh_speed();
        }
        activated
    }

    /// Advances the game by one cell. Does nothing unless running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.status != SessionStatus::Running {
            return TickOutcome::default();
        }

        let interval = self.tick_interval();
        if let Some(direction) = self.pending_direction.take() {
            self.state.direction = direction;
        }

        let shielded = self.power_ups.is_active(PowerUpKind::Shield);
        let grid = self.grid();
        let mut candidate = self.snake.head().step(self.state.direction);

        if !grid.contains(candidate) {
            if !shielded {
                return self.die(DeathReason::WallCollision, interval);
            }
            candidate = grid.wrap(candidate);
        }

        if self.snake.contains(&candidate) && !shielded {
            return self.die(DeathReason::SelfCollision, interval);
        }

        if self.obstacles.contains(&candidate) || self.maze_walls.contains(&candidate) {
            return self.die(DeathReason::ObstacleCollision, interval);
        }

        self.snake.push_head(candidate);
        let mut outcome = TickOutcome {
            moved: true,
            new_head: Some(candidate),
            ..TickOutcome::default()
        };

        if self.food == Some(candidate) {
            outcome.ate_food = true;
            outcome.new_high_score = self.award_food();
            self.respawn_food();
            self.maybe_spawn_pickup();
        } else {
            self.snake.pop_tail();
        }

        if let Some(pickup) = self.pickup
            && pickup.position == candidate
        {
            self.pickup = None;
            if self.activate_power_up(pickup.kind) {
                outcome.collected_power_up = Some(pickup.kind);
            }
        }

        if let Some((first, second)) = self.portals {
            let destination = if candidate == first {
                Some(second)
            } else if candidate == second {
                Some(first)
            } else {
                None
            };
            if let Some(destination) = destination {
                // The exit cell may still hold a body segment.
                if !shielded && self.snake.contains(&destination) {
                    let died = self.die(DeathReason::SelfCollision, interval);
                    return TickOutcome { died: died.died, ..outcome };
                }
                self.snake.relocate_head(destination);
                outcome.teleported = true;
                outcome.new_head = Some(destination);
            }
        }

        self.state.elapsed += interval;
        outcome.expired_power_ups = self.power_ups.tick(interval.as_millis() as u64);
        if !outcome.expired_power_ups.is_empty() {
            for kind in &outcome.expired_power_ups {
                log!("Power-up expired: {}", kind);
            }
            self.refresh_speed();
        }

        outcome
    }

    pub fn render_frame(&self) -> RenderFrame {
        let grid = self.grid();
        let mut obstacles: Vec<Point> = self.obstacles.iter().copied().collect();
        obstacles.sort();
        let mut maze_walls: Vec<Point> = self.maze_walls.iter().copied().collect();
        maze_walls.sort();

        RenderFrame {
            session: self.state.clone(),
            field_width: grid.width(),
            field_height: grid.height(),
            snake: self.snake.segments().copied().collect(),
            food: self.food,
            obstacles,
            maze_walls,
            portals: self.portals,
            pickup: self.pickup,
            power_ups: self.power_ups.states(),
            time_remaining_secs: None,
        }
    }

    fn transition(&mut self, from: SessionStatus, to: SessionStatus) -> bool {
        if self.state.status != from {
            return false;
        }
        self.state.status = to;
        true
    }

    fn die(&mut self, reason: DeathReason, interval: Duration) -> TickOutcome {
        self.state.elapsed += interval;
        self.end(reason);
        TickOutcome {
            died: Some(reason),
            ..TickOutcome::default()
        }
    }

    fn award_food(&mut self) -> Option<u32> {
        let points = self.difficulty.profile().base_score * self.power_ups.score_multiplier();
        self.state.score += points;
        self.foods_eaten += 1;
        if self.mode == GameMode::Speed {
            self.refresh_speed();
        }
        log!(
            "Ate food at {} for {} points. Score: {}",
            self.snake.head(),
            points,
            self.state.score
        );

        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            self.high_scores.save(self.state.score);
            return Some(self.state.score);
        }
        None
    }

    fn respawn_food(&mut self) {
        self.food = None;
        let occupied = self.occupied_cells();
        match self.generator.place_food(&mut self.rng, &occupied) {
            Ok(food) => self.food = Some(food),
            Err(e) => log!("No room left for food: {}", e),
        }
    }

    fn maybe_spawn_pickup(&mut self) {
        if self.pickup.is_some() || !self.rng.chance(self.power_up_spawn_probability) {
            return;
        }
        let Some(kind) = self.rng.pick(&PowerUpKind::ALL) else {
            return;
        };
        let occupied = self.occupied_cells();
        if let Ok(position) = self.generator.place_food(&mut self.rng, &occupied) {
            log!("Spawned {} pickup at {}", kind, position);
            self.pickup = Some(PowerUpPickup { position, kind });
        }
    }

    fn refresh_speed(&mut self) {
        let ramp = match self.mode {
            GameMode::Speed => (1.0 + SPEED_RAMP_STEP * self.foods_eaten as f64).min(SPEED_RAMP_MAX),
            _ => 1.0,
        };
        self.state.speed_multiplier = self.power_ups.speed_multiplier() * ramp;
    }

    fn occupied_cells(&self) -> HashSet<Point> {
        let mut occupied: HashSet<Point> = self.snake.segments().copied().collect();
        occupied.extend(self.obstacles.iter().copied());
        occupied.extend(self.maze_walls.iter().copied());
        if let Some((first, second)) = self.portals {
            occupied.insert(first);
            occupied.insert(second);
        }
        if let Some(pickup) = self.pickup {
            occupied.insert(pickup.position);
        }
        if let Some(food) = self.food {
            occupied.insert(food);
        }
        occupied
    }
}

#[cfg(test)]
impl Simulation {
    pub(crate) fn place_snake(&mut self, segments: &[Point], direction: Direction) {
        self.snake = Snake::from_segments(segments);
        self.state.direction = direction;
        self.pending_direction = None;
    }

    pub(crate) fn set_food(&mut self, food: Option<Point>) {
        self.food = food;
    }

    pub(crate) fn set_score(&mut self, score: u32) {
        self.state.score = score;
    }

    pub(crate) fn set_obstacles(&mut self, obstacles: &[Point]) {
        self.obstacles = obstacles.iter().copied().collect();
    }

    pub(crate) fn set_portals(&mut self, portals: Option<(Point, Point)>) {
        self.portals = portals;
    }

    pub(crate) fn set_pickup(&mut self, pickup: Option<PowerUpPickup>) {
        self.pickup = pickup;
    }
}
