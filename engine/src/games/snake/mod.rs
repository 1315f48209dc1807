mod entity;
mod game;
mod grid;
mod high_score;
mod level;
mod map_generator;
mod power_ups;
mod session;
mod settings;
mod simulation;
mod types;

pub use entity::Snake;
pub use game::{CountdownReport, SnakeGame, TickReport};
pub use grid::Grid;
pub use high_score::{HighScoreStore, InMemoryHighScoreStore};
pub use level::{CountdownOutcome, LevelController};
pub use map_generator::{MAX_PLACEMENT_ATTEMPTS, MAZE_START, MapGenerator};
pub use power_ups::{PowerUpManager, PowerUpState, SPEED_BOOST_MULTIPLIER};
pub use session::SnakeSession;
pub use settings::{
    DifficultyProfile, LevelDefinition, MAX_FIELD_SIZE, MIN_FIELD_SIZE, SnakeSessionSettings, default_levels,
};
pub use simulation::{RenderFrame, START_DIRECTION, START_POSITION, SessionState, Simulation};
pub use types::*;
