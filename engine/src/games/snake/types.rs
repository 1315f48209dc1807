use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
                | (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
        )
    }

    /// Unit vector with y growing downwards.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
    ObstacleCollision,
    TimeLimit,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DeathReason::WallCollision => "hit the wall",
            DeathReason::SelfCollision => "bit its own tail",
            DeathReason::ObstacleCollision => "crashed into an obstacle",
            DeathReason::TimeLimit => "ran out of time",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::config(format!("unknown difficulty '{}'", other))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Classic,
    Obstacle,
    Maze,
    Portal,
    Speed,
    Level,
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "obstacle" => Ok(GameMode::Obstacle),
            "maze" => Ok(GameMode::Maze),
            "portal" => Ok(GameMode::Portal),
            "speed" => Ok(GameMode::Speed),
            "level" => Ok(GameMode::Level),
            other => Err(GameError::config(format!("unknown game mode '{}'", other))),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameMode::Classic => "classic",
            GameMode::Obstacle => "obstacle",
            GameMode::Maze => "maze",
            GameMode::Portal => "portal",
            GameMode::Speed => "speed",
            GameMode::Level => "level",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    Running,
    Paused,
    Ended(DeathReason),
    /// Every level cleared.
    Completed,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Ended(_) | SessionStatus::Completed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
    DoubleScore,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::SpeedBoost, PowerUpKind::Shield, PowerUpKind::DoubleScore];

    pub fn duration_ms(&self) -> u64 {
        match self {
            PowerUpKind::SpeedBoost => 5_000,
            PowerUpKind::Shield => 8_000,
            PowerUpKind::DoubleScore => 10_000,
        }
    }
}

impl fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PowerUpKind::SpeedBoost => "speed boost",
            PowerUpKind::Shield => "shield",
            PowerUpKind::DoubleScore => "double score",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUpPickup {
    pub position: Point,
    pub kind: PowerUpKind,
}

/// Result of a single simulation step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub moved: bool,
    pub ate_food: bool,
    pub collected_power_up: Option<PowerUpKind>,
    pub teleported: bool,
    pub died: Option<DeathReason>,
    pub new_head: Option<Point>,
    pub expired_power_ups: Vec<PowerUpKind>,
    pub new_high_score: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelSignal {
    LevelComplete(u32),
    GameComplete,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Ended {
        score: u32,
        elapsed: Duration,
        reason: DeathReason,
    },
    LevelStarted(u32),
    LevelComplete(u32),
    GameComplete,
    PowerUpActivated(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    NewHighScore(u32),
}
