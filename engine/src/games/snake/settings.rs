use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::config::Validate;
use super::types::{Difficulty, GameMode};

pub const MIN_FIELD_SIZE: i32 = 10;
pub const MAX_FIELD_SIZE: i32 = 100;

/// Per-difficulty base speed, obstacle count and points per food.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub base_interval: Duration,
    pub obstacle_count: usize,
    pub base_score: u32,
}

impl Difficulty {
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                base_interval: Duration::from_millis(200),
                obstacle_count: 5,
                base_score: 5,
            },
            Difficulty::Medium => DifficultyProfile {
                base_interval: Duration::from_millis(150),
                obstacle_count: 10,
                base_score: 10,
            },
            Difficulty::Hard => DifficultyProfile {
                base_interval: Duration::from_millis(100),
                obstacle_count: 15,
                base_score: 20,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level: u32,
    pub target_score: u32,
    pub time_limit_secs: u32,
    pub obstacle_count: usize,
    pub tick_interval_ms: u64,
    pub description: String,
}

impl LevelDefinition {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

pub fn default_levels() -> Vec<LevelDefinition> {
    let level = |level, target_score, time_limit_secs, obstacle_count, tick_interval_ms, description: &str| {
        LevelDefinition {
            level,
            target_score,
            time_limit_secs,
            obstacle_count,
            tick_interval_ms,
            description: description.to_string(),
        }
    };

    vec![
        level(1, 50, 60, 0, 150, "Warm up: open field"),
        level(2, 100, 60, 5, 135, "A few rocks in the grass"),
        level(3, 150, 75, 10, 120, "Crowded meadow"),
        level(4, 200, 90, 15, 105, "Boulder field"),
        level(5, 300, 120, 20, 90, "Final sprint"),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnakeSessionSettings {
    pub field_width: i32,
    pub field_height: i32,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub power_up_spawn_probability: f64,
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelDefinition>,
}

impl Default for SnakeSessionSettings {
    fn default() -> Self {
        Self {
            field_width: 20,
            field_height: 20,
            difficulty: Difficulty::Medium,
            mode: GameMode::Classic,
            power_up_spawn_probability: 0.2,
            levels: default_levels(),
        }
    }
}

impl SnakeSessionSettings {
    /// Cells a generator may fill with obstacles before sampling would
    /// start to stall.
    pub fn obstacle_capacity(&self) -> usize {
        (self.field_width.max(0) as usize * self.field_height.max(0) as usize) / 4
    }
}

impl Validate for SnakeSessionSettings {
    fn validate(&self) -> Result<(), GameError> {
        if !(MIN_FIELD_SIZE..=MAX_FIELD_SIZE).contains(&self.field_width) {
            return Err(GameError::config(format!(
                "field width must be between {} and {}, got {}",
                MIN_FIELD_SIZE, MAX_FIELD_SIZE, self.field_width
            )));
        }
        if !(MIN_FIELD_SIZE..=MAX_FIELD_SIZE).contains(&self.field_height) {
            return Err(GameError::config(format!(
                "field height must be between {} and {}, got {}",
                MIN_FIELD_SIZE, MAX_FIELD_SIZE, self.field_height
            )));
        }
        if !(0.0..=1.0).contains(&self.power_up_spawn_probability) {
            return Err(GameError::config(
                "power-up spawn probability must be between 0.0 and 1.0",
            ));
        }
        if self.mode == GameMode::Obstacle
            && self.difficulty.profile().obstacle_count > self.obstacle_capacity()
        {
            return Err(GameError::config("too many obstacles for the field size"));
        }
        if self.mode == GameMode::Level {
            validate_levels(&self.levels, self.obstacle_capacity())?;
        }
        Ok(())
    }
}

fn validate_levels(levels: &[LevelDefinition], obstacle_capacity: usize) -> Result<(), GameError> {
    if levels.is_empty() {
        return Err(GameError::config("level mode needs at least one level"));
    }
    for (index, definition) in levels.iter().enumerate() {
        if definition.level as usize != index + 1 {
            return Err(GameError::config(format!(
                "levels must be numbered from 1 in order, found {} at position {}",
                definition.level,
                index + 1
            )));
        }
        if definition.target_score == 0 {
            return Err(GameError::config(format!("level {} has no target score", definition.level)));
        }
        if definition.time_limit_secs == 0 {
            return Err(GameError::config(format!("level {} has no time limit", definition.level)));
        }
        if !(20..=5000).contains(&definition.tick_interval_ms) {
            return Err(GameError::config(format!(
                "level {} tick interval must be between 20ms and 5000ms",
                definition.level
            )));
        }
        if definition.obstacle_count > obstacle_capacity {
            return Err(GameError::config(format!(
                "level {} has too many obstacles for the field size",
                definition.level
            )));
        }
    }
    Ok(())
}
