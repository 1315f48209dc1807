use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use snake_engine::GameError;
use snake_engine::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use snake_engine::games::snake::SnakeSessionSettings;

const CONFIG_FILE_NAME: &str = "snake_terminal_config.yaml";

/// Resolves `file_name` next to the executable, falling back to the working
/// directory.
pub fn exe_dir_path(file_name: &str) -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(file_name);
    }
    PathBuf::from(file_name)
}

pub fn get_config_manager() -> ConfigManager<FileContentConfigProvider, ClientConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(&exe_dir_path(CONFIG_FILE_NAME))
}

fn default_event_log_size() -> usize {
    8
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    pub game: SnakeSessionSettings,
    pub high_score_file: String,
    pub log_file: String,
    #[serde(default = "default_event_log_size")]
    pub event_log_size: usize,
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), GameError> {
        self.game.validate()?;
        if self.high_score_file.trim().is_empty() {
            return Err(GameError::config("high_score_file must not be empty"));
        }
        if self.log_file.trim().is_empty() {
            return Err(GameError::config("log_file must not be empty"));
        }
        if self.event_log_size == 0 {
            return Err(GameError::config("event_log_size must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game: SnakeSessionSettings::default(),
            high_score_file: "snake_high_score.yaml".to_string(),
            log_file: "snake_terminal.log".to_string(),
            event_log_size: default_event_log_size(),
        }
    }
}
