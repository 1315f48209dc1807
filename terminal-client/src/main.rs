mod app;
mod broadcaster;
mod config;
mod event_log;
mod high_score_file;
mod input;
mod terminal;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use crossterm::ExecutableCommand;
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use snake_engine::config::Validate;
use snake_engine::games::SessionRng;
use snake_engine::games::snake::{Difficulty, GameMode, SnakeSession};
use snake_engine::{GameError, log, logger};
use tokio::sync::mpsc;

use app::App;
use broadcaster::TerminalBroadcaster;
use config::{ClientConfig, exe_dir_path, get_config_manager};
use high_score_file::FileHighScoreStore;

#[derive(Parser)]
#[command(name = "snake_terminal", about = "Snake in the terminal")]
struct Args {
    /// easy, medium or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// classic, obstacle, maze, portal, speed or level
    #[arg(long)]
    mode: Option<GameMode>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    /// Fixed seed for a reproducible board
    #[arg(long)]
    seed: Option<u64>,
    /// Save the merged settings back to the config file
    #[arg(long)]
    save_config: bool,
    #[arg(long)]
    use_log_prefix: bool,
}

impl Args {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(difficulty) = self.difficulty {
            config.game.difficulty = difficulty;
        }
        if let Some(mode) = self.mode {
            config.game.mode = mode;
        }
        if let Some(width) = self.width {
            config.game.field_width = width;
        }
        if let Some(height) = self.height {
            config.game.field_height = height;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager = get_config_manager();
    let mut config = config_manager.get_config()?;
    args.apply(&mut config);
    config.validate()?;
    if args.save_config {
        config_manager.set_config(&config)?;
    }

    let prefix = args.use_log_prefix.then(|| "Terminal".to_string());
    logger::init_file_logger(prefix, &exe_dir_path(&config.log_file))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    log!("Starting {} game on {} with seed {}", config.game.mode, config.game.difficulty, seed);

    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let (key_tx, key_rx) = mpsc::unbounded_channel();

    let high_scores = FileHighScoreStore::open(&exe_dir_path(&config.high_score_file));
    let session = SnakeSession::new(
        &config.game,
        SessionRng::new(seed),
        Box::new(high_scores),
        TerminalBroadcaster::new(update_tx),
    )?;

    let mut stdout = io::stdout();
    enter_screen(&mut stdout)?;

    let stop_input = Arc::new(AtomicBool::new(false));
    let input_thread = input::spawn_input_thread(key_tx, stop_input.clone());

    let result = App::new(session, config.event_log_size)
        .run(&mut stdout, update_rx, key_rx)
        .await;

    stop_input.store(true, Ordering::Relaxed);
    let _ = input_thread.join();
    leave_screen(&mut stdout)?;

    if let Err(ref e) = result {
        log!("Game loop failed: {}", e);
    }
    log!("Terminal client shut down");
    Ok(result?)
}

fn enter_screen(stdout: &mut Stdout) -> Result<(), GameError> {
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;
    Ok(())
}

fn leave_screen(stdout: &mut Stdout) -> Result<(), GameError> {
    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let args = Args::parse_from([
            "snake_terminal",
            "--difficulty",
            "hard",
            "--mode",
            "maze",
            "--width",
            "31",
        ]);
        let mut config = ClientConfig::default();

        args.apply(&mut config);

        assert_eq!(config.game.difficulty, Difficulty::Hard);
        assert_eq!(config.game.mode, GameMode::Maze);
        assert_eq!(config.game.field_width, 31);
        assert_eq!(config.game.field_height, 20);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["snake_terminal", "--mode", "tron"]).is_err());
    }
}
