use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use snake_engine::games::snake::Direction;
use snake_engine::log;
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Turn(Direction),
    TogglePause,
    Restart,
    Quit,
    None,
}

pub fn map_key(key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Turn(Direction::Right),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => KeyAction::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

/// Reads the keyboard on a dedicated thread since crossterm reads block.
/// The thread exits once `stop` is set or the receiver is dropped.
pub fn spawn_input_thread(tx: mpsc::UnboundedSender<KeyAction>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    log!("Input poll failed: {}", e);
                    break;
                }
            }

            let action = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => map_key(key),
                Ok(_) => continue,
                Err(e) => {
                    log!("Input read failed: {}", e);
                    break;
                }
            };

            if action != KeyAction::None && tx.send(action).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(key(KeyCode::Up)), KeyAction::Turn(Direction::Up));
        assert_eq!(map_key(key(KeyCode::Down)), KeyAction::Turn(Direction::Down));
        assert_eq!(map_key(key(KeyCode::Left)), KeyAction::Turn(Direction::Left));
        assert_eq!(map_key(key(KeyCode::Right)), KeyAction::Turn(Direction::Right));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(map_key(key(KeyCode::Char('w'))), KeyAction::Turn(Direction::Up));
        assert_eq!(map_key(key(KeyCode::Char('A'))), KeyAction::Turn(Direction::Left));
    }

    #[test]
    fn test_controls() {
        assert_eq!(map_key(key(KeyCode::Char('p'))), KeyAction::TogglePause);
        assert_eq!(map_key(key(KeyCode::Char('r'))), KeyAction::Restart);
        assert_eq!(map_key(key(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(map_key(key(KeyCode::Char('x'))), KeyAction::None);
    }
}
