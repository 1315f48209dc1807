use std::io::Write;

use snake_engine::GameError;
use snake_engine::games::snake::{RenderFrame, SessionStatus, SnakeSession};
use snake_engine::log;
use tokio::sync::mpsc;

use crate::broadcaster::{TerminalBroadcaster, UiUpdate};
use crate::event_log::EventLog;
use crate::input::KeyAction;
use crate::terminal::Renderer;

/// Owns the session and the screen. Frames and events arrive from the
/// session timers, keys from the input thread.
pub struct App {
    session: SnakeSession<TerminalBroadcaster>,
    renderer: Renderer,
    events: EventLog,
    last_frame: Option<RenderFrame>,
}

impl App {
    pub fn new(session: SnakeSession<TerminalBroadcaster>, event_log_size: usize) -> Self {
        Self {
            session,
            renderer: Renderer::new(),
            events: EventLog::new(event_log_size),
            last_frame: None,
        }
    }

    pub async fn run(
        mut self,
        out: &mut impl Write,
        mut updates: mpsc::UnboundedReceiver<UiUpdate>,
        mut keys: mpsc::UnboundedReceiver<KeyAction>,
    ) -> Result<(), GameError> {
        self.last_frame = Some(self.session.with_game(|game| game.render_frame()));
        self.redraw(out)?;

        loop {
            tokio::select! {
                Some(update) = updates.recv() => {
                    match update {
                        UiUpdate::Frame(frame) => self.last_frame = Some(*frame),
                        UiUpdate::Event(event) => {
                            log!("Event: {:?}", event);
                            self.events.push(&event);
                        }
                    }
                    self.redraw(out)?;
                }
                action = keys.recv() => {
                    match action {
                        Some(KeyAction::Quit) | None => break,
                        Some(action) => self.handle_action(action)?,
                    }
                }
            }
        }

        self.session.stop();
        Ok(())
    }

    fn handle_action(&mut self, action: KeyAction) -> Result<(), GameError> {
        let status = self.session.with_game(|game| game.status());
        match action {
            KeyAction::Turn(direction) => {
                self.session.set_direction(direction);
                if status == SessionStatus::NotStarted {
                    self.session.start();
                }
            }
            KeyAction::TogglePause => match status {
                SessionStatus::Running => {
                    self.session.pause();
                }
                SessionStatus::Paused => {
                    self.session.resume();
                }
                SessionStatus::NotStarted => {
                    self.session.start();
                }
                _ => {}
            },
            KeyAction::Restart => {
                self.session.reset()?;
                log!("Game restarted");
            }
            KeyAction::Quit | KeyAction::None => {}
        }
        Ok(())
    }

    fn redraw(&mut self, out: &mut impl Write) -> Result<(), GameError> {
        if let Some(frame) = self.last_frame.as_ref() {
            self.renderer.draw(out, frame, &self.events)?;
        }
        Ok(())
    }
}
