use std::collections::HashSet;
use std::io::{self, Write};

use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use snake_engine::games::snake::{Point, PowerUpKind, RenderFrame, SessionStatus};

use crate::event_log::EventLog;

const CELL_W: u16 = 2;
/// HUD, power-up line and top border.
const HEADER_ROWS: u16 = 3;
const HELP: &str = "arrows/WASD turn  p pause  r restart  q quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Empty,
    Head,
    Body,
    Food,
    Obstacle,
    MazeWall,
    Portal,
    Pickup(PowerUpKind),
}

impl Glyph {
    fn style(&self) -> (&'static str, Color) {
        match self {
            Glyph::Empty => ("  ", Color::Reset),
            Glyph::Head => ("@@", Color::Green),
            Glyph::Body => ("oo", Color::DarkGreen),
            Glyph::Food => ("<>", Color::Red),
            Glyph::Obstacle => ("##", Color::DarkYellow),
            Glyph::MazeWall => ("██", Color::Blue),
            Glyph::Portal => ("()", Color::Magenta),
            Glyph::Pickup(PowerUpKind::SpeedBoost) => ("S!", Color::Cyan),
            Glyph::Pickup(PowerUpKind::Shield) => ("H!", Color::Cyan),
            Glyph::Pickup(PowerUpKind::DoubleScore) => ("D!", Color::Cyan),
        }
    }
}

/// Cell lookup for a single frame.
pub struct FrameCells<'a> {
    frame: &'a RenderFrame,
    body: HashSet<Point>,
    obstacles: HashSet<Point>,
    maze_walls: HashSet<Point>,
}

impl<'a> FrameCells<'a> {
    pub fn new(frame: &'a RenderFrame) -> Self {
        Self {
            frame,
            body: frame.snake.iter().skip(1).copied().collect(),
            obstacles: frame.obstacles.iter().copied().collect(),
            maze_walls: frame.maze_walls.iter().copied().collect(),
        }
    }

    pub fn glyph_at(&self, point: Point) -> Glyph {
        if self.frame.snake.first() == Some(&point) {
            return Glyph::Head;
        }
        if self.body.contains(&point) {
            return Glyph::Body;
        }
        if let Some(pickup) = self.frame.pickup
            && pickup.position == point
        {
            return Glyph::Pickup(pickup.kind);
        }
        if self.frame.food == Some(point) {
            return Glyph::Food;
        }
        if let Some((first, second)) = self.frame.portals
            && (first == point || second == point)
        {
            return Glyph::Portal;
        }
        if self.obstacles.contains(&point) {
            return Glyph::Obstacle;
        }
        if self.maze_walls.contains(&point) {
            return Glyph::MazeWall;
        }
        Glyph::Empty
    }
}

pub fn hud_line(frame: &RenderFrame) -> String {
    let session = &frame.session;
    let mut hud = format!("Score: {}  High: {}", session.score, session.high_score);
    if let Some(level) = session.current_level {
        hud.push_str(&format!("  Level: {}", level));
    }
    if let Some(secs) = frame.time_remaining_secs {
        hud.push_str(&format!("  Time: {}s", secs));
    }
    hud.push_str(&format!("  Speed: x{:.2}  [{}]", session.speed_multiplier, status_text(session.status)));
    hud
}

pub fn power_up_line(frame: &RenderFrame) -> String {
    let active: Vec<String> = frame
        .power_ups
        .iter()
        .filter(|(_, state)| state.active)
        .map(|(kind, state)| format!("{} {:.1}s", kind, state.remaining_ms as f64 / 1000.0))
        .collect();
    if active.is_empty() {
        "Power-ups: none".to_string()
    } else {
        format!("Power-ups: {}", active.join(", "))
    }
}

fn status_text(status: SessionStatus) -> String {
    match status {
        SessionStatus::NotStarted => "press an arrow to start".to_string(),
        SessionStatus::Running => "running".to_string(),
        SessionStatus::Paused => "paused".to_string(),
        SessionStatus::Ended(reason) => format!("game over: {}", reason),
        SessionStatus::Completed => "all levels cleared".to_string(),
    }
}

#[derive(Default)]
pub struct Renderer {
    last_size: Option<(u16, u16)>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, out: &mut impl Write, frame: &RenderFrame, events: &EventLog) -> io::Result<()> {
        let size = terminal::size()?;
        if self.last_size != Some(size) {
            out.queue(Clear(ClearType::All))?;
            self.last_size = Some(size);
        }

        let board_w = frame.field_width as u16 * CELL_W + 2;
        let board_h = frame.field_height as u16 + 2;
        let (term_w, term_h) = size;
        if term_w < board_w || term_h < HEADER_ROWS + board_h {
            out.queue(MoveTo(0, 0))?;
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                board_w,
                HEADER_ROWS + board_h,
                term_w,
                term_h
            )))?;
            self.last_size = None;
            return out.flush();
        }

        self.print_line(out, 0, Color::White, &hud_line(frame))?;
        self.print_line(out, 1, Color::Cyan, &power_up_line(frame))?;

        let border = "-".repeat((frame.field_width as u16 * CELL_W) as usize);
        self.print_line(out, HEADER_ROWS - 1, Color::Grey, &format!("+{}+", border))?;

        let cells = FrameCells::new(frame);
        for y in 0..frame.field_height {
            let row = HEADER_ROWS + y as u16;
            out.queue(MoveTo(0, row))?;
            out.queue(SetForegroundColor(Color::Grey))?;
            out.queue(Print('|'))?;
            for x in 0..frame.field_width {
                let (text, color) = cells.glyph_at(Point::new(x, y)).style();
                out.queue(SetForegroundColor(color))?;
                out.queue(Print(text))?;
            }
            out.queue(SetForegroundColor(Color::Grey))?;
            out.queue(Print('|'))?;
        }

        let footer = HEADER_ROWS + frame.field_height as u16;
        self.print_line(out, footer, Color::Grey, &format!("+{}+", border))?;
        self.print_line(out, footer + 1, Color::DarkGrey, HELP)?;

        let mut row = footer + 2;
        for line in events.lines() {
            if row >= term_h {
                break;
            }
            self.print_line(out, row, Color::White, line)?;
            row += 1;
        }

        out.queue(ResetColor)?;
        out.flush()
    }

    fn print_line(&self, out: &mut impl Write, row: u16, color: Color, text: &str) -> io::Result<()> {
        out.queue(MoveTo(0, row))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(SetForegroundColor(color))?;
        out.queue(Print(text))?;
        out.queue(ResetColor)?;
        Ok(())
    }
}
