use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Run-time state of one simulation pass. Only the player writes it.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Session {
    pub(crate) position: Position,
    pub(crate) cursor: usize,
    pub(crate) paused: bool,
    pub(crate) rapid_moves: u32,
}

impl Session {
    pub fn new(start: Position) -> Self {
        Self {
            position: start,
            cursor: 0,
            paused: false,
            rapid_moves: 0,
        }
    }

    pub fn reset(&mut self, start: Position) {
        *self = Session::new(start);
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn rapid_moves(&self) -> u32 {
        self.rapid_moves
    }

    /// Counts a rapid move and returns the new total.
    pub(crate) fn record_rapid(&mut self) -> u32 {
        self.rapid_moves += 1;
        self.rapid_moves
    }
}
