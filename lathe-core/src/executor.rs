use crate::error::{Result, SimError};
use crate::parser::Instruction;
use crate::session::Position;

/// Outcome of executing one instruction from a known position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub position: Position,
    /// Traversal time in seconds, 0 when no feed is commanded.
    pub duration: f64,
}

impl Motion {
    pub fn duration_ms(&self) -> f64 {
        self.duration * 1000.0
    }
}

/// Applies `ins` to `from`. Pure: the caller decides whether to commit the
/// new position, and nothing is committed when this fails.
pub fn execute(ins: &Instruction, from: Position) -> Result<Motion> {
    if !ins.is_move() {
        return Ok(Motion {
            position: from,
            duration: 0.0,
        });
    }

    let target = Position {
        x: ins.value('X').unwrap_or(from.x),
        y: ins.value('Y').unwrap_or(from.y),
    };

    let duration = match ins.value('F') {
        Some(feed) if feed <= 0.0 => return Err(SimError::InvalidFeedRate { feed }),
        Some(feed) => from.distance(&target) / feed,
        None => 0.0,
    };

    Ok(Motion {
        position: target,
        duration,
    })
}
