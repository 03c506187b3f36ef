use serde::{Deserialize, Serialize};

use crate::session::Position;

/// Tool start point of the lathe bench, in mm.
pub const DEFAULT_START: Position = Position { x: 30.0, y: -10.0 };
/// Interpolation frame spacing for feed moves, in ms.
pub const DEFAULT_FRAME_MS: f64 = 10.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub start: Position,
    pub frame_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            frame_ms: DEFAULT_FRAME_MS,
        }
    }
}

impl SimConfig {
    /// Frame spacing with a floor, so a bad host value cannot stall playback.
    pub fn frame_ms(&self) -> f64 {
        if self.frame_ms.is_finite() && self.frame_ms >= 1.0 {
            self.frame_ms
        } else {
            DEFAULT_FRAME_MS
        }
    }
}
