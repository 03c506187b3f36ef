use wasm_bindgen::prelude::*;
use serde::Serialize;

// --- LOGGING ---
#[macro_use]
mod log;

pub mod config;
pub mod error;
pub mod executor;
pub mod mirror;
pub mod parser;
pub mod player;
pub mod program;
pub mod session;
pub mod sketch;
pub mod timeline;

pub use config::SimConfig;
pub use error::SimError;
pub use executor::{execute, Motion};
pub use mirror::mirror;
pub use parser::{parse_line, Instruction, Kind, Word};
pub use player::{
    EventSink, MoveKind, Player, PlayerSnapshot, PlayerState, Segment, SimEvent, StatusLevel,
};
pub use program::{Line, Program};
pub use session::{Position, Session};

#[derive(Serialize)]
struct SimulatorState<'a> {
    #[serde(flatten)]
    player: PlayerSnapshot,
    lines: &'a [Line],
}

/// Browser-facing wrapper around a [`Player`]. The host calls `tick` from
/// its animation loop and drains events to draw them.
#[wasm_bindgen]
pub struct Simulator {
    player: Player<Vec<SimEvent>>,
}

#[wasm_bindgen]
impl Simulator {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Self {
        let config: SimConfig = if config.is_undefined() || config.is_null() {
            SimConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).unwrap_or_default()
        };
        console_log!(
            "Lathe simulator ready: start=({}, {}), frame={}ms",
            config.start.x,
            config.start.y,
            config.frame_ms()
        );
        Self {
            player: Player::new(config, Vec::new()),
        }
    }

    // ── Program control ────────────────────────────────────────────────────

    pub fn load_program(&mut self, code: String) {
        self.player.load(Program::parse(&code));
    }

    /// Starts the loaded program from the beginning.
    pub fn start(&mut self) {
        let program = self.player.program().clone();
        self.player.start(program);
    }

    pub fn pause(&mut self) -> std::result::Result<(), JsError> {
        self.player.pause().map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn resume(&mut self) -> std::result::Result<(), JsError> {
        self.player.resume().map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn step(&mut self) {
        self.player.step();
    }

    pub fn reset(&mut self, clear: bool) {
        self.player.reset(clear);
    }

    pub fn flip_and_replay(&mut self) -> std::result::Result<(), JsError> {
        self.player
            .flip_and_replay()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&mut self, dt_ms: f64) {
        if dt_ms <= 0.0 {
            return;
        }
        self.player.advance(dt_ms);
    }

    // ── State ─────────────────────────────────────────────────────────────

    pub fn drain_events(&mut self) -> JsValue {
        let events = std::mem::take(self.player.sink_mut());
        serde_wasm_bindgen::to_value(&events).unwrap_or(JsValue::NULL)
    }

    pub fn get_state(&self) -> JsValue {
        let state = SimulatorState {
            player: self.player.snapshot(),
            lines: self.player.program().lines(),
        };
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }

    pub fn translate(&self, code: String) -> String {
        sketch::translate(&Program::parse(&code))
    }
}
