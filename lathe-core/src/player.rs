//! Trajectory player: walks a program one instruction at a time and emits
//! the tool path as segment events.
//!
//! Time is cooperative. Every delay (the gap before the next instruction,
//! the spacing between interpolation frames) is a continuation on the
//! player's [`Timeline`], fired from [`Player::advance`]. `reset` and `start`
//! revoke whatever is still scheduled, so a stale continuation can never
//! touch a newer run.
//!
//! Pausing only gates instruction dispatch. Interpolation frames of a feed
//! move already in flight keep firing until the move is fully drawn.

use serde::Serialize;

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::executor::{self, Motion};
use crate::mirror;
use crate::parser::Kind;
use crate::program::Program;
use crate::session::{Position, Session};
use crate::timeline::Timeline;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl PlayerState {
    pub fn name(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Running => "running",
            PlayerState::Paused => "paused",
            PlayerState::Completed => "completed",
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Rapid,
    Feed,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Position,
    pub end: Position,
    pub kind: MoveKind,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Program index about to run and its source line number.
    InstructionStarted { index: usize, line: usize },
    Segment(Segment),
    Position(Position),
    Status { level: StatusLevel, message: String },
    /// The drawing surface should be wiped.
    Cleared,
}

/// Consumer of player output: a renderer adapter, a host bridge, a test.
pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Interpolation {
    from: Position,
    to: Position,
    frame: usize,
    frames: usize,
}

impl Interpolation {
    fn segment(&self) -> Segment {
        let t0 = (self.frame - 1) as f64 / self.frames as f64;
        let end = if self.frame == self.frames {
            self.to
        } else {
            self.from.lerp(&self.to, self.frame as f64 / self.frames as f64)
        };
        Segment {
            start: self.from.lerp(&self.to, t0),
            end,
            kind: MoveKind::Feed,
        }
    }
}

enum Task {
    /// Auto-advance to the next instruction; only the latest ticket is live.
    Dispatch(u64),
    Frame(Interpolation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Completed,
}

/// Primary run parked while a mirrored copy of its prefix replays.
struct MirrorRun {
    primary: Program,
    checkpoint: Session,
    phase: Phase,
}

struct Dispatched {
    terminal: bool,
    delay_ms: f64,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub session: Session,
    pub program_len: usize,
    pub now_ms: f64,
    pub mirrored_replay: bool,
}

pub struct Player<S: EventSink> {
    config: SimConfig,
    program: Program,
    session: Session,
    phase: Phase,
    mirror: Option<MirrorRun>,
    timeline: Timeline<Task>,
    pending_dispatch: Option<u64>,
    tickets: u64,
    sink: S,
}

impl<S: EventSink> Player<S> {
    pub fn new(config: SimConfig, sink: S) -> Self {
        Self {
            config,
            program: Program::default(),
            session: Session::new(config.start),
            phase: Phase::Idle,
            mirror: None,
            timeline: Timeline::new(),
            pending_dispatch: None,
            tickets: 0,
            sink,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn state(&self) -> PlayerState {
        match self.phase {
            Phase::Idle => PlayerState::Idle,
            Phase::Completed => PlayerState::Completed,
            Phase::Running if self.session.paused => PlayerState::Paused,
            Phase::Running => PlayerState::Running,
        }
    }

    /// True when no continuation is waiting on the clock.
    pub fn is_settled(&self) -> bool {
        self.timeline.is_idle()
    }

    pub fn now_ms(&self) -> f64 {
        self.timeline.now_ms()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state(),
            session: self.session,
            program_len: self.program.len(),
            now_ms: self.timeline.now_ms(),
            mirrored_replay: self.mirror.is_some(),
        }
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Replaces the program and resets the session, clearing the drawing.
    pub fn load(&mut self, program: Program) {
        self.mirror = None;
        self.program = program;
        self.reset_session(true);
    }

    pub fn start(&mut self, program: Program) {
        self.load(program);
        self.phase = Phase::Running;
        console_log!("Simulation started ({} instructions)", self.program.len());
        self.dispatch_next();
    }

    pub fn pause(&mut self) -> Result<()> {
        match self.state() {
            PlayerState::Running => {
                self.session.paused = true;
                self.status(StatusLevel::Info, "Simulation paused");
                Ok(())
            }
            state => Err(SimError::InvalidTransition {
                action: "pause",
                state: state.name(),
            }),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.state() {
            PlayerState::Paused => {
                self.session.paused = false;
                self.status(StatusLevel::Info, "Simulation resumed");
                // A dispatch scheduled before the pause is still on the clock.
                if self.pending_dispatch.is_none() {
                    self.dispatch_next();
                }
                Ok(())
            }
            state => Err(SimError::InvalidTransition {
                action: "resume",
                state: state.name(),
            }),
        }
    }

    /// Runs exactly one instruction and holds. A running player is paused
    /// and its scheduled auto-advance dropped; stepping a finished program
    /// resets it.
    pub fn step(&mut self) {
        if self.phase == Phase::Completed || self.session.cursor >= self.program.len() {
            self.status(StatusLevel::Info, "All instructions executed");
            self.reset(true);
            return;
        }
        self.cancel_dispatch();
        self.phase = Phase::Running;
        self.session.paused = true;
        if let Some(done) = self.dispatch_current() {
            if done.terminal || self.session.cursor >= self.program.len() {
                self.complete();
            }
        }
    }

    pub fn reset(&mut self, clear: bool) {
        if let Some(run) = self.mirror.take() {
            self.program = run.primary;
        }
        self.reset_session(clear);
    }

    /// Replays a Y-mirrored copy of the instructions executed so far on top
    /// of the current drawing, then returns to the primary program at the
    /// point where it was left.
    pub fn flip_and_replay(&mut self) -> Result<()> {
        if self.mirror.is_some() {
            return Err(SimError::InvalidTransition {
                action: "flip",
                state: "replaying a mirrored program",
            });
        }
        let mirrored = mirror::mirror_prefix(&self.program, self.session.cursor);
        let checkpoint = self.session;
        let phase = self.phase;

        // Frames of a move still being drawn keep firing on the clock.
        self.rewind(false);
        self.session.position = checkpoint.position;
        self.session.cursor = checkpoint.cursor;
        self.session.rapid_moves = checkpoint.rapid_moves;

        let primary = std::mem::replace(&mut self.program, mirrored);
        self.mirror = Some(MirrorRun {
            primary,
            checkpoint,
            phase,
        });
        self.session.cursor = 0;
        self.phase = Phase::Running;
        self.status(
            StatusLevel::Info,
            &format!("Replaying {} mirrored instructions", self.program.len()),
        );
        self.dispatch_next();
        Ok(())
    }

    /// Moves the clock forward by `dt_ms`, firing everything that falls due.
    pub fn advance(&mut self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let until = self.timeline.now_ms() + dt;
        while let Some(task) = self.timeline.pop_due(until) {
            match task {
                Task::Dispatch(ticket) if self.pending_dispatch == Some(ticket) => {
                    self.dispatch_next()
                }
                Task::Dispatch(_) => {}
                Task::Frame(interp) => self.draw_frame(interp),
            }
        }
        self.timeline.settle_at(until);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn status(&mut self, level: StatusLevel, message: &str) {
        if level == StatusLevel::Error {
            console_log!("{message}");
        }
        self.sink.emit(SimEvent::Status {
            level,
            message: message.to_string(),
        });
    }

    fn reset_session(&mut self, clear: bool) {
        self.timeline.revoke();
        self.rewind(clear);
    }

    /// Session back to the start point with no auto-advance scheduled.
    fn rewind(&mut self, clear: bool) {
        self.cancel_dispatch();
        self.session.reset(self.config.start);
        self.phase = Phase::Idle;
        if clear {
            self.sink.emit(SimEvent::Cleared);
        }
        self.sink.emit(SimEvent::Position(self.session.position));
    }

    fn cancel_dispatch(&mut self) {
        self.pending_dispatch = None;
    }

    fn dispatch_next(&mut self) {
        self.pending_dispatch = None;
        if self.phase != Phase::Running || self.session.paused {
            return;
        }
        if self.session.cursor >= self.program.len() {
            self.complete();
            return;
        }
        let Some(done) = self.dispatch_current() else {
            return;
        };
        if done.terminal {
            self.complete();
            return;
        }
        self.tickets += 1;
        self.pending_dispatch = Some(self.tickets);
        self.timeline.schedule(done.delay_ms, Task::Dispatch(self.tickets));
    }

    /// Executes the instruction under the cursor and advances the cursor.
    /// A line that fails to parse or execute is reported and skipped without
    /// touching the tool position.
    fn dispatch_current(&mut self) -> Option<Dispatched> {
        let index = self.session.cursor;
        let line = self.program.get(index)?.clone();
        self.sink.emit(SimEvent::InstructionStarted {
            index,
            line: line.number,
        });

        let from = self.session.position;
        let parsed = line
            .parse()
            .and_then(|ins| executor::execute(&ins, from).map(|m| (ins, m)));
        let (ins, motion) = match parsed {
            Ok(ok) => ok,
            Err(e) => {
                self.status(StatusLevel::Error, &format!("Line {}: {e}", line.number));
                self.session.cursor += 1;
                return Some(Dispatched {
                    terminal: false,
                    delay_ms: 0.0,
                });
            }
        };

        match ins.kind() {
            Kind::Rapid => {
                // Only the first rapid of a session is drawn.
                if self.session.record_rapid() == 1 {
                    self.sink.emit(SimEvent::Segment(Segment {
                        start: from,
                        end: motion.position,
                        kind: MoveKind::Rapid,
                    }));
                }
            }
            Kind::Linear => self.trace_feed(from, &motion),
            Kind::ProgramEnd | Kind::Other => {}
        }

        if ins.is_move() {
            self.session.position = motion.position;
            self.sink.emit(SimEvent::Position(motion.position));
            self.status(StatusLevel::Info, &format!("Executing: {ins}"));
        }
        self.session.cursor += 1;

        Some(Dispatched {
            terminal: ins.kind() == Kind::ProgramEnd,
            delay_ms: motion.duration_ms(),
        })
    }

    fn trace_feed(&mut self, from: Position, motion: &Motion) {
        let duration_ms = motion.duration_ms();
        if duration_ms <= 0.0 {
            self.sink.emit(SimEvent::Segment(Segment {
                start: from,
                end: motion.position,
                kind: MoveKind::Feed,
            }));
            return;
        }
        let frames = ((duration_ms / self.config.frame_ms()).floor() as usize).max(1);
        self.draw_frame(Interpolation {
            from,
            to: motion.position,
            frame: 1,
            frames,
        });
    }

    fn draw_frame(&mut self, interp: Interpolation) {
        self.sink.emit(SimEvent::Segment(interp.segment()));
        if interp.frame < interp.frames {
            let next = Interpolation {
                frame: interp.frame + 1,
                ..interp
            };
            self.timeline.schedule(self.config.frame_ms(), Task::Frame(next));
        }
    }

    fn complete(&mut self) {
        if let Some(run) = self.mirror.take() {
            self.finish_mirror(run);
            return;
        }
        self.phase = Phase::Completed;
        self.session.paused = false;
        self.status(StatusLevel::Info, "Simulation complete");
    }

    fn finish_mirror(&mut self, run: MirrorRun) {
        self.program = run.primary;
        self.session.cursor = run.checkpoint.cursor;
        self.session.position = run.checkpoint.position;
        match run.phase {
            Phase::Running if self.session.cursor < self.program.len() => {
                self.phase = Phase::Running;
                self.session.paused = true;
            }
            Phase::Running => {
                self.phase = Phase::Completed;
                self.session.paused = false;
            }
            phase => {
                self.phase = phase;
                self.session.paused = false;
            }
        }
        self.sink.emit(SimEvent::Position(self.session.position));
        self.status(StatusLevel::Info, "Mirrored replay complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() <= 1e-6,
            "expected {:.6}, got {:.6} (|diff|={:.6})",
            b,
            a,
            (a - b).abs()
        );
    }

    fn player() -> Player<Vec<SimEvent>> {
        Player::new(SimConfig::default(), Vec::new())
    }

    fn drive(p: &mut Player<Vec<SimEvent>>) {
        for _ in 0..1_000_000 {
            if p.is_settled() {
                return;
            }
            p.advance(10.0);
        }
        panic!("player never settled");
    }

    fn segments(events: &[SimEvent]) -> Vec<Segment> {
        events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Segment(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn positions(events: &[SimEvent]) -> Vec<Position> {
        events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Position(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn started(events: &[SimEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                SimEvent::InstructionStarted { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    fn errors(events: &[SimEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::Status { level: StatusLevel::Error, .. }))
            .count()
    }

    const PART: &str = "G00 X0 Y0\n\
                        G01 X10 Y0 F20\n\
                        G00 X10 Y5\n\
                        G01 X0 Y5 F40\n\
                        G01 X0 Y0\n\
                        M30\n";

    #[test]
    fn only_first_rapid_is_drawn() {
        let mut p = player();
        p.start(Program::parse("G00 X0 Y0\nG00 X5 Y5\nG00 X1 Y2"));
        drive(&mut p);

        let segs = segments(p.sink());
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].kind, MoveKind::Rapid);
        assert_eq!(segs[0].start, Position::new(30.0, -10.0));
        assert_eq!(segs[0].end, Position::new(0.0, 0.0));
        assert_eq!(p.session().position(), Position::new(1.0, 2.0));
        assert_eq!(p.session().rapid_moves(), 3);
        assert_eq!(p.state(), PlayerState::Completed);
    }

    #[test]
    fn feed_move_is_drawn_in_frames_over_its_duration() {
        let mut p = player();
        p.start(Program::parse("G00 X0 Y0\nG01 X3 Y4 F5"));
        assert_eq!(segments(p.sink()).len(), 1);

        p.advance(0.0);
        assert_eq!(segments(p.sink()).len(), 2);
        assert_eq!(p.session().position(), Position::new(3.0, 4.0));

        p.advance(999.0);
        let segs = segments(p.sink());
        assert_eq!(segs.len(), 101);
        assert_eq!(p.state(), PlayerState::Running);

        p.advance(1.0);
        assert_eq!(p.state(), PlayerState::Completed);

        let frames = &segs[1..];
        assert!(frames.iter().all(|s| s.kind == MoveKind::Feed));
        assert_eq!(frames[0].start, Position::new(0.0, 0.0));
        assert_eq!(frames[99].end, Position::new(3.0, 4.0));
        for pair in frames.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        approx_eq(frames[0].end.x, 0.03);
        approx_eq(frames[0].end.y, 0.04);
    }

    #[test]
    fn short_feed_move_still_draws_one_frame() {
        let mut p = player();
        // 0.5mm at 100mm/s is 5ms, under one frame.
        p.start(Program::parse("G01 X30.5 Y-10 F100"));
        let segs = segments(p.sink());
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].end, Position::new(30.5, -10.0));
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);
    }

    #[test]
    fn feed_move_without_feed_rate_is_one_segment() {
        let mut p = player();
        p.start(Program::parse("G01 X5"));
        let segs = segments(p.sink());
        assert_eq!(
            segs,
            vec![Segment {
                start: Position::new(30.0, -10.0),
                end: Position::new(5.0, -10.0),
                kind: MoveKind::Feed,
            }]
        );
    }

    #[test]
    fn program_end_stops_the_run() {
        let mut p = player();
        p.start(Program::parse("G01 X1\nM30\nG01 X9"));
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().cursor(), 2);
        assert_eq!(p.session().position(), Position::new(1.0, -10.0));
        assert_eq!(started(p.sink()), vec![0, 1]);
    }

    #[test]
    fn bad_lines_are_reported_and_skipped() {
        let mut p = player();
        p.start(Program::parse("G01 X1\nG01 Xq\nG01 X3 F0\nhello\nG01 X4"));
        drive(&mut p);

        assert_eq!(errors(p.sink()), 3);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().cursor(), 5);
        assert_eq!(
            positions(p.sink()),
            vec![
                Position::new(30.0, -10.0),
                Position::new(1.0, -10.0),
                Position::new(4.0, -10.0),
            ]
        );
    }

    #[test]
    fn pause_holds_dispatch_and_resume_continues_in_order() {
        let mut reference = player();
        reference.start(Program::parse(PART));
        drive(&mut reference);

        let mut p = player();
        p.start(Program::parse(PART));
        p.advance(0.0);
        p.advance(120.0);
        p.pause().unwrap();
        assert_eq!(p.state(), PlayerState::Paused);
        let cursor = p.session().cursor();

        p.advance(5_000.0);
        assert_eq!(p.session().cursor(), cursor);
        assert_eq!(p.state(), PlayerState::Paused);

        p.resume().unwrap();
        drive(&mut p);

        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(started(p.sink()), started(reference.sink()));
        assert_eq!(segments(p.sink()), segments(reference.sink()));
        assert_eq!(p.session(), reference.session());
    }

    #[test]
    fn quick_pause_resume_does_not_run_an_instruction_twice() {
        let mut p = player();
        p.start(Program::parse("G01 X10 F10\nG01 X20 F10\nM30"));
        p.pause().unwrap();
        p.resume().unwrap();
        drive(&mut p);
        assert_eq!(started(p.sink()), vec![0, 1, 2]);
        assert_eq!(p.session().position(), Position::new(20.0, -10.0));
    }

    #[test]
    fn transitions_are_checked() {
        let mut p = player();
        assert!(matches!(
            p.pause(),
            Err(SimError::InvalidTransition { action: "pause", state: "idle" })
        ));
        p.start(Program::parse("G01 X10 F1\nG01 X0 F1"));
        assert!(matches!(
            p.resume(),
            Err(SimError::InvalidTransition { action: "resume", state: "running" })
        ));
        p.pause().unwrap();
        assert!(p.pause().is_err());
    }

    #[test]
    fn stepping_through_matches_a_full_run() {
        let mut run = player();
        run.start(Program::parse(PART));
        drive(&mut run);

        let mut stepped = player();
        let program = Program::parse(PART);
        let len = program.len();
        stepped.load(program);
        for _ in 0..len {
            stepped.step();
            drive(&mut stepped);
        }

        assert_eq!(stepped.state(), PlayerState::Completed);
        assert_eq!(stepped.session(), run.session());
        assert_eq!(segments(stepped.sink()), segments(run.sink()));
    }

    #[test]
    fn step_from_idle_pauses_and_resume_finishes() {
        let mut p = player();
        p.load(Program::parse("G00 X0 Y0\nG01 X1 Y1\nG01 X2 Y2"));
        p.step();
        assert_eq!(p.state(), PlayerState::Paused);
        assert_eq!(p.session().cursor(), 1);
        p.advance(1_000.0);
        assert_eq!(p.session().cursor(), 1);

        p.resume().unwrap();
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().position(), Position::new(2.0, 2.0));
    }

    #[test]
    fn stepping_past_the_end_resets() {
        let mut p = player();
        p.load(Program::parse("G01 X1"));
        p.step();
        assert_eq!(p.state(), PlayerState::Completed);

        p.sink_mut().clear();
        p.step();
        assert_eq!(p.state(), PlayerState::Idle);
        assert_eq!(*p.session(), Session::new(Position::new(30.0, -10.0)));
        assert!(p.sink().contains(&SimEvent::Cleared));
    }

    #[test]
    fn restart_reproduces_the_same_trajectory() {
        let mut p = player();
        p.start(Program::parse(PART));
        drive(&mut p);
        let first = p.sink().clone();

        p.reset(true);
        p.sink_mut().clear();
        p.start(Program::parse(PART));
        drive(&mut p);

        assert_eq!(positions(p.sink()), positions(&first));
        assert_eq!(segments(p.sink()), segments(&first));
    }

    #[test]
    fn reset_cancels_scheduled_work() {
        let mut p = player();
        p.start(Program::parse("G01 X0 F10\nG01 X30 F10"));
        p.advance(50.0);
        p.reset(true);
        assert!(p.is_settled());

        p.sink_mut().clear();
        p.advance(10_000.0);
        assert!(p.sink().is_empty());
        assert_eq!(p.state(), PlayerState::Idle);
        assert_eq!(p.session().cursor(), 0);
    }

    #[test]
    fn starting_again_drops_the_previous_run() {
        let mut p = player();
        p.start(Program::parse("G01 X0 F10\nG01 X30 F10"));
        p.advance(50.0);
        p.start(Program::parse("G01 X31"));
        p.sink_mut().clear();
        drive(&mut p);
        assert!(segments(p.sink()).is_empty());
        assert_eq!(p.session().position(), Position::new(31.0, -10.0));
    }

    #[test]
    fn mirrored_replay_draws_over_and_restores() {
        let mut p = player();
        p.start(Program::parse("G00 X0 Y0\nG01 X10 Y5\nG01 X20 Y5"));
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);

        p.sink_mut().clear();
        p.flip_and_replay().unwrap();
        drive(&mut p);

        assert!(!p.sink().contains(&SimEvent::Cleared));
        let segs = segments(p.sink());
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].start, Position::new(0.0, 0.0));
        assert_eq!(segs[0].end, Position::new(10.0, -5.0));
        assert_eq!(segs[1].end, Position::new(20.0, -5.0));

        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().cursor(), 3);
        assert_eq!(p.session().position(), Position::new(20.0, 5.0));
        assert_eq!(p.session().rapid_moves(), 2);
        assert_eq!(p.program().get(0).unwrap().text, "G00 X0 Y0");
    }

    #[test]
    fn mirrored_replay_mid_program_can_be_resumed() {
        let mut p = player();
        p.load(Program::parse("G01 X10 Y5\nG01 X20 Y5\nG01 X30 Y0"));
        p.step();
        p.flip_and_replay().unwrap();
        assert!(p.flip_and_replay().is_err());
        drive(&mut p);

        assert_eq!(p.state(), PlayerState::Paused);
        assert_eq!(p.session().cursor(), 1);
        assert_eq!(p.session().position(), Position::new(10.0, 5.0));

        p.resume().unwrap();
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().position(), Position::new(30.0, 0.0));
    }

    #[test]
    fn step_while_running_holds_after_one_instruction() {
        let mut p = player();
        p.start(Program::parse("G01 X29 F10\nG01 X28 F10\nG01 X27 F10\nG01 X26 F10"));
        p.advance(100.0);
        assert_eq!(p.session().cursor(), 2);

        p.step();
        assert_eq!(p.state(), PlayerState::Paused);
        assert_eq!(p.session().cursor(), 3);

        p.advance(5_000.0);
        assert_eq!(p.state(), PlayerState::Paused);
        assert_eq!(p.session().cursor(), 3);

        p.resume().unwrap();
        drive(&mut p);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(started(p.sink()), vec![0, 1, 2, 3]);
        assert_eq!(p.session().position(), Position::new(26.0, -10.0));
    }

    #[test]
    fn flip_during_a_feed_move_finishes_drawing_it() {
        let mut p = player();
        p.start(Program::parse("G01 X20 Y-10 F10"));
        p.advance(100.0);
        p.flip_and_replay().unwrap();
        drive(&mut p);

        let segs = segments(p.sink());
        let primary: Vec<&Segment> = segs
            .iter()
            .filter(|s| s.start.y == -10.0 && s.end.y == -10.0)
            .collect();
        assert_eq!(primary.len(), 100);
        assert!(primary.iter().any(|s| s.end == Position::new(20.0, -10.0)));

        let mirrored = segs.iter().filter(|s| s.start.x == 20.0 && s.end.x == 20.0).count();
        assert_eq!(mirrored, 200);
        assert_eq!(p.state(), PlayerState::Completed);
        assert_eq!(p.session().position(), Position::new(20.0, -10.0));
    }

    #[test]
    fn rapid_with_feed_delays_the_next_instruction() {
        let mut p = player();
        // 30mm at 10mm/s
        p.start(Program::parse("G00 X0 Y-10 F10\nG01 X0 Y0"));
        assert_eq!(p.session().cursor(), 1);

        p.advance(2_999.0);
        assert_eq!(p.session().cursor(), 1);
        assert_eq!(p.session().position(), Position::new(0.0, -10.0));

        p.advance(1.0);
        assert_eq!(p.session().cursor(), 2);
        assert_eq!(p.session().position(), Position::new(0.0, 0.0));
    }

    #[test]
    fn snapshot_reports_state() {
        let mut p = player();
        p.start(Program::parse("G01 X10 F10\nM30"));
        let snap = p.snapshot();
        assert_eq!(snap.state, PlayerState::Running);
        assert_eq!(snap.program_len, 2);
        assert_eq!(snap.session.cursor(), 1);
        assert!(!snap.mirrored_replay);
    }
}
