//! The game session: board, falling piece, scoring and the
//! Ready/Running/Paused/GameOver state machine.
//!
//! Every public call runs to completion against `&mut Session`, so an intent
//! and a gravity tick can never interleave. Rejected moves are not errors:
//! they leave the session unchanged and report [`GameEvent::Blocked`].

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::log;
use crate::piece::{ActivePiece, PieceKind, Point, Rotation, rotation_kicks};
use crate::randomizer::{Randomizer, randomizer_from_kind};
use crate::scoring::{drop_interval_ms, level_for_lines, line_clear_points};

/// Hosts that were backgrounded can report very large frame deltas.
const MAX_ADVANCE_MS: f64 = 1000.0;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
pub enum Phase {
    Ready,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    /// Toggles between running and paused.
    Pause,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Locked,
    LineClear { count: u32 },
    LevelUp { level: u32 },
    GameOver,
    Blocked,
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct ActiveView {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    pub color_id: u8,
    pub cells: Vec<Point>,
}

/// Read-only snapshot handed to renderers.
#[derive(Clone, Serialize, Debug, PartialEq, Eq, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub cols: usize,
    pub rows: usize,
    /// Row-major color ids, bottom row first. `0` is empty.
    pub board: Vec<u8>,
    pub active: Option<ActiveView>,
    /// Where the active piece would land; empty when there is no piece.
    pub ghost: Vec<Point>,
    pub next: PieceKind,
    pub level: u32,
    pub lines: u32,
    pub score: u32,
    pub drop_interval_ms: u32,
    pub phase: Phase,
    pub paused: bool,
    pub game_over: bool,
}

impl SessionState {
    /// Color id at `(x, y)`, or `None` outside the board.
    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.board.get(y * self.cols + x).copied()
    }

    pub fn filled_count(&self) -> usize {
        self.board.iter().filter(|&&c| c != 0).count()
    }
}

pub struct Session {
    config: GameConfig,
    board: Board,
    active: Option<ActivePiece>,
    next: PieceKind,
    randomizer: Box<dyn Randomizer>,
    phase: Phase,
    level: u32,
    lines: u32,
    score: u32,
    drop_interval_ms: u32,
    fall_accum: f64,
}

impl Session {
    /// Builds a session in the `Ready` phase. Piece order is drawn from `rng`.
    pub fn new<R>(config: GameConfig, rng: R) -> Result<Self, EngineError>
    where
        R: RngCore + 'static,
    {
        config.validate()?;
        let board = Board::new(config.cols, config.rows)?;
        let mut randomizer = randomizer_from_kind(config.randomizer.clone(), rng);
        let next = randomizer.next();
        Ok(Self {
            config,
            board,
            active: None,
            next,
            randomizer,
            phase: Phase::Ready,
            level: 1,
            lines: 0,
            score: 0,
            drop_interval_ms: drop_interval_ms(1),
            fall_accum: 0.0,
        })
    }

    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Result<Self, EngineError> {
        Self::new(config, StdRng::from_entropy())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    /// Starts a fresh game from any phase: empty board, level 1, no score.
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Ready {
            self.randomizer.reset();
            self.next = self.randomizer.next();
        }
        self.board.clear();
        self.level = 1;
        self.lines = 0;
        self.score = 0;
        self.drop_interval_ms = drop_interval_ms(1);
        self.fall_accum = 0.0;
        self.phase = Phase::Running;
        log(&format!(
            "session start {}x{} ({:?})",
            self.board.cols(),
            self.board.rows(),
            self.config.randomizer
        ));
        self.spawn_next(&mut events);
        events
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Paused;
        self.fall_accum = 0.0;
        log("paused");
        true
    }

    /// Resuming restarts the full gravity interval.
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = Phase::Running;
        self.fall_accum = 0.0;
        log("resumed");
        true
    }

    pub fn apply_intent(&mut self, intent: Intent) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if intent == Intent::Pause {
            if !self.pause() {
                self.resume();
            }
            return events;
        }
        if self.phase != Phase::Running {
            return events;
        }
        match intent {
            Intent::MoveLeft => self.try_shift(-1, &mut events),
            Intent::MoveRight => self.try_shift(1, &mut events),
            Intent::SoftDrop => self.soft_drop(&mut events),
            Intent::HardDrop => self.hard_drop(&mut events),
            Intent::RotateCw => self.try_rotate(true, &mut events),
            Intent::RotateCcw => self.try_rotate(false, &mut events),
            Intent::Pause => {}
        }
        events
    }

    /// One gravity step. Does nothing outside `Running`.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Running {
            return events;
        }
        if !self.try_fall() {
            self.lock_active(&mut events);
        }
        events
    }

    /// Feeds elapsed wall time into the gravity clock and runs one tick per
    /// whole drop interval.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Running || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return events;
        }
        self.fall_accum += dt_ms.min(MAX_ADVANCE_MS);
        loop {
            let interval = f64::from(self.drop_interval_ms);
            if self.fall_accum < interval || self.phase != Phase::Running {
                break;
            }
            self.fall_accum -= interval;
            events.extend(self.tick());
        }
        events
    }

    /// One host frame: `intents` are applied in arrival order, then gravity
    /// advances by `dt_ms`.
    pub fn run_frame<I>(&mut self, intents: I, dt_ms: f64) -> Vec<GameEvent>
    where
        I: IntoIterator<Item = Intent>,
    {
        let mut events = Vec::new();
        for intent in intents {
            events.extend(self.apply_intent(intent));
        }
        events.extend(self.advance(dt_ms));
        events
    }

    pub fn state(&self) -> SessionState {
        let active = self.active.map(|piece| ActiveView {
            kind: piece.kind,
            rotation: piece.rotation,
            x: piece.x,
            y: piece.y,
            color_id: piece.kind.color_id(),
            cells: to_points(&piece.cells()),
        });
        let ghost = self
            .ghost()
            .map(|g| to_points(&g.cells()))
            .unwrap_or_default();
        SessionState {
            cols: self.board.cols(),
            rows: self.board.rows(),
            board: self.board.cells().to_vec(),
            active,
            ghost,
            next: self.next,
            level: self.level,
            lines: self.lines,
            score: self.score,
            drop_interval_ms: self.drop_interval_ms,
            phase: self.phase,
            paused: self.phase == Phase::Paused,
            game_over: self.phase == Phase::GameOver,
        }
    }

    fn fits(&self, piece: &ActivePiece) -> bool {
        self.board.is_valid_placement(&piece.cells())
    }

    /// Lowest valid position straight below the active piece.
    pub fn ghost(&self) -> Option<ActivePiece> {
        let mut ghost = self.active?;
        loop {
            let below = ghost.shifted(0, -1);
            if !self.fits(&below) {
                return Some(ghost);
            }
            ghost = below;
        }
    }

    fn try_fall(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let below = piece.shifted(0, -1);
        if !self.fits(&below) {
            return false;
        }
        self.active = Some(below);
        true
    }

    fn try_shift(&mut self, dx: i32, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.active else {
            return;
        };
        let moved = piece.shifted(dx, 0);
        if self.fits(&moved) {
            self.active = Some(moved);
        } else {
            events.push(GameEvent::Blocked);
        }
    }

    fn try_rotate(&mut self, cw: bool, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.active else {
            return;
        };
        let from = piece.rotation;
        let to = if cw { from.rotate_cw() } else { from.rotate_ccw() };
        let turned = piece.with_rotation(to);
        for (dx, dy) in rotation_kicks(piece.kind, from, to) {
            let test = turned.shifted(dx, dy);
            if self.fits(&test) {
                self.active = Some(test);
                return;
            }
        }
        events.push(GameEvent::Blocked);
    }

    fn soft_drop(&mut self, events: &mut Vec<GameEvent>) {
        self.fall_accum = 0.0;
        if self.try_fall() {
            self.score = self.score.saturating_add(self.config.soft_drop_points);
        } else {
            self.lock_active(events);
        }
    }

    fn hard_drop(&mut self, events: &mut Vec<GameEvent>) {
        let mut rows = 0u32;
        while self.try_fall() {
            rows += 1;
        }
        self.score = self
            .score
            .saturating_add(rows.saturating_mul(self.config.hard_drop_points));
        self.fall_accum = 0.0;
        self.lock_active(events);
    }

    fn lock_active(&mut self, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.active.take() else {
            return;
        };
        self.board.lock_cells(&piece.cells(), piece.kind.color_id());
        events.push(GameEvent::Locked);

        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            events.push(GameEvent::LineClear {
                count: cleared as u32,
            });
            self.score = self
                .score
                .saturating_add(line_clear_points(cleared, self.level));
            self.lines = self.lines.saturating_add(cleared as u32);
            let level = level_for_lines(self.lines, self.config.lines_per_level);
            if level != self.level {
                self.level = level;
                self.drop_interval_ms = drop_interval_ms(level);
                log(&format!(
                    "level {} ({} ms per row)",
                    level, self.drop_interval_ms
                ));
                events.push(GameEvent::LevelUp { level });
            }
        }
        self.spawn_next(events);
    }

    fn spawn_next(&mut self, events: &mut Vec<GameEvent>) {
        let kind = std::mem::replace(&mut self.next, self.randomizer.next());
        let piece = ActivePiece::spawn(kind, &self.board);
        if self.fits(&piece) {
            self.active = Some(piece);
        } else {
            self.active = None;
            self.phase = Phase::GameOver;
            self.fall_accum = 0.0;
            log(&format!(
                "top out on spawn: score {} lines {} level {}",
                self.score, self.lines, self.level
            ));
            events.push(GameEvent::GameOver);
        }
    }
}

fn to_points(cells: &[(i32, i32); 4]) -> Vec<Point> {
    cells
        .iter()
        .map(|&(x, y)| Point::new(x as i8, y as i8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizer::RandomizerKind;

    fn single(piece: PieceKind) -> Session {
        let config = GameConfig {
            randomizer: RandomizerKind::Single { piece },
            ..GameConfig::default()
        };
        Session::seeded(config, 1).unwrap()
    }

    #[test]
    fn new_session_is_ready_with_no_piece() {
        let session = Session::seeded(GameConfig::default(), 9).unwrap();
        let state = session.state();
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.active.is_none());
        assert!(state.ghost.is_empty());
        assert_eq!(state.filled_count(), 0);
    }

    #[test]
    fn intents_and_ticks_are_ignored_before_start() {
        let mut session = single(PieceKind::T);
        assert!(session.apply_intent(Intent::MoveLeft).is_empty());
        assert!(session.tick().is_empty());
        assert!(!session.pause());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn start_spawns_at_anchor_in_spawn_orientation() {
        let mut session = single(PieceKind::T);
        assert!(session.start().is_empty());
        let piece = session.active().copied().unwrap();
        assert_eq!((piece.x, piece.y), (4, 18));
        assert_eq!(piece.rotation, Rotation::Spawn);
        assert_eq!(session.phase(), Phase::Running);
    }

    #[test]
    fn move_into_wall_is_blocked_without_changing_anchor() {
        let mut session = single(PieceKind::O);
        session.start();
        for _ in 0..4 {
            assert!(session.apply_intent(Intent::MoveLeft).is_empty());
        }
        let piece = session.active().copied().unwrap();
        assert_eq!(piece.x, 0);
        assert_eq!(session.apply_intent(Intent::MoveLeft), vec![GameEvent::Blocked]);
        assert_eq!(session.active().copied(), Some(piece));
        for _ in 0..8 {
            session.apply_intent(Intent::MoveRight);
        }
        assert_eq!(session.active().unwrap().x, 8);
        assert_eq!(session.apply_intent(Intent::MoveRight), vec![GameEvent::Blocked]);
    }

    #[test]
    fn rotation_kicks_off_the_left_wall() {
        let mut session = single(PieceKind::I);
        session.start();
        session.apply_intent(Intent::RotateCcw);
        assert_eq!(session.active().unwrap().rotation, Rotation::Left);
        for _ in 0..4 {
            session.apply_intent(Intent::MoveLeft);
        }
        assert_eq!(session.active().unwrap().x, 0);

        assert!(session.apply_intent(Intent::RotateCw).is_empty());
        let piece = session.active().copied().unwrap();
        assert_eq!(piece.rotation, Rotation::Spawn);
        assert_eq!((piece.x, piece.y), (1, 18));
    }

    #[test]
    fn rotation_with_no_fitting_kick_is_rejected() {
        let mut session = single(PieceKind::I);
        session.start();
        for _ in 0..18 {
            session.apply_intent(Intent::SoftDrop);
        }
        let resting = session.active().copied().unwrap();
        assert_eq!(resting.y, 0);
        assert_eq!(session.apply_intent(Intent::RotateCw), vec![GameEvent::Blocked]);
        assert_eq!(session.apply_intent(Intent::RotateCcw), vec![GameEvent::Blocked]);
        assert_eq!(session.active().copied(), Some(resting));
    }

    #[test]
    fn soft_drop_moves_one_row_and_scores() {
        let mut session = single(PieceKind::T);
        session.start();
        let y = session.active().unwrap().y;
        assert!(session.apply_intent(Intent::SoftDrop).is_empty());
        assert_eq!(session.active().unwrap().y, y - 1);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn soft_drop_on_floor_locks() {
        let mut session = single(PieceKind::O);
        session.start();
        for _ in 0..18 {
            session.apply_intent(Intent::SoftDrop);
        }
        assert_eq!(session.active().unwrap().y, 0);
        assert_eq!(session.apply_intent(Intent::SoftDrop), vec![GameEvent::Locked]);
        assert_eq!(session.board().filled_count(), 4);
    }

    #[test]
    fn pause_freezes_everything_until_resume() {
        let mut session = single(PieceKind::S);
        session.start();
        let before = session.state();
        assert!(session.apply_intent(Intent::Pause).is_empty());
        assert_eq!(session.phase(), Phase::Paused);
        session.apply_intent(Intent::HardDrop);
        session.tick();
        session.advance(10_000.0);
        let paused = session.state();
        assert!(paused.paused);
        assert_eq!(paused.active, before.active);
        assert_eq!(paused.board, before.board);
        assert_eq!(paused.score, before.score);

        session.apply_intent(Intent::Pause);
        assert_eq!(session.phase(), Phase::Running);
    }

    #[test]
    fn resume_restarts_the_full_interval() {
        let mut session = single(PieceKind::O);
        session.start();
        let y = session.active().unwrap().y;
        session.advance(900.0);
        session.pause();
        session.resume();
        session.advance(900.0);
        assert_eq!(session.active().unwrap().y, y);
        session.advance(100.0);
        assert_eq!(session.active().unwrap().y, y - 1);
    }

    #[test]
    fn advance_runs_one_tick_per_interval() {
        let mut session = single(PieceKind::O);
        session.start();
        let y = session.active().unwrap().y;
        session.advance(999.0);
        assert_eq!(session.active().unwrap().y, y);
        session.advance(1.0);
        assert_eq!(session.active().unwrap().y, y - 1);
        session.advance(1000.0);
        assert_eq!(session.active().unwrap().y, y - 2);
        assert!(session.advance(f64::NAN).is_empty());
    }

    #[test]
    fn queued_move_lands_before_the_frame_tick() {
        let mut session = single(PieceKind::O);
        session.start();
        let start = session.active().copied().unwrap();
        let events = session.run_frame([Intent::MoveLeft], 1000.0);
        assert!(events.is_empty());
        let piece = session.active().copied().unwrap();
        assert_eq!((piece.x, piece.y), (start.x - 1, start.y - 1));
    }

    #[test]
    fn queued_hard_drop_locks_before_the_frame_tick() {
        let mut session = single(PieceKind::O);
        session.start();
        let start = session.active().copied().unwrap();
        let events = session.run_frame([Intent::HardDrop], 1000.0);
        assert_eq!(events, vec![GameEvent::Locked]);
        assert_eq!(session.board().filled_count(), 4);
        assert_eq!(session.board().get(start.x, 0), Some(PieceKind::O.color_id()));
        // The tick lands on the freshly spawned piece.
        let next = session.active().copied().unwrap();
        assert_eq!((next.x, next.y), (start.x, start.y - 1));
    }

    #[test]
    fn frame_without_intents_only_advances_gravity() {
        let mut session = single(PieceKind::T);
        session.start();
        let y = session.active().unwrap().y;
        assert!(session.run_frame(std::iter::empty::<Intent>(), 999.0).is_empty());
        assert_eq!(session.active().unwrap().y, y);
        session.run_frame(Vec::<Intent>::new(), 1.0);
        assert_eq!(session.active().unwrap().y, y - 1);
    }

    #[test]
    fn snapshot_cell_is_none_off_the_board() {
        let mut session = single(PieceKind::O);
        session.start();
        session.apply_intent(Intent::HardDrop);
        let state = session.state();
        assert_eq!(state.cell(4, 0), Some(PieceKind::O.color_id()));
        assert_eq!(state.cell(0, 0), Some(0));
        assert_eq!(state.cell(10, 0), None);
        assert_eq!(state.cell(0, 20), None);
    }

    #[test]
    fn ghost_sits_on_the_floor() {
        let mut session = single(PieceKind::T);
        session.start();
        let state = session.state();
        assert_eq!(state.ghost.len(), 4);
        assert_eq!(state.ghost.iter().map(|p| p.y).min(), Some(0));
        let active = state.active.unwrap();
        for (g, a) in state.ghost.iter().zip(&active.cells) {
            assert_eq!(g.x, a.x);
        }
    }

    #[test]
    fn restart_after_game_over_resets_counters() {
        let mut session = single(PieceKind::O);
        session.start();
        let mut over = false;
        for _ in 0..20 {
            if session.apply_intent(Intent::HardDrop).contains(&GameEvent::GameOver) {
                over = true;
                break;
            }
        }
        assert!(over);
        assert!(session.state().game_over);
        assert!(session.active().is_none());
        assert!(session.apply_intent(Intent::MoveLeft).is_empty());

        session.start();
        let state = session.state();
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.filled_count(), 0);
        assert_eq!((state.score, state.lines, state.level), (0, 0, 1));
    }
}
