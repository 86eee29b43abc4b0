//! Greedy placement policy for headless runs.
//!
//! Every orientation and column is dropped straight down on a copy of the
//! board and scored by lines cleared, holes and stack height. The chosen
//! placement is then played through ordinary intents, so the session applies
//! its own collision and kick rules.

use crate::board::Board;
use crate::piece::{ActivePiece, PieceKind, Rotation};
use crate::session::{GameEvent, Intent, Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub rotation: Rotation,
    pub x: i32,
    pub score: i32,
}

fn score_board(board: &Board, lines: usize) -> i32 {
    let holes = board.hole_count() as i32;
    let height = board.max_height() as i32;
    lines as i32 * 40 - holes * 8 - height * 2
}

pub fn choose_placement(board: &Board, kind: PieceKind) -> Option<Placement> {
    let spawn = ActivePiece::spawn(kind, board);
    let mut best: Option<Placement> = None;
    for rotation in Rotation::all() {
        for x in -2..board.cols() as i32 + 2 {
            let mut piece = ActivePiece {
                rotation,
                x,
                ..spawn
            };
            if !board.is_valid_placement(&piece.cells()) {
                continue;
            }
            while board.is_valid_placement(&piece.shifted(0, -1).cells()) {
                piece = piece.shifted(0, -1);
            }
            let mut simulated = board.clone();
            simulated.lock_cells(&piece.cells(), kind.color_id());
            let lines = simulated.clear_full_rows();
            let score = score_board(&simulated, lines);
            if best.is_none_or(|b| score > b.score) {
                best = Some(Placement { rotation, x, score });
            }
        }
    }
    best
}

/// Rotates and shifts the active piece toward `target`, then hard drops.
pub fn play(session: &mut Session, target: Placement) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..3 {
        let rotation = session.active().map(|p| p.rotation);
        if rotation.is_none_or(|r| r == target.rotation) {
            break;
        }
        events.extend(session.apply_intent(Intent::RotateCw));
    }
    let max_steps = session.board().cols();
    for _ in 0..max_steps {
        let Some(piece) = session.active().copied() else {
            break;
        };
        let intent = match target.x.cmp(&piece.x) {
            std::cmp::Ordering::Less => Intent::MoveLeft,
            std::cmp::Ordering::Greater => Intent::MoveRight,
            std::cmp::Ordering::Equal => break,
        };
        let step = session.apply_intent(intent);
        let blocked = step.contains(&GameEvent::Blocked);
        events.extend(step);
        if blocked {
            break;
        }
    }
    events.extend(session.apply_intent(Intent::HardDrop));
    events
}

/// Chooses and plays one placement for the current piece.
pub fn play_one(session: &mut Session) -> Vec<GameEvent> {
    let Some(kind) = session.active().map(|p| p.kind) else {
        return Vec::new();
    };
    match choose_placement(session.board(), kind) {
        Some(target) => play(session, target),
        None => session.apply_intent(Intent::HardDrop),
    }
}
