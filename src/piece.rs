use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::board::Board;
use crate::error::EngineError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Tsify)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    Z,
    T,
}

impl PieceKind {
    pub fn all() -> [PieceKind; 7] {
        [
            PieceKind::I,
            PieceKind::J,
            PieceKind::L,
            PieceKind::O,
            PieceKind::S,
            PieceKind::Z,
            PieceKind::T,
        ]
    }

    /// Board cell value written when this piece locks. Zero means empty.
    pub fn color_id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::Z => 6,
            PieceKind::T => 7,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PieceKind::I => "#00f0f0",
            PieceKind::J => "#0000f0",
            PieceKind::L => "#f0a000",
            PieceKind::O => "#f0f000",
            PieceKind::S => "#00f000",
            PieceKind::Z => "#f00000",
            PieceKind::T => "#a000f0",
        }
    }

    pub fn from_color_id(id: u8) -> Option<PieceKind> {
        PieceKind::all().into_iter().find(|p| p.color_id() == id)
    }
}

impl TryFrom<u8> for PieceKind {
    type Error = EngineError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        PieceKind::all()
            .get(index as usize)
            .copied()
            .ok_or(EngineError::InvalidPiece(index))
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Tsify)]
pub enum Rotation {
    Spawn = 0,
    Right = 1,
    Reverse = 2,
    Left = 3,
}

impl Rotation {
    pub fn all() -> [Rotation; 4] {
        [
            Rotation::Spawn,
            Rotation::Right,
            Rotation::Reverse,
            Rotation::Left,
        ]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn rotate_cw(self) -> Rotation {
        match self {
            Rotation::Spawn => Rotation::Right,
            Rotation::Right => Rotation::Reverse,
            Rotation::Reverse => Rotation::Left,
            Rotation::Left => Rotation::Spawn,
        }
    }

    pub fn rotate_ccw(self) -> Rotation {
        match self {
            Rotation::Spawn => Rotation::Left,
            Rotation::Left => Rotation::Reverse,
            Rotation::Reverse => Rotation::Right,
            Rotation::Right => Rotation::Spawn,
        }
    }
}

impl TryFrom<u8> for Rotation {
    type Error = EngineError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Rotation::all()
            .get(index as usize)
            .copied()
            .ok_or(EngineError::InvalidRotation(index))
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Tsify)]
pub struct Point {
    pub x: i8,
    pub y: i8,
}

impl Point {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

fn rotate_point(p: Point, rot: Rotation) -> Point {
    match rot {
        Rotation::Spawn => p,
        Rotation::Right => Point { x: p.y, y: -p.x },
        Rotation::Reverse => Point { x: -p.x, y: -p.y },
        Rotation::Left => Point { x: -p.y, y: p.x },
    }
}

/// Cell offsets from the anchor, y pointing up.
pub fn shape_blocks(piece: PieceKind, rotation: Rotation) -> [Point; 4] {
    // I rotates about a grid intersection, JLSTZ about a mino center, O not at all.
    match piece {
        PieceKind::I => match rotation {
            Rotation::Spawn => [
                Point::new(-1, 0),
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(2, 0),
            ],
            Rotation::Right => [
                Point::new(1, 1),
                Point::new(1, 0),
                Point::new(1, -1),
                Point::new(1, -2),
            ],
            Rotation::Reverse => [
                Point::new(-1, -1),
                Point::new(0, -1),
                Point::new(1, -1),
                Point::new(2, -1),
            ],
            Rotation::Left => [
                Point::new(0, 1),
                Point::new(0, 0),
                Point::new(0, -1),
                Point::new(0, -2),
            ],
        },
        PieceKind::O => [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(0, 1),
            Point::new(1, 1),
        ],
        PieceKind::T | PieceKind::J | PieceKind::L | PieceKind::S | PieceKind::Z => {
            let base = match piece {
                PieceKind::T => [
                    Point::new(-1, 0),
                    Point::new(0, 0),
                    Point::new(1, 0),
                    Point::new(0, 1),
                ],
                PieceKind::J => [
                    Point::new(-1, 0),
                    Point::new(0, 0),
                    Point::new(1, 0),
                    Point::new(-1, 1),
                ],
                PieceKind::L => [
                    Point::new(-1, 0),
                    Point::new(0, 0),
                    Point::new(1, 0),
                    Point::new(1, 1),
                ],
                PieceKind::S => [
                    Point::new(-1, 0),
                    Point::new(0, 0),
                    Point::new(0, 1),
                    Point::new(1, 1),
                ],
                _ => [
                    Point::new(-1, 1),
                    Point::new(0, 1),
                    Point::new(0, 0),
                    Point::new(1, 0),
                ],
            };
            base.map(|p| rotate_point(p, rotation))
        }
    }
}

/// The mino each orientation treats as its reference. Only the I piece moves
/// its reference between orientations.
fn reference_mino(piece: PieceKind, rotation: Rotation) -> Point {
    match piece {
        PieceKind::I => match rotation {
            Rotation::Spawn => Point::new(0, 0),
            Rotation::Right => Point::new(1, 1),
            Rotation::Reverse => Point::new(1, -1),
            Rotation::Left => Point::new(0, -1),
        },
        _ => Point::new(0, 0),
    }
}

/// Anchor offsets tried in order when rotating `from -> to`: in place, one
/// column left, one column right, then the shift that keeps the previous
/// orientation's reference mino where it was.
pub fn rotation_kicks(piece: PieceKind, from: Rotation, to: Rotation) -> [(i32, i32); 4] {
    let prev = reference_mino(piece, from);
    let next = reference_mino(piece, to);
    [
        (0, 0),
        (-1, 0),
        (1, 0),
        ((prev.x - next.x) as i32, (prev.y - next.y) as i32),
    ]
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Places `kind` at the board's spawn anchor in its spawn orientation.
    pub fn spawn(kind: PieceKind, board: &Board) -> Self {
        let (x, y) = board.spawn_anchor();
        Self {
            kind,
            rotation: Rotation::Spawn,
            x,
            y,
        }
    }

    pub fn blocks(&self) -> [Point; 4] {
        shape_blocks(self.kind, self.rotation)
    }

    /// Absolute board cells as (column, row).
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.blocks()
            .map(|b| (self.x + b.x as i32, self.y + b.y as i32))
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        Self { rotation, ..*self }
    }
}
