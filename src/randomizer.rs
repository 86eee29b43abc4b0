use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::piece::PieceKind;

/// Piece generation policy. The default is the 7-bag.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default, Tsify)]
pub enum RandomizerKind {
    Uniform,
    #[default]
    SevenBag,
    Single { piece: PieceKind },
}

pub trait Randomizer {
    fn next(&mut self) -> PieceKind;

    /// Forget any partially dealt state (used on restart).
    fn reset(&mut self) {}
}

struct Uniform<R> {
    rng: R,
}

impl<R: RngCore> Randomizer for Uniform<R> {
    fn next(&mut self) -> PieceKind {
        let all = PieceKind::all();
        all[self.rng.gen_range(0..all.len())]
    }
}

struct SinglePiece {
    piece: PieceKind,
}

impl Randomizer for SinglePiece {
    fn next(&mut self) -> PieceKind {
        self.piece
    }
}

struct SevenBag<R> {
    rng: R,
    bag: Vec<PieceKind>,
}

impl<R: RngCore> SevenBag<R> {
    fn new(rng: R) -> Self {
        Self {
            rng,
            bag: Vec::with_capacity(7),
        }
    }

    fn refill(&mut self) {
        self.bag = PieceKind::all().to_vec();
        self.bag.shuffle(&mut self.rng);
    }
}

impl<R: RngCore> Randomizer for SevenBag<R> {
    fn next(&mut self) -> PieceKind {
        loop {
            if let Some(piece) = self.bag.pop() {
                return piece;
            }
            self.refill();
        }
    }

    fn reset(&mut self) {
        self.bag.clear();
    }
}

pub fn randomizer_from_kind<R>(kind: RandomizerKind, rng: R) -> Box<dyn Randomizer>
where
    R: RngCore + 'static,
{
    match kind {
        RandomizerKind::Uniform => Box::new(Uniform { rng }),
        RandomizerKind::SevenBag => Box::new(SevenBag::new(rng)),
        RandomizerKind::Single { piece } => Box::new(SinglePiece { piece }),
    }
}
