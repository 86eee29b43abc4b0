use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::board::check_dimensions;
use crate::error::EngineError;
use crate::randomizer::RandomizerKind;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
    pub randomizer: RandomizerKind,
    /// Points per row for a player-initiated soft drop.
    pub soft_drop_points: u32,
    /// Points per row descended by a hard drop.
    pub hard_drop_points: u32,
    pub lines_per_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: 10,
            rows: 20,
            randomizer: RandomizerKind::SevenBag,
            soft_drop_points: 1,
            hard_drop_points: 2,
            lines_per_level: 10,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        check_dimensions(self.cols, self.rows)?;
        if self.lines_per_level == 0 {
            return Err(EngineError::InvalidLinesPerLevel);
        }
        Ok(())
    }
}
