use crate::error::EngineError;

pub const MIN_DIMENSION: usize = 4;
pub const MAX_DIMENSION: usize = 64;

/// Locked cells, row 0 at the bottom. `0` is empty, anything else is the
/// color id of the piece that locked there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
}

/// Both dimensions must lie in `MIN_DIMENSION..=MAX_DIMENSION`.
pub fn check_dimensions(cols: usize, rows: usize) -> Result<(), EngineError> {
    let in_range = |n: usize| (MIN_DIMENSION..=MAX_DIMENSION).contains(&n);
    if !in_range(cols) || !in_range(rows) {
        return Err(EngineError::InvalidBoardSize {
            cols,
            rows,
            min: MIN_DIMENSION,
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Result<Self, EngineError> {
        check_dimensions(cols, rows)?;
        Ok(Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row-major cells, bottom row first.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some(self.cells[y as usize * self.cols + x as usize])
    }

    /// Walls, floor and ceiling count as occupied.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_none_or(|c| c != 0)
    }

    pub fn is_valid_placement(&self, cells: &[(i32, i32)]) -> bool {
        cells.iter().all(|&(x, y)| !self.is_occupied(x, y))
    }

    pub fn spawn_anchor(&self) -> (i32, i32) {
        ((self.cols as i32 - 1) / 2, self.rows as i32 - 2)
    }

    /// Writes `color` into each cell. Callers validate the placement first;
    /// cells outside the board are skipped.
    pub fn lock_cells(&mut self, cells: &[(i32, i32)], color: u8) {
        for &(x, y) in cells {
            debug_assert!(
                self.get(x, y).is_none_or(|c| c == 0),
                "locking onto filled cell ({x}, {y})"
            );
            if self.get(x, y).is_some() {
                self.cells[y as usize * self.cols + x as usize] = color;
            }
        }
    }

    pub fn row_is_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|&c| c != 0)
    }

    fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.cols..(y + 1) * self.cols]
    }

    /// Removes every full row, scanning bottom to top, and returns how many
    /// were removed. Rows above each removed row drop by one; the top fills
    /// with empty rows.
    pub fn clear_full_rows(&mut self) -> usize {
        let cols = self.cols;
        let mut cleared = 0;
        let mut y = 0;
        while y < self.rows {
            if self.row_is_full(y) {
                cleared += 1;
                self.cells.copy_within((y + 1) * cols.., y * cols);
                let top = (self.rows - 1) * cols;
                self.cells[top..].fill(0);
                // recheck the same row after the pull-down
            } else {
                y += 1;
            }
        }
        cleared
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn hole_count(&self) -> usize {
        let mut holes = 0;
        for x in 0..self.cols {
            let mut found = false;
            for y in (0..self.rows).rev() {
                if self.cells[y * self.cols + x] != 0 {
                    found = true;
                } else if found {
                    holes += 1;
                }
            }
        }
        holes
    }

    pub fn max_height(&self) -> usize {
        (0..self.rows)
            .rev()
            .find(|&y| self.row(y).iter().any(|&c| c != 0))
            .map_or(0, |y| y + 1)
    }
}
