//! Pure scoring and speed tables.
//!
//! Line clears pay 100 / 300 / 500 / 800 points times the level for one to
//! four rows. Soft and hard drops pay per row descended (see
//! [`GameConfig`](crate::config::GameConfig)). Gravity follows the guideline
//! curve `(0.8 - (level - 1) * 0.007) ^ (level - 1)` seconds per row, rounded
//! and held flat from level 15 on.

const DROP_INTERVALS_MS: [u32; 15] = [
    1000, 793, 618, 473, 355, 262, 190, 135, 94, 64, 43, 28, 18, 11, 7,
];

pub fn line_clear_points(rows: usize, level: u32) -> u32 {
    let base: u32 = match rows {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        _ => 800,
    };
    base.saturating_mul(level)
}

pub fn level_for_lines(lines: u32, lines_per_level: u32) -> u32 {
    1 + lines / lines_per_level.max(1)
}

pub fn drop_interval_ms(level: u32) -> u32 {
    let idx = (level.max(1) - 1) as usize;
    DROP_INTERVALS_MS[idx.min(DROP_INTERVALS_MS.len() - 1)]
}
