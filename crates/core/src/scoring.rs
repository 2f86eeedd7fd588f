//! Scoring module - levels, gravity cadence and lock rewards

use crate::types::MAX_LEVEL;

/// Level reached after clearing `lines` rows.
///
/// One level per ten lines, starting at 1 and capped at [`MAX_LEVEL`]:
/// lines 1..=10 are level 1, 11..=20 level 2, ..., 91 and beyond level 10.
pub fn level_for_lines(lines: u32) -> u32 {
    match lines {
        0 => 1,
        1..=90 => 1 + (lines - 1) / 10,
        _ => MAX_LEVEL,
    }
}

/// Countdown (in ticks) loaded after each gravity step.
///
/// A piece falls one row every `gravity_delay(level) + 1` ticks.
pub fn gravity_delay(level: u32) -> u32 {
    MAX_LEVEL.saturating_sub(level.min(MAX_LEVEL))
}

/// Points for locking a piece that spent `fall_ticks` gravity steps falling
pub fn lock_score(level: u32, fall_ticks: u32) -> u32 {
    (21 + 3 * level).saturating_sub(fall_ticks)
}
