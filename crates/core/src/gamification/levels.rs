use serde::{Deserialize, Serialize};

//
// ─── LEVEL CURVE ───────────────────────────────────────────────────────────────
//

/// XP required to advance from `level - 1` to `level`.
///
/// The curve is `floor(100 * 1.5^(level - 1))`; level 1 is free.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    (100.0 * 1.5_f64.powi(level as i32 - 1)).floor() as u64
}

/// Cumulative XP required to reach `level` from scratch.
#[must_use]
pub fn total_xp_for_level(level: u32) -> u64 {
    (2..=level).map(xp_for_level).sum()
}

/// Level reached with `total_xp`.
#[must_use]
pub fn level_for_xp(total_xp: u64) -> u32 {
    let mut level = 1;
    let mut accumulated = 0;

    loop {
        let next = xp_for_level(level + 1);
        if accumulated + next > total_xp {
            return level;
        }
        accumulated += next;
        level += 1;
    }
}

//
// ─── PROGRESS & LEVEL-UP ───────────────────────────────────────────────────────
//

/// Position within the current level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
    /// Clamped to [0, 100].
    pub percent: f64,
}

/// Computes the learner's position within their current level.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn level_progress(total_xp: u64) -> LevelProgress {
    let level = level_for_xp(total_xp);
    let xp_into_level = total_xp - total_xp_for_level(level);
    let xp_for_next_level = xp_for_level(level + 1);
    let percent =
        ((xp_into_level as f64 / xp_for_next_level as f64) * 100.0).clamp(0.0, 100.0);

    LevelProgress {
        level,
        xp_into_level,
        xp_for_next_level,
        percent,
    }
}

/// Outcome of comparing XP before and after an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    pub levels_gained: u32,
}

/// Detects whether an XP award crossed one or more level boundaries.
#[must_use]
pub fn check_level_up(previous_xp: u64, new_xp: u64) -> LevelUp {
    let previous_level = level_for_xp(previous_xp);
    let new_level = level_for_xp(new_xp);

    LevelUp {
        leveled_up: new_level > previous_level,
        previous_level,
        new_level,
        levels_gained: new_level.saturating_sub(previous_level),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
