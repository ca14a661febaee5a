use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//
// ─── MILESTONES ────────────────────────────────────────────────────────────────
//

/// A streak length that pays a one-off XP bonus when first reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakMilestone {
    pub streak: u32,
    pub xp: u32,
}

/// Milestone tiers, ascending.
pub const STREAK_MILESTONES: [StreakMilestone; 4] = [
    StreakMilestone { streak: 3, xp: 50 },
    StreakMilestone { streak: 7, xp: 150 },
    StreakMilestone { streak: 30, xp: 1000 },
    StreakMilestone { streak: 100, xp: 5000 },
];

/// The milestone hit exactly at `streak`, if any.
#[must_use]
pub fn milestone_for(streak: u32) -> Option<StreakMilestone> {
    STREAK_MILESTONES.iter().copied().find(|m| m.streak == streak)
}

/// The next milestone ahead of `streak`, with the days remaining to it.
#[must_use]
pub fn next_milestone(streak: u32) -> Option<(StreakMilestone, u32)> {
    STREAK_MILESTONES
        .iter()
        .copied()
        .find(|m| streak < m.streak)
        .map(|m| (m, m.streak - streak))
}

//
// ─── STREAK TRANSITIONS ────────────────────────────────────────────────────────
//

/// True iff the two calendar days are adjacent (in either order).
#[must_use]
pub fn is_consecutive_day(a: NaiveDate, b: NaiveDate) -> bool {
    (b - a).num_days().abs() == 1
}

/// True iff the last study day is `today`.
#[must_use]
pub fn studied_today(last_study_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_study_date == Some(today)
}

/// Result of applying one day of study activity to a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub streak: u32,
    pub broken: bool,
    pub continued: bool,
}

/// Advances a streak for study activity on `today`.
///
/// - First-ever study starts a streak of 1.
/// - Studying again on the same day leaves the streak unchanged.
/// - Studying the day after the last activity extends the streak.
/// - Any longer gap breaks the streak back to 1.
#[must_use]
pub fn advance_streak(
    last_study_date: Option<NaiveDate>,
    current_streak: u32,
    today: NaiveDate,
) -> StreakUpdate {
    let Some(last) = last_study_date else {
        return StreakUpdate {
            streak: 1,
            broken: false,
            continued: false,
        };
    };

    if last == today {
        return StreakUpdate {
            streak: current_streak,
            broken: false,
            continued: false,
        };
    }

    if is_consecutive_day(last, today) {
        return StreakUpdate {
            streak: current_streak + 1,
            broken: false,
            continued: true,
        };
    }

    StreakUpdate {
        streak: 1,
        broken: true,
        continued: false,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
