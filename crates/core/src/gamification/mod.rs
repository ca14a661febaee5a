//! Gamification lookup tables and formulas: XP rewards, the level curve,
//! and study-streak transitions.
//!
//! Everything here is a pure function over its arguments; persistence and
//! orchestration live in the services crate. The scheduler never depends on
//! this module.

pub mod levels;
pub mod streaks;
pub mod xp;

pub use levels::{LevelProgress, LevelUp, check_level_up, level_for_xp, level_progress};
pub use streaks::{StreakMilestone, StreakUpdate, advance_streak, milestone_for, next_milestone};
pub use xp::{DEFAULT_DAILY_GOAL, FAST_RESPONSE_MS, answer_xp, daily_goal_xp, streak_bonus_xp};
