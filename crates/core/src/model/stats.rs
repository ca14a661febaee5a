use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

//
// ─── USER STATS ───────────────────────────────────────────────────────────────
//

/// Per-learner gamification counters: XP, level, and streak bookkeeping.
///
/// Updated by the gamification service after each answer/session; the
/// scheduler never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub level: u32,
    pub total_xp: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Calendar day of the most recent study activity.
    pub last_study_date: Option<NaiveDate>,
    pub total_sessions: u32,
}

impl UserStats {
    /// Fresh stats for a learner with no history.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            level: 1,
            total_xp: 0,
            current_streak: 0,
            longest_streak: 0,
            last_study_date: None,
            total_sessions: 0,
        }
    }
}

//
// ─── STUDY SESSION ────────────────────────────────────────────────────────────
//

/// Summary of one completed study session, kept for the activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub user_id: UserId,
    pub session_date: NaiveDate,
    pub completed_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub items_studied: u32,
    pub items_correct: u32,
    pub new_items: u32,
    pub review_items: u32,
    pub xp_earned: u32,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
