use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ItemId, UserId};
use crate::model::item::ItemCategory;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while handling progress records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("invalid progress status: {0}")]
    InvalidStatus(String),
}

//
// ─── PROGRESS STATUS ──────────────────────────────────────────────────────────
//

/// Coarse life-cycle classification of a (user, item) pair.
///
/// Derived from repetition count and interval length; used for dashboard
/// counts and queue filtering only, never by the scheduling math itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Never answered successfully.
    New,
    /// Fewer than three consecutive successful answers.
    Learning,
    /// In steady review rotation.
    Reviewing,
    /// Interval has reached three weeks or more.
    Mastered,
}

impl ProgressStatus {
    /// Derives the status from the current schedule.
    ///
    /// `new` iff repetitions = 0; `learning` iff 0 < repetitions < 3;
    /// `mastered` iff interval >= 21 days; otherwise `reviewing`.
    #[must_use]
    pub fn from_schedule(repetitions: u32, interval_days: u32) -> Self {
        if repetitions == 0 {
            return ProgressStatus::New;
        }
        if repetitions < 3 {
            return ProgressStatus::Learning;
        }
        if interval_days >= 21 {
            return ProgressStatus::Mastered;
        }
        ProgressStatus::Reviewing
    }

    /// Storage representation of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::New => "new",
            ProgressStatus::Learning => "learning",
            ProgressStatus::Reviewing => "reviewing",
            ProgressStatus::Mastered => "mastered",
        }
    }

    /// Parses the storage representation back into a status.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidStatus` for unknown values.
    pub fn parse(s: &str) -> Result<Self, ProgressError> {
        match s {
            "new" => Ok(ProgressStatus::New),
            "learning" => Ok(ProgressStatus::Learning),
            "reviewing" => Ok(ProgressStatus::Reviewing),
            "mastered" => Ok(ProgressStatus::Mastered),
            other => Err(ProgressError::InvalidStatus(other.to_string())),
        }
    }
}

//
// ─── SCHEDULING STATE ─────────────────────────────────────────────────────────
//

/// The scheduler's view of one (user, item) pair.
///
/// # Fields
///
/// * `ease_factor` - difficulty multiplier in [1.3, 2.5]; higher = easier
/// * `interval_days` - days until the next exposure
/// * `repetitions` - consecutive non-failing answers since the last lapse
/// * `category` - content category, modifies interval scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub category: ItemCategory,
}

impl SchedulingState {
    /// Canonical state for an item that has never been answered:
    /// ease factor 2.5, interval 0, repetitions 0.
    #[must_use]
    pub fn initial(category: ItemCategory) -> Self {
        Self {
            ease_factor: 2.5,
            interval_days: 0,
            repetitions: 0,
            category,
        }
    }
}

//
// ─── PROGRESS RECORD ──────────────────────────────────────────────────────────
//

/// Persisted per-(user, item) study record: the scheduling state plus
/// bookkeeping counters maintained by the study workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub state: SchedulingState,
    pub status: ProgressStatus,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub total_reviews: u32,
    pub correct_reviews: u32,
}

impl Progress {
    /// Fresh record for the first-ever answer on an item.
    #[must_use]
    pub fn new(user_id: UserId, item_id: ItemId, category: ItemCategory, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            item_id,
            state: SchedulingState::initial(category),
            status: ProgressStatus::New,
            next_review_at: now,
            last_reviewed_at: None,
            total_reviews: 0,
            correct_reviews: 0,
        }
    }

    /// Lifetime recall accuracy for this item, 0.0 when never reviewed.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        crate::scheduler::accuracy(self.correct_reviews, self.total_reviews)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_repetitions_then_interval() {
        assert_eq!(ProgressStatus::from_schedule(0, 0), ProgressStatus::New);
        assert_eq!(ProgressStatus::from_schedule(0, 30), ProgressStatus::New);
        assert_eq!(ProgressStatus::from_schedule(1, 1), ProgressStatus::Learning);
        assert_eq!(ProgressStatus::from_schedule(2, 25), ProgressStatus::Learning);
        assert_eq!(ProgressStatus::from_schedule(3, 15), ProgressStatus::Reviewing);
        assert_eq!(ProgressStatus::from_schedule(3, 21), ProgressStatus::Mastered);
        assert_eq!(ProgressStatus::from_schedule(8, 120), ProgressStatus::Mastered);
    }

    #[test]
    fn status_as_str_round_trips() {
        for status in [
            ProgressStatus::New,
            ProgressStatus::Learning,
            ProgressStatus::Reviewing,
            ProgressStatus::Mastered,
        ] {
            assert_eq!(ProgressStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ProgressStatus::parse("graduated").is_err());
    }

    #[test]
    fn initial_state_matches_contract() {
        let state = SchedulingState::initial(ItemCategory::Kanji);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.category, ItemCategory::Kanji);
    }

    #[test]
    fn fresh_progress_is_new_and_due_immediately() {
        let now = Utc::now();
        let progress = Progress::new(
            UserId::random(),
            ItemId::random(),
            ItemCategory::Vocabulary,
            now,
        );
        assert_eq!(progress.status, ProgressStatus::New);
        assert_eq!(progress.next_review_at, now);
        assert_eq!(progress.last_reviewed_at, None);
        assert_eq!(progress.accuracy(), 0.0);
    }
}
