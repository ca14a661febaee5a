use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ItemId, UserId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur during review operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid answer quality value: {0}")]
    InvalidQuality(u8),
}

//
// ─── ANSWER QUALITY ───────────────────────────────────────────────────────────
//

/// Four-level answer rating captured from the flashcard interface.
///
/// - `Again`: failed to recall, the item restarts from scratch
/// - `Hard`: recalled with significant difficulty
/// - `Good`: recalled correctly with some effort
/// - `Easy`: recalled instantly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerQuality {
    /// Failed to recall the answer. Repetitions reset and the item is shown again soon.
    Again,
    /// Recalled with significant difficulty. Interval shrinks.
    Hard,
    /// Recalled correctly with appropriate effort. Standard interval growth.
    Good,
    /// Recalled instantly. Interval grows fastest.
    Easy,
}

impl AnswerQuality {
    /// Converts a numeric quality (0-3) to an `AnswerQuality`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidQuality` if the value is not in the range 0-3.
    pub fn from_u8(value: u8) -> Result<Self, ReviewError> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Good),
            3 => Ok(Self::Easy),
            _ => Err(ReviewError::InvalidQuality(value)),
        }
    }

    /// Numeric encoding used by the flashcard interface and storage (0-3).
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            AnswerQuality::Again => 0,
            AnswerQuality::Hard => 1,
            AnswerQuality::Good => 2,
            AnswerQuality::Easy => 3,
        }
    }

    /// Maps this quality to the SM-2 0-5 quality scale.
    ///
    /// Only Good/Easy reach the ease-factor formula in practice; Again and
    /// Hard take dedicated branches in the scheduler.
    #[must_use]
    pub fn sm2_score(self) -> u8 {
        match self {
            AnswerQuality::Again => 0,
            AnswerQuality::Hard => 3,
            AnswerQuality::Good => 4,
            AnswerQuality::Easy => 5,
        }
    }

    /// Whether this quality counts as a correct recall.
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerQuality::Good | AnswerQuality::Easy)
    }
}

//
// ─── REVIEW LOG ───────────────────────────────────────────────────────────────
//

/// Record of a single answer event.
///
/// Stores which item a learner answered, when, and with what quality.
/// Used for study history and analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub quality: AnswerQuality,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
    #[must_use]
    pub fn new(
        user_id: UserId,
        item_id: ItemId,
        quality: AnswerQuality,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            item_id,
            quality,
            reviewed_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
