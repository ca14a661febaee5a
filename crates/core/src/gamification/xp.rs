use crate::model::AnswerQuality;

//
// ─── REWARD TABLE ──────────────────────────────────────────────────────────────
//

/// XP for the first successful exposure to a new item.
pub const XP_NEW_ITEM: u32 = 10;
/// XP for a correct review answer.
pub const XP_REVIEW_CORRECT: u32 = 5;
/// XP for a fast, correct review answer.
pub const XP_REVIEW_FAST: u32 = 8;
/// Bonus XP for hitting the daily study goal.
pub const XP_DAILY_GOAL_BONUS: u32 = 50;

/// Answers faster than this count as "fast" for the review reward.
pub const FAST_RESPONSE_MS: u32 = 3000;
/// Items per day that unlock the daily-goal bonus.
pub const DEFAULT_DAILY_GOAL: u32 = 20;

//
// ─── REWARD FUNCTIONS ──────────────────────────────────────────────────────────
//

/// XP earned for a single answer.
///
/// Incorrect answers (Again/Hard) earn nothing. New items pay a flat reward;
/// review items pay more when answered within [`FAST_RESPONSE_MS`].
#[must_use]
pub fn answer_xp(quality: AnswerQuality, is_new_item: bool, response_ms: u32) -> u32 {
    if !quality.is_correct() {
        return 0;
    }
    if is_new_item {
        return XP_NEW_ITEM;
    }
    if response_ms < FAST_RESPONSE_MS {
        return XP_REVIEW_FAST;
    }
    XP_REVIEW_CORRECT
}

/// Daily-goal bonus: paid once the studied count reaches the goal.
#[must_use]
pub fn daily_goal_xp(items_studied: u32, daily_goal: u32) -> u32 {
    if items_studied >= daily_goal {
        XP_DAILY_GOAL_BONUS
    } else {
        0
    }
}

/// One-off bonus for the highest streak tier reached.
#[must_use]
pub fn streak_bonus_xp(streak: u32) -> u32 {
    match streak {
        s if s >= 100 => 5000,
        s if s >= 30 => 1000,
        s if s >= 7 => 150,
        s if s >= 3 => 50,
        _ => 0,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorrect_answers_earn_nothing() {
        assert_eq!(answer_xp(AnswerQuality::Again, true, 100), 0);
        assert_eq!(answer_xp(AnswerQuality::Hard, false, 100), 0);
    }

    #[test]
    fn new_items_pay_flat_reward() {
        assert_eq!(answer_xp(AnswerQuality::Good, true, 10_000), XP_NEW_ITEM);
        assert_eq!(answer_xp(AnswerQuality::Easy, true, 100), XP_NEW_ITEM);
    }

    #[test]
    fn fast_reviews_pay_more() {
        assert_eq!(answer_xp(AnswerQuality::Good, false, 2999), XP_REVIEW_FAST);
        assert_eq!(answer_xp(AnswerQuality::Good, false, 3000), XP_REVIEW_CORRECT);
    }

    #[test]
    fn daily_goal_pays_at_threshold() {
        assert_eq!(daily_goal_xp(19, DEFAULT_DAILY_GOAL), 0);
        assert_eq!(daily_goal_xp(20, DEFAULT_DAILY_GOAL), XP_DAILY_GOAL_BONUS);
        assert_eq!(daily_goal_xp(35, DEFAULT_DAILY_GOAL), XP_DAILY_GOAL_BONUS);
    }

    #[test]
    fn streak_bonus_uses_highest_tier() {
        assert_eq!(streak_bonus_xp(2), 0);
        assert_eq!(streak_bonus_xp(3), 50);
        assert_eq!(streak_bonus_xp(7), 150);
        assert_eq!(streak_bonus_xp(45), 1000);
        assert_eq!(streak_bonus_xp(100), 5000);
    }
}
