use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerQuality, ItemCategory, ProgressStatus, SchedulingState};

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// Ease factor assigned to items that have never been answered.
pub const STARTING_EASE_FACTOR: f64 = 2.5;
/// Floor for the ease factor; repeated failures cannot push an item below it.
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Ceiling for the ease factor.
pub const MAX_EASE_FACTOR: f64 = 2.5;
/// Shortest allowed review interval.
pub const MIN_INTERVAL_DAYS: u32 = 1;
/// Longest allowed review interval.
pub const MAX_INTERVAL_DAYS: u32 = 365;
/// Interval after the first successful answer (Good).
pub const GRADUATING_INTERVAL_DAYS: u32 = 1;
/// Interval after the first successful answer when the learner rated it Easy.
pub const EASY_INTERVAL_DAYS: u32 = 4;
/// Multiplier applied to the previous interval on a Hard answer.
pub const LAPSE_MULTIPLIER: f64 = 0.5;

/// Per-category interval divisor. Dividing by a value below 1.0 shortens
/// nothing; the raw interval is divided by this, so kanji and grammar items
/// recur more frequently than kana and vocabulary.
#[must_use]
pub fn interval_modifier(category: ItemCategory) -> f64 {
    match category {
        ItemCategory::Kana | ItemCategory::Vocabulary => 1.0,
        ItemCategory::Kanji => 0.7,
        ItemCategory::Grammar => 0.85,
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Caller contract violations. Steady-state numeric edges (ease factor at the
/// floor, interval at the ceiling, repetitions at zero) are clamped, never
/// reported as errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("ease factor must be finite and non-negative, got {provided}")]
    InvalidEaseFactor { provided: f64 },
}

//
// ─── REVIEW PLAN ───────────────────────────────────────────────────────────────
//

/// Output of one scheduling computation: the next scheduling state for the
/// item plus the derived life-cycle status and absolute due date.
///
/// # Examples
///
/// ```
/// use kioku_core::model::{AnswerQuality, ItemCategory, SchedulingState};
/// use kioku_core::scheduler::compute_next_review;
///
/// let state = SchedulingState::initial(ItemCategory::Vocabulary);
/// let plan = compute_next_review(AnswerQuality::Good, &state, chrono::Utc::now())?;
/// assert_eq!(plan.interval_days, 1);
/// assert_eq!(plan.repetitions, 1);
/// # Ok::<(), kioku_core::scheduler::SchedulerError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPlan {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
    pub status: ProgressStatus,
}

impl ReviewPlan {
    /// The scheduling state a caller should persist after this answer.
    #[must_use]
    pub fn next_state(&self, category: ItemCategory) -> SchedulingState {
        SchedulingState {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
            category,
        }
    }
}

//
// ─── CORE TRANSITION ───────────────────────────────────────────────────────────
//

/// Computes the next review schedule for one answer, SM-2 style.
///
/// Pure except for the caller-supplied `now`, which anchors the absolute due
/// date. The quality branches, in priority order:
///
/// 1. `Again`: ease factor -0.2 (floored), interval resets to the minimum,
///    repetitions reset to 0, status `learning`.
/// 2. `Hard`: ease factor -0.15 (floored), interval halves (rounded, floored
///    at the minimum), repetitions decrement but never below 0, status
///    `learning`.
/// 3. `Good`/`Easy`: ease factor via the SM-2 formula (clamped), repetitions
///    increment, interval from the repetition ladder (1 or 4, then 6, then
///    interval x ease factor), then the category divisor, then the final
///    clamp to [1, 365].
///
/// All roundings are round-half-away-from-zero; the category divisor is
/// applied to the already-rounded repetition-ladder interval and re-rounded,
/// matching the reference day counts exactly.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidEaseFactor` if the supplied state carries
/// a non-finite or negative ease factor. That is a caller bug, not a data
/// condition, so it fails loudly instead of clamping.
pub fn compute_next_review(
    quality: AnswerQuality,
    state: &SchedulingState,
    now: DateTime<Utc>,
) -> Result<ReviewPlan, SchedulerError> {
    if !state.ease_factor.is_finite() || state.ease_factor < 0.0 {
        return Err(SchedulerError::InvalidEaseFactor {
            provided: state.ease_factor,
        });
    }

    let plan = match quality {
        AnswerQuality::Again => {
            // Total failure: restart from scratch. A lapsed item is back in
            // the learning stage regardless of the repetition-derived rule.
            ReviewPlan {
                ease_factor: (state.ease_factor - 0.2).max(MIN_EASE_FACTOR),
                interval_days: MIN_INTERVAL_DAYS,
                repetitions: 0,
                next_review_at: now + Duration::days(i64::from(MIN_INTERVAL_DAYS)),
                status: ProgressStatus::Learning,
            }
        }
        AnswerQuality::Hard => {
            let interval_days =
                round_days(f64::from(state.interval_days) * LAPSE_MULTIPLIER).max(MIN_INTERVAL_DAYS);
            ReviewPlan {
                ease_factor: (state.ease_factor - 0.15).max(MIN_EASE_FACTOR),
                interval_days,
                // Partial credit: one step back, not a full reset.
                repetitions: state.repetitions.saturating_sub(1),
                next_review_at: now + Duration::days(i64::from(interval_days)),
                status: ProgressStatus::Learning,
            }
        }
        AnswerQuality::Good | AnswerQuality::Easy => {
            let q = f64::from(quality.sm2_score());
            let ease_factor = (state.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)))
                .clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);

            let repetitions = state.repetitions + 1;
            let raw_interval = match repetitions {
                1 => {
                    if quality == AnswerQuality::Easy {
                        EASY_INTERVAL_DAYS
                    } else {
                        GRADUATING_INTERVAL_DAYS
                    }
                }
                2 => 6,
                _ => round_days(f64::from(state.interval_days) * ease_factor),
            };

            let adjusted = round_days(f64::from(raw_interval) / interval_modifier(state.category));
            let interval_days = adjusted.clamp(MIN_INTERVAL_DAYS, MAX_INTERVAL_DAYS);

            ReviewPlan {
                ease_factor,
                interval_days,
                repetitions,
                next_review_at: now + Duration::days(i64::from(interval_days)),
                status: ProgressStatus::from_schedule(repetitions, interval_days),
            }
        }
    };

    Ok(plan)
}

/// Round-half-away-from-zero day count; inputs are non-negative here, so this
/// is round-half-up (19.5 -> 20).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_days(days: f64) -> u32 {
    days.round().max(0.0) as u32
}

//
// ─── QUEUE HELPERS ─────────────────────────────────────────────────────────────
//

/// True iff the item is due at `now`, compared at calendar-day granularity.
#[must_use]
pub fn is_due(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.date_naive() >= next_review_at.date_naive()
}

/// Whole days from `now` until the due date; negative once overdue.
///
/// Consistent with `is_due`: an item is due exactly when this is <= 0.
#[must_use]
pub fn days_until_due(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    next_review_at
        .date_naive()
        .signed_duration_since(now.date_naive())
        .num_days()
}

/// Fraction of correct answers; defined as 0.0 when there are no reviews.
#[must_use]
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(total)
}

/// Ascending sort key for the review queue: more-overdue and lower-ease
/// items sort first. Never gates correctness, only ordering.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn review_priority(next_review_at: DateTime<Utc>, ease_factor: f64, now: DateTime<Utc>) -> f64 {
    let overdue_days = (-days_until_due(next_review_at, now)).max(0) as f64;
    -(overdue_days * 10.0 + (3.0 - ease_factor) * 5.0)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn state(
        ease_factor: f64,
        interval_days: u32,
        repetitions: u32,
        category: ItemCategory,
    ) -> SchedulingState {
        SchedulingState {
            ease_factor,
            interval_days,
            repetitions,
            category,
        }
    }

    fn apply(quality: AnswerQuality, s: &SchedulingState) -> ReviewPlan {
        compute_next_review(quality, s, fixed_now()).unwrap()
    }

    #[test]
    fn three_good_answers_walk_the_ladder() {
        let mut s = SchedulingState::initial(ItemCategory::Vocabulary);
        let mut intervals = Vec::new();

        for _ in 0..3 {
            let plan = apply(AnswerQuality::Good, &s);
            intervals.push(plan.interval_days);
            assert_eq!(plan.ease_factor, 2.5);
            s = plan.next_state(s.category);
        }

        assert_eq!(intervals, vec![1, 6, 15]);
        assert_eq!(s.repetitions, 3);
    }

    #[test]
    fn easy_after_three_good_saturates_ease_factor() {
        let mut s = SchedulingState::initial(ItemCategory::Kana);
        for _ in 0..3 {
            s = apply(AnswerQuality::Good, &s).next_state(s.category);
        }

        let plan = apply(AnswerQuality::Easy, &s);
        // The SM-2 formula would push the ease factor to 2.6; it saturates at
        // the 2.5 ceiling before the interval step, so 15 * 2.5 = 37.5 -> 38.
        assert_eq!(plan.ease_factor, 2.5);
        assert_eq!(plan.interval_days, 38);
        assert_eq!(plan.repetitions, 4);
        assert_eq!(plan.status, ProgressStatus::Mastered);
    }

    #[test]
    fn again_resets_schedule_and_marks_learning() {
        let s = state(2.5, 15, 3, ItemCategory::Vocabulary);
        let plan = apply(AnswerQuality::Again, &s);

        assert_eq!(plan.ease_factor, 2.3);
        assert_eq!(plan.interval_days, MIN_INTERVAL_DAYS);
        assert_eq!(plan.repetitions, 0);
        assert_eq!(plan.status, ProgressStatus::Learning);
        assert_eq!(plan.next_review_at, fixed_now() + Duration::days(1));
    }

    #[test]
    fn hard_halves_interval_and_steps_back() {
        let s = state(2.5, 10, 2, ItemCategory::Vocabulary);
        let plan = apply(AnswerQuality::Hard, &s);

        assert_eq!(plan.ease_factor, 2.35);
        assert_eq!(plan.interval_days, 5);
        assert_eq!(plan.repetitions, 1);
        assert_eq!(plan.status, ProgressStatus::Learning);
    }

    #[test]
    fn hard_never_drops_repetitions_below_zero() {
        let s = state(2.5, 0, 0, ItemCategory::Grammar);
        let plan = apply(AnswerQuality::Hard, &s);

        assert_eq!(plan.repetitions, 0);
        assert_eq!(plan.interval_days, MIN_INTERVAL_DAYS);
    }

    #[test]
    fn first_success_graduates_at_one_or_four_days() {
        let s = SchedulingState::initial(ItemCategory::Vocabulary);
        assert_eq!(apply(AnswerQuality::Good, &s).interval_days, 1);
        assert_eq!(apply(AnswerQuality::Easy, &s).interval_days, 4);
    }

    #[test]
    fn ease_factor_never_falls_below_floor() {
        let mut s = state(1.4, 5, 2, ItemCategory::Kana);
        for _ in 0..10 {
            let plan = apply(AnswerQuality::Again, &s);
            assert!(plan.ease_factor >= MIN_EASE_FACTOR);
            s = plan.next_state(s.category);
        }
        assert_eq!(s.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn interval_rounds_half_up() {
        // 15 * 1.3 = 19.5 must round to 20, not 19.
        let s = state(1.3, 15, 3, ItemCategory::Kana);
        let plan = apply(AnswerQuality::Good, &s);
        assert_eq!(plan.ease_factor, 1.3);
        assert_eq!(plan.interval_days, 20);
    }

    #[test]
    fn kanji_divisor_pushes_interval_across_mastery_boundary() {
        // Raw repetition-ladder interval 15 (6 * 2.5), divided by 0.7 and
        // re-rounded: 21.43 -> 21, exactly at the mastered threshold.
        let s = state(2.5, 6, 2, ItemCategory::Kanji);
        let plan = apply(AnswerQuality::Good, &s);

        assert_eq!(plan.repetitions, 3);
        assert_eq!(plan.interval_days, 21);
        assert_eq!(plan.status, ProgressStatus::Mastered);
    }

    #[test]
    fn grammar_divisor_shortens_spacing() {
        let s = state(2.5, 6, 2, ItemCategory::Grammar);
        let plan = apply(AnswerQuality::Good, &s);
        // 15 / 0.85 = 17.65 -> 18
        assert_eq!(plan.interval_days, 18);
        assert_eq!(plan.status, ProgressStatus::Reviewing);
    }

    #[test]
    fn interval_clamps_at_ceiling() {
        let s = state(2.5, 300, 6, ItemCategory::Vocabulary);
        let plan = apply(AnswerQuality::Good, &s);
        assert_eq!(plan.interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(plan.status, ProgressStatus::Mastered);
    }

    #[test]
    fn invariants_hold_over_a_mixed_run() {
        let qualities = [
            AnswerQuality::Good,
            AnswerQuality::Hard,
            AnswerQuality::Good,
            AnswerQuality::Again,
            AnswerQuality::Good,
            AnswerQuality::Easy,
            AnswerQuality::Easy,
        ];

        let mut s = SchedulingState::initial(ItemCategory::Kanji);
        for quality in qualities {
            let plan = apply(quality, &s);
            assert!((MIN_EASE_FACTOR..=MAX_EASE_FACTOR).contains(&plan.ease_factor));
            assert!((MIN_INTERVAL_DAYS..=MAX_INTERVAL_DAYS).contains(&plan.interval_days));
            s = plan.next_state(s.category);
        }
    }

    #[test]
    fn non_finite_ease_factor_is_rejected() {
        let s = state(f64::NAN, 5, 2, ItemCategory::Kana);
        let err = compute_next_review(AnswerQuality::Good, &s, fixed_now()).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidEaseFactor { .. }));

        let s = state(-1.0, 5, 2, ItemCategory::Kana);
        let err = compute_next_review(AnswerQuality::Again, &s, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidEaseFactor { provided } if provided == -1.0
        ));
    }

    #[test]
    fn is_due_matches_days_until_due_sign() {
        let now = fixed_now();
        for offset in [-5_i64, -1, 0, 1, 5] {
            let due = now + Duration::days(offset);
            assert_eq!(is_due(due, now), days_until_due(due, now) <= 0);
        }
        assert_eq!(days_until_due(now + Duration::days(5), now), 5);
        assert_eq!(days_until_due(now - Duration::days(5), now), -5);
    }

    #[test]
    fn accuracy_handles_empty_history() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(80, 100), 0.8);
        assert_eq!(accuracy(100, 100), 1.0);
    }

    #[test]
    fn review_priority_orders_overdue_and_difficult_first() {
        let now = fixed_now();
        let overdue_hard = review_priority(now - Duration::days(3), 1.5, now);
        let overdue_easy = review_priority(now - Duration::days(3), 2.5, now);
        let due_today = review_priority(now, 2.5, now);
        let future = review_priority(now + Duration::days(4), 2.5, now);

        // Equal overdue: the lower-ease item wins.
        assert!(overdue_hard < overdue_easy);
        // Equal ease: the more-overdue item wins; future items get no
        // overdue credit at all.
        assert!(overdue_easy < due_today);
        assert_eq!(due_today, future);
    }
}
