use chrono::{DateTime, Utc};

use kioku_core::gamification::{
    DEFAULT_DAILY_GOAL, LevelUp, StreakMilestone, StreakUpdate, advance_streak, check_level_up,
    daily_goal_xp, level_for_xp, milestone_for,
};
use kioku_core::model::{StudySession, UserId, UserStats};
use kioku_storage::repository::Storage;

use crate::error::GamificationError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of crediting XP to a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub xp: u32,
    pub total_xp: u64,
    pub level_up: LevelUp,
}

/// Result of advancing a learner's streak for today's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub update: StreakUpdate,
    /// Set when today's activity landed exactly on a milestone tier.
    pub milestone: Option<StreakMilestone>,
    pub bonus_xp: u32,
}

/// What a completed session earned, all sources combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: i64,
    pub xp_earned: u32,
    pub daily_goal_hit: bool,
    pub streak: StreakUpdate,
    pub level_up: LevelUp,
}

/// Caller-supplied summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInput {
    pub duration_secs: u32,
    pub items_studied: u32,
    pub items_correct: u32,
    pub new_items: u32,
    pub review_items: u32,
    /// XP already earned answer-by-answer during the session.
    pub answer_xp: u32,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Maintains XP, levels, streaks, and session history for a learner.
///
/// All streak bookkeeping is calendar-day granular: two sessions on the
/// same day count once, and a one-day gap breaks the chain.
#[derive(Debug, Clone, Default)]
pub struct GamificationService {
    clock: kioku_core::Clock,
}

impl GamificationService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: kioku_core::Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Credit `xp` to the learner and recompute their level.
    ///
    /// # Errors
    ///
    /// Returns storage errors if the stats cannot be loaded or saved.
    pub async fn award_xp(
        &self,
        storage: &Storage,
        user_id: UserId,
        xp: u32,
    ) -> Result<XpAward, GamificationError> {
        let mut stats = self.load_or_new(storage, user_id).await?;
        let previous_xp = stats.total_xp;

        stats.total_xp += u64::from(xp);
        stats.level = level_for_xp(stats.total_xp);
        storage.stats.upsert_stats(&stats).await?;

        Ok(XpAward {
            xp,
            total_xp: stats.total_xp,
            level_up: check_level_up(previous_xp, stats.total_xp),
        })
    }

    /// Register study activity for today and advance the streak.
    ///
    /// Milestone bonuses pay only when the streak grows onto the milestone
    /// day, so repeating a session on the same day never double-pays.
    ///
    /// # Errors
    ///
    /// Returns storage errors if the stats cannot be loaded or saved.
    pub async fn update_streak(
        &self,
        storage: &Storage,
        user_id: UserId,
    ) -> Result<StreakOutcome, GamificationError> {
        let mut stats = self.load_or_new(storage, user_id).await?;
        let today = self.clock.today();

        let update = advance_streak(stats.last_study_date, stats.current_streak, today);
        let milestone = streak_milestone(&stats, update);
        let bonus_xp = milestone.map_or(0, |m| m.xp);

        stats.current_streak = update.streak;
        stats.longest_streak = stats.longest_streak.max(update.streak);
        stats.last_study_date = Some(today);
        stats.total_xp += u64::from(bonus_xp);
        stats.level = level_for_xp(stats.total_xp);
        storage.stats.upsert_stats(&stats).await?;

        Ok(StreakOutcome {
            update,
            milestone,
            bonus_xp,
        })
    }

    /// Close out a study session: record it, advance the streak, and pay
    /// out answer XP plus the daily-goal and milestone bonuses in one
    /// stats update.
    ///
    /// # Errors
    ///
    /// Returns storage errors if the stats or session cannot be saved.
    pub async fn complete_session(
        &self,
        storage: &Storage,
        user_id: UserId,
        input: SessionInput,
    ) -> Result<SessionOutcome, GamificationError> {
        let mut stats = self.load_or_new(storage, user_id).await?;
        let now = self.now();
        let today = self.clock.today();

        let streak = advance_streak(stats.last_study_date, stats.current_streak, today);
        let milestone_xp = streak_milestone(&stats, streak).map_or(0, |m| m.xp);
        let goal_xp = daily_goal_xp(input.items_studied, DEFAULT_DAILY_GOAL);
        let xp_earned = input.answer_xp + goal_xp + milestone_xp;

        let previous_xp = stats.total_xp;
        stats.total_xp += u64::from(xp_earned);
        stats.level = level_for_xp(stats.total_xp);
        stats.current_streak = streak.streak;
        stats.longest_streak = stats.longest_streak.max(streak.streak);
        stats.last_study_date = Some(today);
        stats.total_sessions += 1;
        storage.stats.upsert_stats(&stats).await?;

        let session = StudySession {
            user_id,
            session_date: today,
            completed_at: now,
            duration_secs: input.duration_secs,
            items_studied: input.items_studied,
            items_correct: input.items_correct,
            new_items: input.new_items,
            review_items: input.review_items,
            xp_earned,
        };
        let session_id = storage.stats.record_session(&session).await?;

        Ok(SessionOutcome {
            session_id,
            xp_earned,
            daily_goal_hit: goal_xp > 0,
            streak,
            level_up: check_level_up(previous_xp, stats.total_xp),
        })
    }

    async fn load_or_new(
        &self,
        storage: &Storage,
        user_id: UserId,
    ) -> Result<UserStats, GamificationError> {
        Ok(storage
            .stats
            .get_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::new(user_id)))
    }
}

/// The milestone to pay for this streak transition, if any.
///
/// A first-ever study day starts at streak 1, below every tier; broken
/// streaks reset below every tier; only a streak that actually grew can
/// land on a milestone.
fn streak_milestone(stats: &UserStats, update: StreakUpdate) -> Option<StreakMilestone> {
    if update.continued || stats.last_study_date.is_none() {
        milestone_for(update.streak)
    } else {
        None
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
