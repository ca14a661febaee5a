use chrono::{DateTime, Utc};

use kioku_core::gamification::answer_xp;
use kioku_core::model::{
    AnswerQuality, ItemId, LearningItem, Progress, ProgressStatus, ReviewLog, UserId,
};
use kioku_core::scheduler::{ReviewPlan, compute_next_review, is_due, review_priority};
use kioku_core::time::Clock;
use kioku_storage::repository::{ReviewLogRecord, Storage};

use crate::error::StudyServiceError;

/// New items introduced per queue build when the caller has no preference.
pub const DEFAULT_NEW_ITEM_LIMIT: u32 = 10;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Everything one answer produced: the persisted progress, the schedule the
/// scheduler chose, the log row ID, and the XP the answer earned.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub progress: Progress,
    pub plan: ReviewPlan,
    pub log_id: i64,
    pub xp_earned: u32,
    /// True when this was the learner's first answer on the item.
    pub first_exposure: bool,
}

//
// ─── STUDY QUEUE ───────────────────────────────────────────────────────────────
//

/// One due review in the queue, paired with its item content.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedReview {
    pub item: LearningItem,
    pub progress: Progress,
}

/// A study queue: due reviews first (most urgent at the front), then a
/// capped batch of never-seen items in curriculum order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudyQueue {
    pub reviews: Vec<QueuedReview>,
    pub new_items: Vec<LearningItem>,
}

impl StudyQueue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty() && self.new_items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len() + self.new_items.len()
    }
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

/// Aggregate counts for the learner's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DashboardStats {
    pub total_items: u64,
    pub new_count: u64,
    pub learning_count: u64,
    pub reviewing_count: u64,
    pub mastered_count: u64,
    pub due_count: u64,
    /// Lifetime recall accuracy across all items, 0.0 with no reviews.
    pub accuracy: f64,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates the study workflow: answering items, building queues, and
/// summarizing progress. The scheduler math lives in `kioku_core`; this
/// service wires it to storage and to the clock.
#[derive(Debug, Clone, Default)]
pub struct StudyService {
    clock: Clock,
}

impl StudyService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Apply a learner's answer to an item: run the scheduler, persist the
    /// updated progress and the log entry, and price the answer in XP.
    ///
    /// `response_ms` is how long the learner took; fast correct reviews
    /// earn more.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` (wrapped) if the item does not
    /// exist, scheduler errors for corrupt persisted state, and storage
    /// errors if persistence fails.
    pub async fn answer_item(
        &self,
        storage: &Storage,
        user_id: UserId,
        item_id: ItemId,
        quality: AnswerQuality,
        response_ms: u32,
    ) -> Result<AnswerOutcome, StudyServiceError> {
        let item = storage.items.get_item(item_id).await?;
        let existing = storage.progress.get_progress(user_id, item_id).await?;

        let now = self.now();
        let first_exposure = existing
            .as_ref()
            .is_none_or(|p| p.total_reviews == 0);
        let mut progress =
            existing.unwrap_or_else(|| Progress::new(user_id, item_id, item.category, now));

        let plan = compute_next_review(quality, &progress.state, now)?;

        progress.state = plan.next_state(item.category);
        progress.status = plan.status;
        progress.next_review_at = plan.next_review_at;
        progress.last_reviewed_at = Some(now);
        progress.total_reviews += 1;
        if quality.is_correct() {
            progress.correct_reviews += 1;
        }

        storage.progress.upsert_progress(&progress).await?;
        let log = ReviewLog::new(user_id, item_id, quality, now);
        let log_id = storage
            .review_logs
            .append_log(ReviewLogRecord::from_plan(&log, &plan))
            .await?;

        let xp_earned = answer_xp(quality, first_exposure, response_ms);

        Ok(AnswerOutcome {
            progress,
            plan,
            log_id,
            xp_earned,
            first_exposure,
        })
    }

    /// Build the learner's study queue for right now.
    ///
    /// Due reviews come back most-urgent-first (longest overdue, then
    /// hardest). Items the learner has never answered follow in curriculum
    /// order, capped at `new_limit`.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the underlying queries.
    pub async fn build_queue(
        &self,
        storage: &Storage,
        user_id: UserId,
        new_limit: u32,
    ) -> Result<StudyQueue, StudyServiceError> {
        let now = self.now();
        let items = storage.items.list_items().await?;
        let records = storage.progress.progress_for_user(user_id).await?;

        let mut by_item: std::collections::HashMap<ItemId, Progress> =
            records.into_iter().map(|p| (p.item_id, p)).collect();

        let mut reviews = Vec::new();
        let mut new_items = Vec::new();
        for item in items {
            match by_item.remove(&item.id) {
                Some(progress) if is_due(progress.next_review_at, now) => {
                    reviews.push(QueuedReview { item, progress });
                }
                Some(_) => {}
                None => {
                    if (new_items.len() as u32) < new_limit {
                        new_items.push(item);
                    }
                }
            }
        }

        reviews.sort_by(|a, b| {
            let pa = review_priority(a.progress.next_review_at, a.progress.state.ease_factor, now);
            let pb = review_priority(b.progress.next_review_at, b.progress.state.ease_factor, now);
            pa.total_cmp(&pb)
        });

        Ok(StudyQueue { reviews, new_items })
    }

    /// Aggregate progress counts and lifetime accuracy for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the underlying queries.
    pub async fn dashboard_stats(
        &self,
        storage: &Storage,
        user_id: UserId,
    ) -> Result<DashboardStats, StudyServiceError> {
        let now = self.now();
        let total_items = storage.items.list_items().await?.len() as u64;
        let records = storage.progress.progress_for_user(user_id).await?;

        let new_count = storage
            .progress
            .count_by_status(user_id, ProgressStatus::New)
            .await?;
        let learning_count = storage
            .progress
            .count_by_status(user_id, ProgressStatus::Learning)
            .await?;
        let reviewing_count = storage
            .progress
            .count_by_status(user_id, ProgressStatus::Reviewing)
            .await?;
        let mastered_count = storage
            .progress
            .count_by_status(user_id, ProgressStatus::Mastered)
            .await?;

        let due_count = records
            .iter()
            .filter(|p| is_due(p.next_review_at, now))
            .count() as u64;
        let correct: u32 = records.iter().map(|p| p.correct_reviews).sum();
        let total: u32 = records.iter().map(|p| p.total_reviews).sum();

        Ok(DashboardStats {
            total_items,
            new_count,
            learning_count,
            reviewing_count,
            mastered_count,
            due_count,
            accuracy: kioku_core::scheduler::accuracy(correct, total),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
