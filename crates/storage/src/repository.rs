use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use kioku_core::model::{
    AnswerQuality, ItemId, LearningItem, Progress, ProgressStatus, ReviewLog, StudySession,
    UserId, UserStats,
};
use kioku_core::scheduler::ReviewPlan;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── REVIEW LOG RECORD ─────────────────────────────────────────────────────────
//

/// Persisted shape for one answer event, including the schedule it produced.
///
/// Mirrors the domain `ReviewLog` plus the scheduling outcome so history
/// queries never need to replay the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewLogRecord {
    /// Assigned by storage on insert.
    pub id: Option<i64>,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub quality: AnswerQuality,
    pub reviewed_at: DateTime<Utc>,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewLogRecord {
    /// Builds a record from a log entry and the plan the scheduler chose.
    #[must_use]
    pub fn from_plan(log: &ReviewLog, plan: &ReviewPlan) -> Self {
        Self {
            id: None,
            user_id: log.user_id,
            item_id: log.item_id,
            quality: log.quality,
            reviewed_at: log.reviewed_at,
            ease_factor: plan.ease_factor,
            interval_days: plan.interval_days,
            next_review_at: plan.next_review_at,
        }
    }
}

//
// ─── REPOSITORY TRAITS ─────────────────────────────────────────────────────────
//

/// Repository contract for the shared curriculum of learning items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist or update an item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the item cannot be stored.
    async fn upsert_item(&self, item: &LearningItem) -> Result<(), StorageError>;

    /// Fetch an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_item(&self, id: ItemId) -> Result<LearningItem, StorageError>;

    /// All items in curriculum order (ascending position).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn list_items(&self) -> Result<Vec<LearningItem>, StorageError>;
}

/// Repository contract for per-(user, item) progress records.
///
/// `upsert_progress` is the single write path; callers needing atomicity for
/// concurrent answers on the same (user, item) pair serialize here, not in
/// the scheduler.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist or update a progress record, keyed by (user, item).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError>;

    /// Fetch the progress record for one (user, item) pair, `None` if the
    /// item has never been answered.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn get_progress(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<Progress>, StorageError>;

    /// All progress records for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<Progress>, StorageError>;

    /// Progress records due at `now`, soonest first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn due_progress(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Progress>, StorageError>;

    /// Number of a learner's records in the given status.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn count_by_status(
        &self,
        user_id: UserId,
        status: ProgressStatus,
    ) -> Result<u64, StorageError>;
}

/// Repository contract for the answer history.
#[async_trait]
pub trait ReviewLogRepository: Send + Sync {
    /// Append a log entry, returning its storage ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_log(&self, log: ReviewLogRecord) -> Result<i64, StorageError>;

    /// All log entries for one (user, item) pair, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn logs_for_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Vec<ReviewLogRecord>, StorageError>;
}

/// Repository contract for gamification counters and session history.
#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// Fetch a learner's stats, `None` if they have never studied.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError>;

    /// Persist or update a learner's stats.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stats cannot be stored.
    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError>;

    /// Append a completed-session summary, returning its storage ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError>;

    /// Session summaries on or after `since`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn sessions_since(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<Mutex<HashMap<ItemId, LearningItem>>>,
    progress: Arc<Mutex<HashMap<(UserId, ItemId), Progress>>>,
    logs: Arc<Mutex<Vec<ReviewLogRecord>>>,
    stats: Arc<Mutex<HashMap<UserId, UserStats>>>,
    sessions: Arc<Mutex<Vec<StudySession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
        m.lock().map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn upsert_item(&self, item: &LearningItem) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.items)?;
        guard.insert(item.id, item.clone());
        Ok(())
    }

    async fn get_item(&self, id: ItemId) -> Result<LearningItem, StorageError> {
        let guard = Self::lock(&self.items)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_items(&self) -> Result<Vec<LearningItem>, StorageError> {
        let guard = Self::lock(&self.items)?;
        let mut items: Vec<LearningItem> = guard.values().cloned().collect();
        items.sort_by_key(|item| (item.position, item.id));
        Ok(items)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.progress)?;
        guard.insert((progress.user_id, progress.item_id), progress.clone());
        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<Progress>, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard.get(&(user_id, item_id)).cloned())
    }

    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<Progress>, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn due_progress(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Progress>, StorageError> {
        let guard = Self::lock(&self.progress)?;
        let mut due: Vec<Progress> = guard
            .values()
            .filter(|p| p.user_id == user_id && p.next_review_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|p| p.next_review_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn count_by_status(
        &self,
        user_id: UserId,
        status: ProgressStatus,
    ) -> Result<u64, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard
            .values()
            .filter(|p| p.user_id == user_id && p.status == status)
            .count() as u64)
    }
}

#[async_trait]
impl ReviewLogRepository for InMemoryRepository {
    async fn append_log(&self, mut log: ReviewLogRecord) -> Result<i64, StorageError> {
        let mut guard = Self::lock(&self.logs)?;
        let id = guard.len() as i64 + 1;
        log.id = Some(id);
        guard.push(log);
        Ok(id)
    }

    async fn logs_for_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Vec<ReviewLogRecord>, StorageError> {
        let guard = Self::lock(&self.logs)?;
        Ok(guard
            .iter()
            .filter(|l| l.user_id == user_id && l.item_id == item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStatsRepository for InMemoryRepository {
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError> {
        let guard = Self::lock(&self.stats)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.stats)?;
        guard.insert(stats.user_id, stats.clone());
        Ok(())
    }

    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let mut guard = Self::lock(&self.sessions)?;
        guard.push(session.clone());
        Ok(guard.len() as i64)
    }

    async fn sessions_since(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError> {
        let guard = Self::lock(&self.sessions)?;
        let mut sessions: Vec<StudySession> = guard
            .iter()
            .filter(|s| s.user_id == user_id && s.session_date >= since)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.session_date);
        Ok(sessions)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn ItemRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub review_logs: Arc<dyn ReviewLogRepository>,
    pub stats: Arc<dyn UserStatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            items: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            review_logs: Arc::new(repo.clone()),
            stats: Arc::new(repo),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kioku_core::model::ItemCategory;
    use kioku_core::time::fixed_now;

    fn build_item(position: u32) -> LearningItem {
        LearningItem::new(
            ItemId::random(),
            ItemCategory::Vocabulary,
            "犬",
            "いぬ",
            "dog",
            position,
            fixed_now(),
        )
    }

    #[tokio::test]
    async fn items_list_in_curriculum_order() {
        let repo = InMemoryRepository::new();
        let second = build_item(2);
        let first = build_item(1);
        repo.upsert_item(&second).await.unwrap();
        repo.upsert_item(&first).await.unwrap();

        let items = repo.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, first.id);
        assert_eq!(items[1].id, second.id);
    }

    #[tokio::test]
    async fn progress_round_trips_and_missing_is_none() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let item = build_item(1);
        let progress = Progress::new(user, item.id, item.category, fixed_now());

        assert!(repo.get_progress(user, item.id).await.unwrap().is_none());

        repo.upsert_progress(&progress).await.unwrap();
        let fetched = repo.get_progress(user, item.id).await.unwrap().unwrap();
        assert_eq!(fetched, progress);
    }

    #[tokio::test]
    async fn due_progress_filters_and_orders_by_due_date() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let now = fixed_now();

        let mut later = Progress::new(user, ItemId::random(), ItemCategory::Kana, now);
        later.next_review_at = now - Duration::days(1);
        let mut earlier = Progress::new(user, ItemId::random(), ItemCategory::Kana, now);
        earlier.next_review_at = now - Duration::days(3);
        let mut future = Progress::new(user, ItemId::random(), ItemCategory::Kana, now);
        future.next_review_at = now + Duration::days(2);

        for p in [&later, &earlier, &future] {
            repo.upsert_progress(p).await.unwrap();
        }

        let due = repo.due_progress(user, now, 10).await.unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].item_id, earlier.item_id);
        assert_eq!(due[1].item_id, later.item_id);
    }

    #[tokio::test]
    async fn stats_and_sessions_round_trip() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        assert!(repo.get_stats(user).await.unwrap().is_none());

        let stats = UserStats::new(user);
        repo.upsert_stats(&stats).await.unwrap();
        assert_eq!(repo.get_stats(user).await.unwrap().unwrap(), stats);

        let session = StudySession {
            user_id: user,
            session_date: fixed_now().date_naive(),
            completed_at: fixed_now(),
            duration_secs: 300,
            items_studied: 20,
            items_correct: 18,
            new_items: 5,
            review_items: 15,
            xp_earned: 140,
        };
        let id = repo.record_session(&session).await.unwrap();
        assert_eq!(id, 1);

        let sessions = repo
            .sessions_since(user, fixed_now().date_naive())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0], session);
    }
}
