use chrono::{DateTime, Utc};

use kioku_core::model::{ItemId, Progress, ProgressStatus, UserId};

use super::{SqliteRepository, mapping::map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_progress (
                user_id, item_id, status, ease_factor, interval_days, repetitions,
                category, next_review_at, last_reviewed_at, total_reviews, correct_reviews
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(user_id, item_id) DO UPDATE SET
                status = excluded.status,
                ease_factor = excluded.ease_factor,
                interval_days = excluded.interval_days,
                repetitions = excluded.repetitions,
                category = excluded.category,
                next_review_at = excluded.next_review_at,
                last_reviewed_at = excluded.last_reviewed_at,
                total_reviews = excluded.total_reviews,
                correct_reviews = excluded.correct_reviews
            ",
        )
        .bind(progress.user_id.value().to_string())
        .bind(progress.item_id.value().to_string())
        .bind(progress.status.as_str())
        .bind(progress.state.ease_factor)
        .bind(i64::from(progress.state.interval_days))
        .bind(i64::from(progress.state.repetitions))
        .bind(progress.state.category.as_str())
        .bind(progress.next_review_at)
        .bind(progress.last_reviewed_at)
        .bind(i64::from(progress.total_reviews))
        .bind(i64::from(progress.correct_reviews))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, item_id, status, ease_factor, interval_days, repetitions,
                category, next_review_at, last_reviewed_at, total_reviews, correct_reviews
            FROM user_progress
            WHERE user_id = ?1 AND item_id = ?2
            ",
        )
        .bind(user_id.value().to_string())
        .bind(item_id.value().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_progress_row(&r)).transpose()
    }

    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                user_id, item_id, status, ease_factor, interval_days, repetitions,
                category, next_review_at, last_reviewed_at, total_reviews, correct_reviews
            FROM user_progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.value().to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }

    async fn due_progress(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                user_id, item_id, status, ease_factor, interval_days, repetitions,
                category, next_review_at, last_reviewed_at, total_reviews, correct_reviews
            FROM user_progress
            WHERE user_id = ?1
              AND next_review_at <= ?2
            ORDER BY next_review_at ASC
            LIMIT ?3
            ",
        )
        .bind(user_id.value().to_string())
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }

    async fn count_by_status(
        &self,
        user_id: UserId,
        status: ProgressStatus,
    ) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM user_progress
            WHERE user_id = ?1 AND status = ?2
            ",
        )
        .bind(user_id.value().to_string())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        u64::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))
    }
}
