use kioku_core::model::{ItemId, UserId};

use super::{
    SqliteRepository,
    mapping::{map_log_row, quality_to_i64},
};
use crate::repository::{ReviewLogRecord, ReviewLogRepository, StorageError};

#[async_trait::async_trait]
impl ReviewLogRepository for SqliteRepository {
    async fn append_log(&self, log: ReviewLogRecord) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO review_logs (
                    user_id, item_id, quality, reviewed_at,
                    ease_factor, interval_days, next_review_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(log.user_id.value().to_string())
        .bind(log.item_id.value().to_string())
        .bind(quality_to_i64(log.quality))
        .bind(log.reviewed_at)
        .bind(log.ease_factor)
        .bind(i64::from(log.interval_days))
        .bind(log.next_review_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn logs_for_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Vec<ReviewLogRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, item_id, quality, reviewed_at,
                    ease_factor, interval_days, next_review_at
                FROM review_logs
                WHERE user_id = ?1 AND item_id = ?2
                ORDER BY reviewed_at ASC
            ",
        )
        .bind(user_id.value().to_string())
        .bind(item_id.value().to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_log_row(&row)?);
        }
        Ok(out)
    }
}
