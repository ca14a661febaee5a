use chrono::NaiveDate;

use kioku_core::model::{StudySession, UserId, UserStats};

use super::{
    SqliteRepository,
    mapping::{map_session_row, map_stats_row},
};
use crate::repository::{StorageError, UserStatsRepository};

fn xp_i64(total_xp: u64) -> Result<i64, StorageError> {
    i64::try_from(total_xp).map_err(|_| StorageError::Serialization("total_xp overflow".into()))
}

#[async_trait::async_trait]
impl UserStatsRepository for SqliteRepository {
    async fn get_stats(&self, user_id: UserId) -> Result<Option<UserStats>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, level, total_xp, current_streak, longest_streak,
                last_study_date, total_sessions
            FROM user_stats
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.value().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| map_stats_row(&r)).transpose()
    }

    async fn upsert_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_stats (
                user_id, level, total_xp, current_streak, longest_streak,
                last_study_date, total_sessions
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                level = excluded.level,
                total_xp = excluded.total_xp,
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_study_date = excluded.last_study_date,
                total_sessions = excluded.total_sessions
            ",
        )
        .bind(stats.user_id.value().to_string())
        .bind(i64::from(stats.level))
        .bind(xp_i64(stats.total_xp)?)
        .bind(i64::from(stats.current_streak))
        .bind(i64::from(stats.longest_streak))
        .bind(stats.last_study_date)
        .bind(i64::from(stats.total_sessions))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn record_session(&self, session: &StudySession) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO study_sessions (
                user_id, session_date, completed_at, duration_secs,
                items_studied, items_correct, new_items, review_items, xp_earned
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(session.user_id.value().to_string())
        .bind(session.session_date)
        .bind(session.completed_at)
        .bind(i64::from(session.duration_secs))
        .bind(i64::from(session.items_studied))
        .bind(i64::from(session.items_correct))
        .bind(i64::from(session.new_items))
        .bind(i64::from(session.review_items))
        .bind(i64::from(session.xp_earned))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn sessions_since(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<StudySession>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                user_id, session_date, completed_at, duration_secs,
                items_studied, items_correct, new_items, review_items, xp_earned
            FROM study_sessions
            WHERE user_id = ?1 AND session_date >= ?2
            ORDER BY session_date ASC, id ASC
            ",
        )
        .bind(user_id.value().to_string())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }
}
