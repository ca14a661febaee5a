use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (learning items, per-user progress, review logs,
/// user stats, study sessions, and indexes).
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS learning_items (
                    id TEXT PRIMARY KEY,
                    category TEXT NOT NULL CHECK (category IN ('kana', 'vocabulary', 'kanji', 'grammar')),
                    prompt TEXT NOT NULL,
                    reading TEXT NOT NULL,
                    meaning TEXT NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_progress (
                    user_id TEXT NOT NULL,
                    item_id TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('new', 'learning', 'reviewing', 'mastered')),
                    ease_factor REAL NOT NULL,
                    interval_days INTEGER NOT NULL CHECK (interval_days >= 0),
                    repetitions INTEGER NOT NULL CHECK (repetitions >= 0),
                    category TEXT NOT NULL,
                    next_review_at TEXT NOT NULL,
                    last_reviewed_at TEXT,
                    total_reviews INTEGER NOT NULL CHECK (total_reviews >= 0),
                    correct_reviews INTEGER NOT NULL CHECK (correct_reviews >= 0),
                    PRIMARY KEY (user_id, item_id),
                    FOREIGN KEY (item_id) REFERENCES learning_items(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS review_logs (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    item_id TEXT NOT NULL,
                    quality INTEGER NOT NULL CHECK (quality BETWEEN 0 AND 3),
                    reviewed_at TEXT NOT NULL,
                    ease_factor REAL NOT NULL,
                    interval_days INTEGER NOT NULL CHECK (interval_days >= 0),
                    next_review_at TEXT NOT NULL,
                    FOREIGN KEY (item_id) REFERENCES learning_items(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_stats (
                    user_id TEXT PRIMARY KEY,
                    level INTEGER NOT NULL CHECK (level >= 1),
                    total_xp INTEGER NOT NULL CHECK (total_xp >= 0),
                    current_streak INTEGER NOT NULL CHECK (current_streak >= 0),
                    longest_streak INTEGER NOT NULL CHECK (longest_streak >= 0),
                    last_study_date TEXT,
                    total_sessions INTEGER NOT NULL CHECK (total_sessions >= 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS study_sessions (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    session_date TEXT NOT NULL,
                    completed_at TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0),
                    items_studied INTEGER NOT NULL CHECK (items_studied >= 0),
                    items_correct INTEGER NOT NULL CHECK (items_correct >= 0),
                    new_items INTEGER NOT NULL CHECK (new_items >= 0),
                    review_items INTEGER NOT NULL CHECK (review_items >= 0),
                    xp_earned INTEGER NOT NULL CHECK (xp_earned >= 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_next_review
                    ON user_progress (user_id, next_review_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_status
                    ON user_progress (user_id, status);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_review_logs_user_item_reviewed_at
                    ON review_logs (user_id, item_id, reviewed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_study_sessions_user_date
                    ON study_sessions (user_id, session_date);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
