use sqlx::Row;
use uuid::Uuid;

use kioku_core::model::{
    AnswerQuality, ItemCategory, ItemId, LearningItem, Progress, ProgressStatus, SchedulingState,
    StudySession, UserId, UserStats,
};

use crate::repository::{ReviewLogRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_field(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

/// IDs are stored as hyphenated UUID text.
pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    Ok(UserId::new(Uuid::parse_str(s).map_err(ser)?))
}

pub(crate) fn item_id_from_str(s: &str) -> Result<ItemId, StorageError> {
    Ok(ItemId::new(Uuid::parse_str(s).map_err(ser)?))
}

/// Converts an `AnswerQuality` to its storage representation (0..=3).
/// This must stay consistent with `quality_from_i64`.
pub(crate) fn quality_to_i64(quality: AnswerQuality) -> i64 {
    i64::from(quality.as_u8())
}

/// Converts a stored integer quality (0..=3) back into `AnswerQuality`.
pub(crate) fn quality_from_i64(value: i64) -> Result<AnswerQuality, StorageError> {
    let raw = u8::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("invalid quality: {value}")))?;
    AnswerQuality::from_u8(raw).map_err(ser)
}

pub(crate) fn map_item_row(row: &sqlx::sqlite::SqliteRow) -> Result<LearningItem, StorageError> {
    let id = item_id_from_str(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
    let category =
        ItemCategory::parse(row.try_get::<String, _>("category").map_err(ser)?.as_str())
            .map_err(ser)?;
    let position = u32_field("position", row.try_get("position").map_err(ser)?)?;

    Ok(LearningItem {
        id,
        category,
        prompt: row.try_get("prompt").map_err(ser)?,
        reading: row.try_get("reading").map_err(ser)?,
        meaning: row.try_get("meaning").map_err(ser)?,
        position,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<Progress, StorageError> {
    let user_id = user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?;
    let item_id = item_id_from_str(row.try_get::<String, _>("item_id").map_err(ser)?.as_str())?;
    let status =
        ProgressStatus::parse(row.try_get::<String, _>("status").map_err(ser)?.as_str())
            .map_err(ser)?;
    let category =
        ItemCategory::parse(row.try_get::<String, _>("category").map_err(ser)?.as_str())
            .map_err(ser)?;

    let state = SchedulingState {
        ease_factor: row.try_get("ease_factor").map_err(ser)?,
        interval_days: u32_field("interval_days", row.try_get("interval_days").map_err(ser)?)?,
        repetitions: u32_field("repetitions", row.try_get("repetitions").map_err(ser)?)?,
        category,
    };

    Ok(Progress {
        user_id,
        item_id,
        state,
        status,
        next_review_at: row.try_get("next_review_at").map_err(ser)?,
        last_reviewed_at: row.try_get("last_reviewed_at").map_err(ser)?,
        total_reviews: u32_field("total_reviews", row.try_get("total_reviews").map_err(ser)?)?,
        correct_reviews: u32_field(
            "correct_reviews",
            row.try_get("correct_reviews").map_err(ser)?,
        )?,
    })
}

pub(crate) fn map_log_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReviewLogRecord, StorageError> {
    Ok(ReviewLogRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        user_id: user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        item_id: item_id_from_str(row.try_get::<String, _>("item_id").map_err(ser)?.as_str())?,
        quality: quality_from_i64(row.try_get("quality").map_err(ser)?)?,
        reviewed_at: row.try_get("reviewed_at").map_err(ser)?,
        ease_factor: row.try_get("ease_factor").map_err(ser)?,
        interval_days: u32_field("interval_days", row.try_get("interval_days").map_err(ser)?)?,
        next_review_at: row.try_get("next_review_at").map_err(ser)?,
    })
}

pub(crate) fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserStats, StorageError> {
    let total_xp_i64: i64 = row.try_get("total_xp").map_err(ser)?;
    let total_xp = u64::try_from(total_xp_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid total_xp: {total_xp_i64}")))?;

    Ok(UserStats {
        user_id: user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        level: u32_field("level", row.try_get("level").map_err(ser)?)?,
        total_xp,
        current_streak: u32_field(
            "current_streak",
            row.try_get("current_streak").map_err(ser)?,
        )?,
        longest_streak: u32_field(
            "longest_streak",
            row.try_get("longest_streak").map_err(ser)?,
        )?,
        last_study_date: row.try_get("last_study_date").map_err(ser)?,
        total_sessions: u32_field(
            "total_sessions",
            row.try_get("total_sessions").map_err(ser)?,
        )?,
    })
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<StudySession, StorageError> {
    Ok(StudySession {
        user_id: user_id_from_str(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        session_date: row.try_get("session_date").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
        duration_secs: u32_field("duration_secs", row.try_get("duration_secs").map_err(ser)?)?,
        items_studied: u32_field("items_studied", row.try_get("items_studied").map_err(ser)?)?,
        items_correct: u32_field("items_correct", row.try_get("items_correct").map_err(ser)?)?,
        new_items: u32_field("new_items", row.try_get("new_items").map_err(ser)?)?,
        review_items: u32_field("review_items", row.try_get("review_items").map_err(ser)?)?,
        xp_earned: u32_field("xp_earned", row.try_get("xp_earned").map_err(ser)?)?,
    })
}
