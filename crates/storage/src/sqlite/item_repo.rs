use kioku_core::model::{ItemId, LearningItem};

use super::{SqliteRepository, mapping::map_item_row};
use crate::repository::{ItemRepository, StorageError};

#[async_trait::async_trait]
impl ItemRepository for SqliteRepository {
    async fn upsert_item(&self, item: &LearningItem) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO learning_items (
                id, category, prompt, reading, meaning, position, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                -- keep created_at from the original insert; only update mutable fields
                category = excluded.category,
                prompt = excluded.prompt,
                reading = excluded.reading,
                meaning = excluded.meaning,
                position = excluded.position
            ",
        )
        .bind(item.id.value().to_string())
        .bind(item.category.as_str())
        .bind(item.prompt.as_str())
        .bind(item.reading.as_str())
        .bind(item.meaning.as_str())
        .bind(i64::from(item.position))
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_item(&self, id: ItemId) -> Result<LearningItem, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, category, prompt, reading, meaning, position, created_at
            FROM learning_items
            WHERE id = ?1
            ",
        )
        .bind(id.value().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_item_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn list_items(&self) -> Result<Vec<LearningItem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, category, prompt, reading, meaning, position, created_at
            FROM learning_items
            ORDER BY position ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(map_item_row(&row)?);
        }
        Ok(items)
    }
}
