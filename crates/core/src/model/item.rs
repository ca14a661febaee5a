use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ITEM CATEGORY ─────────────────────────────────────────────────────────────
//

/// Errors that can occur while handling learning items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("invalid item category: {0}")]
    InvalidCategory(String),
}

/// Content category of a learning item.
///
/// The category changes how aggressively the scheduler spaces reviews:
/// kanji and grammar recur more frequently than kana and vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Hiragana and katakana characters.
    Kana,
    /// Words and short phrases.
    Vocabulary,
    /// Kanji characters and compounds.
    Kanji,
    /// Grammar points and sentence patterns.
    Grammar,
}

impl ItemCategory {
    /// Storage representation of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Kana => "kana",
            ItemCategory::Vocabulary => "vocabulary",
            ItemCategory::Kanji => "kanji",
            ItemCategory::Grammar => "grammar",
        }
    }

    /// Parses the storage representation back into a category.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::InvalidCategory` for unknown values.
    pub fn parse(s: &str) -> Result<Self, ItemError> {
        match s {
            "kana" => Ok(ItemCategory::Kana),
            "vocabulary" => Ok(ItemCategory::Vocabulary),
            "kanji" => Ok(ItemCategory::Kanji),
            "grammar" => Ok(ItemCategory::Grammar),
            other => Err(ItemError::InvalidCategory(other.to_string())),
        }
    }
}

//
// ─── LEARNING ITEM ─────────────────────────────────────────────────────────────
//

/// A single unit of study content: a kana character, a vocabulary word,
/// a kanji, or a grammar point.
///
/// Items are shared across learners; per-learner scheduling lives in
/// `Progress` records keyed by (user, item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: ItemId,
    pub category: ItemCategory,
    /// The Japanese form shown on the front of the card.
    pub prompt: String,
    /// Kana reading of the prompt.
    pub reading: String,
    /// English meaning shown on the back of the card.
    pub meaning: String,
    /// Curriculum ordering index; new items are introduced in this order.
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl LearningItem {
    #[must_use]
    pub fn new(
        id: ItemId,
        category: ItemCategory,
        prompt: impl Into<String>,
        reading: impl Into<String>,
        meaning: impl Into<String>,
        position: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            category,
            prompt: prompt.into(),
            reading: reading.into(),
            meaning: meaning.into(),
            position,
            created_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_as_str_round_trips() {
        for cat in [
            ItemCategory::Kana,
            ItemCategory::Vocabulary,
            ItemCategory::Kanji,
            ItemCategory::Grammar,
        ] {
            assert_eq!(ItemCategory::parse(cat.as_str()).unwrap(), cat);
        }
    }

    #[test]
    fn category_parse_rejects_unknown() {
        let err = ItemCategory::parse("hiragana").unwrap_err();
        assert!(matches!(err, ItemError::InvalidCategory(_)));
    }

    #[test]
    fn item_construction_keeps_fields() {
        let id = ItemId::random();
        let item = LearningItem::new(
            id,
            ItemCategory::Vocabulary,
            "水",
            "みず",
            "water",
            3,
            chrono::Utc::now(),
        );
        assert_eq!(item.id, id);
        assert_eq!(item.prompt, "水");
        assert_eq!(item.position, 3);
    }
}
