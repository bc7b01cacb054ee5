use chrono::NaiveDate;
use sqlx::FromRow;

use super::word::PLACEHOLDER_IMAGE;

/// A saved word joined with its current dictionary and category details.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SavedWordView {
    pub word_id: i64,
    pub maori: String,
    pub english: String,
    pub category_id: i64,
    pub category_name: String,
    pub image: Option<String>,
    pub saved_on: NaiveDate,
}

impl SavedWordView {
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}
