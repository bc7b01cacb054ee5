use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;

/// Image shown for entries that were stored without one.
pub const PLACEHOLDER_IMAGE: &str = "noimage.png";

/// A `Dictionary` row joined with the name of its category.
#[derive(Debug, Clone, FromRow)]
pub struct DictionaryEntry {
    pub id: i64,
    pub maori: String,
    pub english: String,
    pub category_id: i64,
    pub category_name: String,
    pub definition: String,
    pub year_level: i64,
    pub image: Option<String>,
    pub timestamp: NaiveDate,
    pub author: String,
}

impl DictionaryEntry {
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Compact row used on category pages.
#[derive(Debug, Clone, FromRow)]
pub struct WordSummary {
    pub id: i64,
    pub maori: String,
    pub english: String,
    pub image: Option<String>,
}

impl WordSummary {
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Submitted add/edit word form. Also kept in the session to refill the form after an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WordForm {
    pub maori: String,
    pub english: String,
    pub year_level: String,
    pub definition: String,
    /// Only sent by the edit form, where the word may be moved to another category.
    #[serde(default)]
    pub category: Option<String>,
}

impl WordForm {
    /// Terms are stored trimmed and lowercased so the uniqueness check is stable.
    pub fn normalized(&self) -> Self {
        Self {
            maori: self.maori.trim().to_lowercase(),
            english: self.english.trim().to_lowercase(),
            year_level: self.year_level.trim().to_string(),
            definition: self.definition.trim().to_string(),
            category: self.category.as_ref().map(|c| c.trim().to_string()),
        }
    }

    /// Whether `category_name` is the category chosen on this form. Names are matched
    /// the way category lookups match them, ignoring case.
    pub fn selects(&self, category_name: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category_name))
    }
}
