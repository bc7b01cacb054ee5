use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i64,
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryForm {
    pub category: String,
    /// Present when the user resubmits after a "similar category" warning.
    #[serde(default)]
    pub acknowledge: Option<String>,
}

impl CreateCategoryForm {
    pub fn acknowledged(&self) -> bool {
        self.acknowledge
            .as_deref()
            .is_some_and(|v| !v.is_empty() && v != "false")
    }
}
