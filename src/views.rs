//! askama page templates. Every page shares the navigation and flash fields in [`Page`].

use askama::Template;

use crate::models::category::Category;
use crate::models::saved_word::SavedWordView;
use crate::models::word::{DictionaryEntry, WordForm, WordSummary};
use crate::session::SignupDraft;

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub logged_in: bool,
    pub is_teacher: bool,
    pub first_name: String,
    pub error: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub categories: Vec<Category>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub page: Page,
    pub draft: SignupDraft,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub email: String,
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub page: Page,
    pub category: Category,
    pub words: Vec<WordSummary>,
    pub draft: WordForm,
}

#[derive(Template)]
#[template(path = "word.html")]
pub struct WordTemplate {
    pub page: Page,
    pub word: DictionaryEntry,
    pub categories: Vec<Category>,
    pub draft: WordForm,
}

#[derive(Template)]
#[template(path = "saved.html")]
pub struct SavedTemplate {
    pub page: Page,
    pub saved: Vec<SavedWordView>,
}

#[derive(Template)]
#[template(path = "add_category.html")]
pub struct AddCategoryTemplate {
    pub page: Page,
    pub draft: String,
    /// Set after a "similar category" warning so the next submit forces the add.
    pub similar: bool,
}

#[derive(Template)]
#[template(path = "confirm_category.html")]
pub struct ConfirmCategoryTemplate {
    pub page: Page,
    pub category: Category,
}

#[derive(Template)]
#[template(path = "confirm_word.html")]
pub struct ConfirmWordTemplate {
    pub page: Page,
    pub word: DictionaryEntry,
}
