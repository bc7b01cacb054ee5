pub mod auth_service;
pub mod category_service;
pub mod saved_word_service;
pub mod validation;
pub mod word_service;
