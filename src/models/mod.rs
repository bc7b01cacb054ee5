pub mod account;
pub mod category;
pub mod saved_word;
pub mod word;
