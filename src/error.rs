use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Word already in dictionary")]
    DuplicateEntry,

    #[error("Email is already used")]
    EmailTaken,

    #[error("This category already exists")]
    CategoryExists,

    #[error("This category is similar to {existing}. Resubmit to add anyway")]
    SimilarCategory { existing: String },

    #[error("Email cannot be found")]
    AccountNotFound,

    #[error("Category not in dictionary")]
    CategoryNotFound,

    #[error("Word not in dictionary")]
    WordNotFound,

    #[error("You do not have permission to do that")]
    Forbidden,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Invalid word id")]
    InvalidId,

    #[error("Email or password is incorrect")]
    BadCredentials,

    #[error("Word has already been saved")]
    AlreadySaved,

    #[error("Word isn't saved")]
    NotSaved,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AppError {
    /// Infrastructure failures are answered with a 500 instead of a redirect message.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Migration(_)
                | AppError::Template(_)
                | AppError::PasswordHash(_)
        )
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_)
            | AppError::DuplicateEntry
            | AppError::EmailTaken
            | AppError::CategoryExists
            | AppError::SimilarCategory { .. }
            | AppError::InvalidId
            | AppError::AlreadySaved
            | AppError::NotSaved => StatusCode::BAD_REQUEST,
            AppError::AccountNotFound | AppError::CategoryNotFound | AppError::WordNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotAuthenticated | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Template(_)
            | AppError::PasswordHash(_) => {
                tracing::error!("!!! Request failed: {}", self);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        };

        (status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
