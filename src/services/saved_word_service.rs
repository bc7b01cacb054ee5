use std::collections::HashSet;

use chrono::Local;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::account::SessionUser;
use crate::models::saved_word::SavedWordView;
use crate::models::word::PLACEHOLDER_IMAGE;
use crate::services::auth_service;

fn parse_word_id(raw: &str) -> AppResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        tracing::warn!("--- Word id [{}] is not an integer", raw);
        AppError::InvalidId
    })
}

async fn is_saved(pool: &SqlitePool, account_id: i64, word_id: i64) -> AppResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM Saved_words WHERE user_id = ? AND word_id = ?")
            .bind(account_id)
            .bind(word_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// 1. Bookmarks a word for the logged-in user.
///
/// A word id that does not reference an entry is caught by the foreign key on insert.
pub async fn save_word(pool: &SqlitePool, actor: Option<&SessionUser>, raw_word_id: &str) -> AppResult<()> {
    let actor = auth_service::require_user(actor)?;
    let word_id = parse_word_id(raw_word_id)?;

    if is_saved(pool, actor.account_id, word_id).await? {
        return Err(AppError::AlreadySaved);
    }

    let res = sqlx::query("INSERT INTO Saved_words (user_id, word_id, timestamp) VALUES (?, ?, ?)")
        .bind(actor.account_id)
        .bind(word_id)
        .bind(Local::now().date_naive())
        .execute(pool)
        .await;

    match res {
        Ok(_) => {
            tracing::info!("<<< Account {} saved word {}", actor.account_id, word_id);
            Ok(())
        }
        Err(e) if db::is_foreign_key_violation(&e) => {
            tracing::warn!("--- Save refused, word {} does not exist", word_id);
            Err(AppError::InvalidId)
        }
        Err(e) if db::is_unique_violation(&e) => Err(AppError::AlreadySaved),
        Err(e) => Err(e.into()),
    }
}

/// 2. Removes a bookmark.
pub async fn unsave_word(pool: &SqlitePool, actor: Option<&SessionUser>, raw_word_id: &str) -> AppResult<()> {
    let actor = auth_service::require_user(actor)?;
    let word_id = parse_word_id(raw_word_id)?;

    let res = sqlx::query("DELETE FROM Saved_words WHERE user_id = ? AND word_id = ?")
        .bind(actor.account_id)
        .bind(word_id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        tracing::warn!("--- Account {} tried to unsave word {} which is not saved", actor.account_id, word_id);
        return Err(AppError::NotSaved);
    }

    tracing::info!("<<< Account {} unsaved word {}", actor.account_id, word_id);
    Ok(())
}

/// 3. Saved words of the logged-in user with their current word and category details.
pub async fn list_saved(pool: &SqlitePool, actor: Option<&SessionUser>) -> AppResult<Vec<SavedWordView>> {
    let actor = auth_service::require_user(actor)?;

    let rows = sqlx::query_as::<_, SavedWordView>(
        r#"
        SELECT s.word_id, d.maori, d.english, d.category_id, c.category_name, d.image, s.timestamp AS saved_on
        FROM Saved_words s
        JOIN Dictionary d ON d.id = s.word_id
        JOIN Categories c ON c.id = d.category_id
        WHERE s.user_id = ?
        ORDER BY d.maori ASC, s.timestamp ASC
        "#,
    )
    .bind(actor.account_id)
    .fetch_all(pool)
    .await?;

    let mut seen = HashSet::new();
    let saved: Vec<SavedWordView> = rows
        .into_iter()
        .filter(|row| seen.insert((row.word_id, row.saved_on)))
        .map(|mut row| {
            if row.image.is_none() {
                row.image = Some(PLACEHOLDER_IMAGE.to_string());
            }
            row
        })
        .collect();

    tracing::debug!("<<< Account {} has {} saved words", actor.account_id, saved.len());
    Ok(saved)
}
