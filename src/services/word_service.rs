use chrono::Local;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::account::SessionUser;
use crate::models::word::{DictionaryEntry, WordForm, WordSummary, PLACEHOLDER_IMAGE};
use crate::services::validation::{self, Field, Reason, ValidationError};
use crate::services::{auth_service, category_service};

const ENTRY_COLUMNS: &str = r#"
    d.id, d.maori, d.english, d.category_id, c.category_name,
    d.definition, d.year_level, d.image, d.timestamp, d.author
"#;

/// Words of one category for the category page, placeholder image applied.
pub async fn words_in_category(pool: &SqlitePool, category_id: i64) -> AppResult<Vec<WordSummary>> {
    let mut words = sqlx::query_as::<_, WordSummary>(
        "SELECT id, maori, english, image FROM Dictionary WHERE category_id = ? ORDER BY maori ASC",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    for word in words.iter_mut().filter(|w| w.image.is_none()) {
        word.image = Some(PLACEHOLDER_IMAGE.to_string());
    }
    Ok(words)
}

pub async fn find_word(pool: &SqlitePool, word_id: i64) -> AppResult<DictionaryEntry> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM Dictionary d JOIN Categories c ON c.id = d.category_id WHERE d.id = ?"
    );
    sqlx::query_as::<_, DictionaryEntry>(&sql)
        .bind(word_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::WordNotFound)
}

/// Looks a word up through the category it is expected to be in.
pub async fn find_word_in_category(
    pool: &SqlitePool,
    category_id: i64,
    word_id: i64,
) -> AppResult<DictionaryEntry> {
    let word = find_word(pool, word_id).await?;
    if word.category_id != category_id {
        return Err(AppError::WordNotFound);
    }
    Ok(word)
}

/// Id of the entry already holding this (maori, english) pair, if any.
async fn pair_owner(pool: &SqlitePool, maori: &str, english: &str) -> AppResult<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM Dictionary WHERE maori = ? AND english = ?")
        .bind(maori)
        .bind(english)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// 1. Adds a word to a category. Returns the new entry id.
pub async fn add_word(
    pool: &SqlitePool,
    actor: Option<&SessionUser>,
    category_id: i64,
    form: &WordForm,
) -> AppResult<i64> {
    let actor = auth_service::require_user(actor)?;
    let category = category_service::find_category(pool, category_id).await?;

    // the add form has no category field; the word always goes into the page's category
    let form = WordForm {
        category: None,
        ..form.normalized()
    };
    let year_level = validation::validate_word(&form)?;

    if pair_owner(pool, &form.maori, &form.english).await?.is_some() {
        tracing::warn!("--- Word [{} / {}] already in dictionary", form.maori, form.english);
        return Err(AppError::DuplicateEntry);
    }

    let res = sqlx::query(
        r#"INSERT INTO Dictionary (maori, english, category_id, definition, year_level, image, timestamp, author)
           VALUES (?, ?, ?, ?, ?, NULL, ?, ?)"#,
    )
    .bind(&form.maori)
    .bind(&form.english)
    .bind(category.id)
    .bind(&form.definition)
    .bind(year_level)
    .bind(Local::now().date_naive())
    .bind(actor.display_name())
    .execute(pool)
    .await;

    match res {
        Ok(res) => {
            let id = res.last_insert_rowid();
            tracing::info!(
                "<<< Word added: id={}, [{} / {}] in [{}]",
                id,
                form.maori,
                form.english,
                category.category_name
            );
            Ok(id)
        }
        Err(e) if db::is_unique_violation(&e) => Err(AppError::DuplicateEntry),
        Err(e) => Err(e.into()),
    }
}

/// 2. Edits a word, possibly moving it to another category by name.
///
/// The duplicate check ignores the word itself, so saving an unchanged pair succeeds.
pub async fn edit_word(
    pool: &SqlitePool,
    actor: Option<&SessionUser>,
    word_id: i64,
    form: &WordForm,
) -> AppResult<DictionaryEntry> {
    let actor = auth_service::require_user(actor)?;
    let current = find_word(pool, word_id).await?;

    let mut form = form.normalized();
    if form.category.is_none() {
        form.category = Some(current.category_name.clone());
    }
    let year_level = validation::validate_word(&form)?;

    let category_name = form
        .category
        .as_deref()
        .ok_or(ValidationError::new(Field::Category, Reason::Blank))?;
    let category = category_service::find_category_by_name(pool, category_name).await?;

    if let Some(owner) = pair_owner(pool, &form.maori, &form.english).await? {
        if owner != word_id {
            tracing::warn!(
                "--- Edit of word {} refused, pair [{} / {}] belongs to word {}",
                word_id,
                form.maori,
                form.english,
                owner
            );
            return Err(AppError::DuplicateEntry);
        }
    }

    let res = sqlx::query(
        r#"UPDATE Dictionary
           SET maori = ?, english = ?, category_id = ?, definition = ?, year_level = ?, timestamp = ?, author = ?
           WHERE id = ?"#,
    )
    .bind(&form.maori)
    .bind(&form.english)
    .bind(category.id)
    .bind(&form.definition)
    .bind(year_level)
    .bind(Local::now().date_naive())
    .bind(actor.display_name())
    .bind(word_id)
    .execute(pool)
    .await;

    match res {
        Ok(_) => {
            tracing::info!("<<< Word {} edited by account {}", word_id, actor.account_id);
            find_word(pool, word_id).await
        }
        Err(e) if db::is_unique_violation(&e) => Err(AppError::DuplicateEntry),
        Err(e) => Err(e.into()),
    }
}

/// 3. Teacher only. Removes saved-word rows pointing at the entry, then the entry.
pub async fn delete_word(
    pool: &SqlitePool,
    actor: Option<&SessionUser>,
    word_id: i64,
) -> AppResult<DictionaryEntry> {
    let actor = auth_service::require_teacher(pool, actor).await?;
    let word = find_word(pool, word_id).await?;
    tracing::warn!(">>> Deleting word {} [{}] by account {}", word_id, word.maori, actor.account_id);

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM Saved_words WHERE word_id = ?")
        .bind(word_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM Dictionary WHERE id = ?")
        .bind(word_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("<<< Word {} removed", word_id);
    Ok(word)
}
