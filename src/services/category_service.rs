use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::account::SessionUser;
use crate::models::category::Category;
use crate::services::auth_service;
use crate::services::validation::{self, title_case};

/// Categories sorted by name for the home page.
pub async fn list_categories(pool: &SqlitePool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, category_name FROM Categories ORDER BY category_name COLLATE NOCASE ASC",
    )
    .fetch_all(pool)
    .await?;
    tracing::debug!("<<< Loaded {} categories", categories.len());
    Ok(categories)
}

pub async fn find_category(pool: &SqlitePool, id: i64) -> AppResult<Category> {
    sqlx::query_as::<_, Category>("SELECT id, category_name FROM Categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::CategoryNotFound)
}

/// Case-insensitive lookup used when a word is moved to another category by name.
pub async fn find_category_by_name(pool: &SqlitePool, name: &str) -> AppResult<Category> {
    sqlx::query_as::<_, Category>(
        "SELECT id, category_name FROM Categories WHERE category_name = ? COLLATE NOCASE",
    )
    .bind(name.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::CategoryNotFound)
}

/// Teacher only. Returns the id of the new category.
///
/// A name that contains, or is contained in, an existing name is refused with
/// `SimilarCategory` unless `acknowledge_similar` is set.
pub async fn add_category(
    pool: &SqlitePool,
    actor: Option<&SessionUser>,
    name: &str,
    acknowledge_similar: bool,
) -> AppResult<i64> {
    let actor = auth_service::require_teacher(pool, actor).await?;
    let name = title_case(name.trim());
    validation::validate_category_name(&name)?;
    tracing::info!(">>> Adding category [{}] by account {}", name, actor.account_id);

    let existing = list_categories(pool).await?;
    if existing
        .iter()
        .any(|c| c.category_name.to_lowercase() == name.to_lowercase())
    {
        tracing::warn!("--- Category [{}] already exists", name);
        return Err(AppError::CategoryExists);
    }

    if !acknowledge_similar {
        if let Some(similar) =
            validation::find_similar(&name, existing.iter().map(|c| c.category_name.as_str()))
        {
            tracing::info!("--- Category [{}] is similar to [{}], asking for confirmation", name, similar);
            return Err(AppError::SimilarCategory {
                existing: similar.to_string(),
            });
        }
    }

    let res = sqlx::query("INSERT INTO Categories (category_name) VALUES (?)")
        .bind(&name)
        .execute(pool)
        .await;

    match res {
        Ok(res) => {
            let id = res.last_insert_rowid();
            tracing::info!("<<< Category created: id={}, name={}", id, name);
            Ok(id)
        }
        Err(e) if db::is_unique_violation(&e) => Err(AppError::CategoryExists),
        Err(e) => Err(e.into()),
    }
}

/// Teacher only. Removes saved words of the category's entries, the entries,
/// then the category, inside a single transaction. Returns the deleted category.
pub async fn delete_category(
    pool: &SqlitePool,
    actor: Option<&SessionUser>,
    id: i64,
) -> AppResult<Category> {
    let actor = auth_service::require_teacher(pool, actor).await?;
    let category = find_category(pool, id).await?;
    tracing::warn!(
        ">>> Deleting category [{}] (id={}) by account {}",
        category.category_name,
        id,
        actor.account_id
    );

    let mut tx = pool.begin().await?;

    let saved = sqlx::query(
        "DELETE FROM Saved_words WHERE word_id IN (SELECT id FROM Dictionary WHERE category_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let words = sqlx::query("DELETE FROM Dictionary WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM Categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "<<< Category {} removed with {} words and {} saved words",
        id,
        words.rows_affected(),
        saved.rows_affected()
    );
    Ok(category)
}
