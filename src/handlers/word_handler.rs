use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Form,
};

use super::{error_redirect, page, parse_id, render, with_error, with_message, Flash};
use crate::error::{AppError, AppResult};
use crate::models::word::{DictionaryEntry, WordForm};
use crate::services::{auth_service, category_service, word_service};
use crate::session::Session;
use crate::views::{ConfirmWordTemplate, WordTemplate};
use crate::AppState;

fn form_from_entry(word: &DictionaryEntry) -> WordForm {
    WordForm {
        maori: word.maori.clone(),
        english: word.english.clone(),
        year_level: word.year_level.to_string(),
        definition: word.definition.clone(),
        category: Some(word.category_name.clone()),
    }
}

/// Resolves `/words/:category_id/:word_id`, or the redirect to show instead.
async fn resolve(state: &AppState, raw_category: &str, raw_word: &str) -> AppResult<Result<DictionaryEntry, Response>> {
    let category = match parse_id(raw_category) {
        Some(id) => category_service::find_category(&state.db, id).await,
        None => Err(AppError::CategoryNotFound),
    };
    let category = match category {
        Ok(category) => category,
        Err(e) => return Ok(Err(error_redirect("/", e)?.into_response())),
    };

    let back = format!("/category/{}", category.id);
    let word = match parse_id(raw_word) {
        Some(id) => word_service::find_word_in_category(&state.db, category.id, id).await,
        None => Err(AppError::WordNotFound),
    };
    match word {
        Ok(word) => Ok(Ok(word)),
        Err(AppError::WordNotFound) => Ok(Err(with_error(&back, &"Word not in category").into_response())),
        Err(e) => Ok(Err(error_redirect(&back, e)?.into_response())),
    }
}

/// 1. Word details with the edit form.
pub async fn word_page(
    State(state): State<AppState>,
    session: Session,
    Path((raw_category, raw_word)): Path<(String, String)>,
    Query(flash): Query<Flash>,
) -> AppResult<Response> {
    let word = match resolve(&state, &raw_category, &raw_word).await? {
        Ok(word) => word,
        Err(redirect) => return Ok(redirect),
    };

    let draft = match &session.data().edit_word_draft {
        Some((id, draft)) if *id == word.id => draft.clone(),
        _ => form_from_entry(&word),
    };
    let categories = category_service::list_categories(&state.db).await?;
    let page = page(&state, &session, flash).await?;
    Ok(render(&WordTemplate { page, word, categories, draft })?.into_response())
}

/// 2. Edit submission. The word may move to another category, so success
/// redirects to its new address.
pub async fn edit_word(
    State(state): State<AppState>,
    mut session: Session,
    Path((raw_category, raw_word)): Path<(String, String)>,
    Form(form): Form<WordForm>,
) -> AppResult<Response> {
    let word = match resolve(&state, &raw_category, &raw_word).await? {
        Ok(word) => word,
        Err(redirect) => return Ok(redirect),
    };
    let back = format!("/words/{}/{}", word.category_id, word.id);

    if !session.is_authenticated() {
        return Ok(with_error(&back, &AppError::NotAuthenticated).into_response());
    }
    session.data_mut().edit_word_draft = Some((word.id, form.normalized()));

    let redirect = match word_service::edit_word(&state.db, session.user(), word.id, &form).await {
        Ok(edited) => {
            session.data_mut().edit_word_draft = None;
            with_message(&format!("/words/{}/{}", edited.category_id, edited.id), "Word edited")
        }
        Err(e) => error_redirect(&back, e)?,
    };
    let jar = session.commit().await;
    Ok((jar, redirect).into_response())
}

/// 3. Teacher only: confirmation prompt before a word is removed.
pub async fn confirm_remove_word(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    if !auth_service::is_teacher(&state.db, session.user()).await? {
        return Ok(with_error("/", &"You do not have permission to remove words").into_response());
    }

    let word = match parse_id(&raw_id) {
        Some(id) => word_service::find_word(&state.db, id).await,
        None => Err(AppError::WordNotFound),
    };
    match word {
        Ok(word) => {
            let page = page(&state, &session, Flash::default()).await?;
            Ok(render(&ConfirmWordTemplate { page, word })?.into_response())
        }
        Err(e) => Ok(error_redirect("/", e)?.into_response()),
    }
}

/// 4. Teacher only: removes the word and every saved-word row pointing at it.
pub async fn remove_word(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(with_error("/", &AppError::WordNotFound).into_response());
    };

    match word_service::delete_word(&state.db, session.user(), id).await {
        Ok(word) => Ok(with_message(&format!("/category/{}", word.category_id), "Word removed").into_response()),
        Err(AppError::Forbidden) => {
            Ok(with_error("/", &"You do not have permission to remove words").into_response())
        }
        Err(e) => Ok(error_redirect("/", e)?.into_response()),
    }
}
