use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};

use super::{error_redirect, page, parse_id, render, with_error, with_message, Flash};
use crate::error::{AppError, AppResult};
use crate::services::saved_word_service;
use crate::session::Session;
use crate::views::SavedTemplate;
use crate::AppState;

/// 1. Saves a word and goes back to the category it was saved from.
pub async fn save_word(
    State(state): State<AppState>,
    session: Session,
    Path((raw_category, raw_word)): Path<(String, String)>,
) -> AppResult<Response> {
    let Some(category_id) = parse_id(&raw_category) else {
        return Ok(with_error("/", &AppError::CategoryNotFound).into_response());
    };
    let back = format!("/category/{category_id}");

    match saved_word_service::save_word(&state.db, session.user(), &raw_word).await {
        Ok(()) => Ok(with_message(&back, "Word saved").into_response()),
        Err(e) => Ok(error_redirect(&back, e)?.into_response()),
    }
}

/// 2. Removes a saved word.
pub async fn remove_saved_word(
    State(state): State<AppState>,
    session: Session,
    Path(raw_word): Path<String>,
) -> AppResult<Response> {
    if !session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    match saved_word_service::unsave_word(&state.db, session.user(), &raw_word).await {
        Ok(()) => Ok(with_message("/saved", "Word removed from saved words").into_response()),
        Err(e) => Ok(error_redirect("/saved", e)?.into_response()),
    }
}

/// 3. The logged-in user's saved words.
pub async fn saved_page(
    State(state): State<AppState>,
    session: Session,
    Query(flash): Query<Flash>,
) -> AppResult<Response> {
    if !session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let saved = saved_word_service::list_saved(&state.db, session.user()).await?;
    let page = page(&state, &session, flash).await?;
    Ok(render(&SavedTemplate { page, saved })?.into_response())
}
