use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::{error_redirect, page, parse_id, redirect_with, render, with_error, with_message, Flash};
use crate::error::{AppError, AppResult};
use crate::models::category::CreateCategoryForm;
use crate::models::word::WordForm;
use crate::services::{auth_service, category_service, word_service};
use crate::session::Session;
use crate::views::{AddCategoryTemplate, CategoryTemplate, ConfirmCategoryTemplate};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AddCategoryQuery {
    pub error: Option<String>,
    pub message: Option<String>,
    pub similar: Option<String>,
}

/// 1. Category page: the words in it and the add-word form.
pub async fn category_page(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
    Query(flash): Query<Flash>,
) -> AppResult<Response> {
    let category = match parse_id(&raw_id) {
        Some(id) => category_service::find_category(&state.db, id).await,
        None => Err(AppError::CategoryNotFound),
    };
    let category = match category {
        Ok(category) => category,
        Err(e) => return Ok(error_redirect("/", e)?.into_response()),
    };

    let words = word_service::words_in_category(&state.db, category.id).await?;
    let draft = session.data().new_word_draft.clone().unwrap_or_default();
    let page = page(&state, &session, flash).await?;
    Ok(render(&CategoryTemplate { page, category, words, draft })?.into_response())
}

/// 2. Add-word submission from the category page.
pub async fn add_word(
    State(state): State<AppState>,
    mut session: Session,
    Path(raw_id): Path<String>,
    Form(form): Form<WordForm>,
) -> AppResult<Response> {
    let Some(category_id) = parse_id(&raw_id) else {
        return Ok(with_error("/", &AppError::CategoryNotFound).into_response());
    };
    let back = format!("/category/{category_id}");

    if !session.is_authenticated() {
        return Ok(with_error(&back, &AppError::NotAuthenticated).into_response());
    }
    session.data_mut().new_word_draft = Some(form.normalized());

    let result = word_service::add_word(&state.db, session.user(), category_id, &form).await;
    let redirect = match result {
        Ok(_) => {
            session.data_mut().new_word_draft = None;
            with_message(&back, "Word added")
        }
        Err(AppError::CategoryNotFound) => with_error("/", &AppError::CategoryNotFound),
        Err(e) => error_redirect(&back, e)?,
    };
    let jar = session.commit().await;
    Ok((jar, redirect).into_response())
}

/// 3. Teacher only: add-category form.
pub async fn add_category_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AddCategoryQuery>,
) -> AppResult<Response> {
    if !auth_service::is_teacher(&state.db, session.user()).await? {
        return Ok(with_error("/", &"You do not have permission to add categories").into_response());
    }

    let draft = session.data().category_draft.clone().unwrap_or_default();
    let similar = query.similar.is_some();
    let flash = Flash {
        error: query.error,
        message: query.message,
    };
    let page = page(&state, &session, flash).await?;
    Ok(render(&AddCategoryTemplate { page, draft, similar })?.into_response())
}

/// 4. Teacher only: add-category submission.
///
/// A similar existing name sends the user back with a warning; the form then
/// carries `acknowledge` so the next submit adds it anyway.
pub async fn add_category(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<CreateCategoryForm>,
) -> AppResult<Response> {
    session.data_mut().category_draft = Some(form.category.trim().to_string());

    let result =
        category_service::add_category(&state.db, session.user(), &form.category, form.acknowledged()).await;
    let redirect = match result {
        Ok(_) => {
            session.data_mut().category_draft = None;
            with_message("/addcategory", "Category added")
        }
        Err(AppError::Forbidden) => with_error("/", &"You do not have permission to add categories"),
        Err(e @ AppError::SimilarCategory { .. }) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("error", &e.to_string())
                .append_pair("similar", "1")
                .finish();
            Redirect::to(&format!("/addcategory?{query}"))
        }
        Err(e) => error_redirect("/addcategory", e)?,
    };
    let jar = session.commit().await;
    Ok((jar, redirect).into_response())
}

/// 5. Teacher only: confirmation prompt before a category is removed.
pub async fn confirm_remove_category(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    if !auth_service::is_teacher(&state.db, session.user()).await? {
        return Ok(with_error("/", &"You do not have permission to remove categories").into_response());
    }

    let category = match parse_id(&raw_id) {
        Some(id) => category_service::find_category(&state.db, id).await,
        None => Err(AppError::CategoryNotFound),
    };
    match category {
        Ok(category) => {
            let page = page(&state, &session, Flash::default()).await?;
            Ok(render(&ConfirmCategoryTemplate { page, category })?.into_response())
        }
        Err(e) => Ok(error_redirect("/", e)?.into_response()),
    }
}

/// 6. Teacher only: removes the category, its words and their saved-word rows.
pub async fn remove_category(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(with_error("/", &AppError::CategoryNotFound).into_response());
    };

    match category_service::delete_category(&state.db, session.user(), id).await {
        Ok(category) => Ok(redirect_with(
            "/",
            "message",
            &format!("Category {} removed", category.category_name),
        )
        .into_response()),
        Err(AppError::Forbidden) => {
            Ok(with_error("/", &"You do not have permission to remove categories").into_response())
        }
        Err(e) => Ok(error_redirect("/", e)?.into_response()),
    }
}
