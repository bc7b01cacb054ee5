use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::{error_redirect, page, render, with_message, Flash};
use crate::error::AppResult;
use crate::models::account::{LoginForm, SignupForm};
use crate::services::auth_service;
use crate::session::{Session, SignupDraft};
use crate::views::{LoginTemplate, SignupTemplate};
use crate::AppState;

/// 1. Signup form.
pub async fn signup_page(
    State(state): State<AppState>,
    session: Session,
    Query(flash): Query<Flash>,
) -> AppResult<Response> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }
    let draft = session.data().signup_draft.clone().unwrap_or_default();
    let page = page(&state, &session, flash).await?;
    Ok(render(&SignupTemplate { page, draft })?.into_response())
}

/// 2. Signup submission. Entered names and email survive a failed attempt.
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let normalized = auth_service::normalize_signup(&form);
    session.data_mut().signup_draft = Some(SignupDraft {
        fname: normalized.fname,
        mname: normalized.mname,
        lname: normalized.lname,
        email: normalized.email,
    });

    match auth_service::signup(&state.db, &form).await {
        Ok(_) => {
            session.data_mut().signup_draft = None;
            let jar = session.commit().await;
            Ok((jar, with_message("/login", "Account created, please log in")).into_response())
        }
        Err(e) => {
            let redirect = error_redirect("/signup", e)?;
            let jar = session.commit().await;
            Ok((jar, redirect).into_response())
        }
    }
}

/// 3. Login form.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(flash): Query<Flash>,
) -> AppResult<Response> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }
    let email = session.data().login_email.clone().unwrap_or_default();
    let page = page(&state, &session, flash).await?;
    Ok(render(&LoginTemplate { page, email })?.into_response())
}

/// 4. Login submission. On success the identity is stored under a fresh session id.
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    session.data_mut().login_email = Some(form.email.trim().to_lowercase());

    match auth_service::authenticate(&state.db, &form.email, &form.password).await {
        Ok(user) => {
            session.renew().await;
            let data = session.data_mut();
            data.user = Some(user);
            data.login_email = None;
            data.signup_draft = None;
            let jar = session.commit().await;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => {
            let redirect = error_redirect("/login", e)?;
            let jar = session.commit().await;
            Ok((jar, redirect).into_response())
        }
    }
}

/// 5. Logout clears everything kept for this session.
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Some(user) = session.user() {
        tracing::info!("<<< Account {} logged out", user.account_id);
    }
    let jar = session.clear().await;
    (jar, with_message("/", "See you next time!"))
}
