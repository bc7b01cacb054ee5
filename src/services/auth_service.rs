use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use rand::rngs::OsRng;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::account::{Account, SessionUser, SignupForm};
use crate::services::validation::{self, title_case};

/// Trims and title-cases names, lowercases the email and trims passwords.
pub fn normalize_signup(form: &SignupForm) -> SignupForm {
    SignupForm {
        fname: title_case(form.fname.trim()),
        mname: title_case(form.mname.trim()),
        lname: title_case(form.lname.trim()),
        email: form.email.trim().to_lowercase(),
        password: form.password.trim().to_string(),
        password2: form.password2.trim().to_string(),
        teacher_or_student: form.teacher_or_student.clone(),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("!!! Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// 1. Self-service registration. Returns the new account id.
///
/// The account row and the optional teacher marker are written in one transaction.
pub async fn signup(pool: &SqlitePool, form: &SignupForm) -> AppResult<i64> {
    let form = normalize_signup(form);
    validation::validate_signup(&form)?;
    tracing::info!(">>> Signup request: email={}, teacher={}", form.email, form.wants_teacher());

    let password_hash = hash_password(&form.password)?;

    let mut tx = pool.begin().await?;
    let inserted = sqlx::query(
        "INSERT INTO Users (first_name, middle_name, last_name, email, password) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&form.fname)
    .bind(&form.mname)
    .bind(&form.lname)
    .bind(&form.email)
    .bind(&password_hash)
    .execute(&mut *tx)
    .await;

    let account_id = match inserted {
        Ok(res) => res.last_insert_rowid(),
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!("--- Signup refused, email already used: {}", form.email);
            return Err(AppError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    if form.wants_teacher() {
        sqlx::query("INSERT INTO Teachers (user_id) VALUES (?)")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!("<<< Account created: id={}, email={}", account_id, form.email);
    Ok(account_id)
}

/// 2. Credential check. The caller stores the returned identity in the session.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> AppResult<SessionUser> {
    let email = email.trim().to_lowercase();
    tracing::info!(">>> Login attempt: email={}", email);

    let account = sqlx::query_as::<_, Account>(
        r#"SELECT id, first_name, middle_name, last_name, email, password AS password_hash
           FROM Users WHERE email = ?"#,
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some(account) = account else {
        tracing::warn!("--- Login failed: email [{}] not found", email);
        return Err(AppError::AccountNotFound);
    };

    if !verify_password(password.trim(), &account.password_hash) {
        tracing::warn!("--- Login failed: wrong password for [{}]", email);
        return Err(AppError::BadCredentials);
    }

    tracing::info!("<<< Login succeeded: id={}", account.id);
    Ok(SessionUser::from(account))
}

/// 3. Teacher privilege lookup. Anonymous callers are never teachers.
pub async fn is_teacher(pool: &SqlitePool, user: Option<&SessionUser>) -> AppResult<bool> {
    let Some(user) = user else {
        return Ok(false);
    };

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Teachers WHERE user_id = ?")
        .bind(user.account_id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

pub fn require_user(user: Option<&SessionUser>) -> AppResult<&SessionUser> {
    user.ok_or(AppError::NotAuthenticated)
}

/// Resolves the caller as a teacher or fails with `Forbidden`.
pub async fn require_teacher<'a>(
    pool: &SqlitePool,
    user: Option<&'a SessionUser>,
) -> AppResult<&'a SessionUser> {
    match user {
        Some(user) if is_teacher(pool, Some(user)).await? => Ok(user),
        Some(user) => {
            tracing::warn!("--- Teacher action refused for account {}", user.account_id);
            Err(AppError::Forbidden)
        }
        None => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::{Field, Reason};
    use crate::test_utils::{setup_test_db, signup_form};

    #[tokio::test]
    async fn signup_stores_one_hashed_account() {
        let pool = setup_test_db().await;
        let id = signup(&pool, &signup_form("Jo", "Li", "a@b.com", false)).await.unwrap();

        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, password FROM Users")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, id);
        assert_ne!(rows[0].1, "abcdefgh");
        assert!(rows[0].1.starts_with("$argon2"));
        assert!(!is_teacher(&pool, Some(&authenticate(&pool, "a@b.com", "abcdefgh").await.unwrap()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn signup_normalizes_names_and_email() {
        let pool = setup_test_db().await;
        let mut form = signup_form("aroha", "smith", "  Aroha@Example.COM ", true);
        form.mname = " mere ".into();
        signup(&pool, &form).await.unwrap();

        let user = authenticate(&pool, "aroha@example.com", "abcdefgh").await.unwrap();
        assert_eq!(user.first_name, "Aroha");
        assert_eq!(user.display_name(), "Aroha Mere Smith");
        assert!(is_teacher(&pool, Some(&user)).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let pool = setup_test_db().await;
        signup(&pool, &signup_form("Jo", "Li", "a@b.com", false)).await.unwrap();
        let err = signup(&pool, &signup_form("Ana", "Wu", "A@B.com", true)).await.unwrap_err();
        assert!(matches!(err, AppError::EmailTaken));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Teachers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn invalid_signup_writes_nothing() {
        let pool = setup_test_db().await;
        let mut form = signup_form("Jo", "Li", "a@b.com", false);
        form.password2 = "different".into();
        let err = signup(&pool, &form).await.unwrap_err();
        match err {
            AppError::Validation(v) => {
                assert_eq!(v.field, Field::Password);
                assert_eq!(v.reason, Reason::PasswordMismatch);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn authenticate_distinguishes_missing_and_wrong_password() {
        let pool = setup_test_db().await;
        signup(&pool, &signup_form("Jo", "Li", "a@b.com", false)).await.unwrap();

        assert!(matches!(
            authenticate(&pool, "nobody@b.com", "abcdefgh").await,
            Err(AppError::AccountNotFound)
        ));
        assert!(matches!(
            authenticate(&pool, "a@b.com", "wrongpass").await,
            Err(AppError::BadCredentials)
        ));
        let user = authenticate(&pool, " A@B.COM ", "abcdefgh").await.unwrap();
        assert_eq!(user.email, "a@b.com");
    }

    #[tokio::test]
    async fn anonymous_is_never_teacher() {
        let pool = setup_test_db().await;
        assert!(!is_teacher(&pool, None).await.unwrap());
        assert!(matches!(require_teacher(&pool, None).await, Err(AppError::Forbidden)));
        assert!(matches!(require_user(None), Err(AppError::NotAuthenticated)));
    }
}
