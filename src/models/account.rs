use serde::Deserialize;
use sqlx::FromRow;

/// Row of the `Users` table. `password_hash` holds the argon2 PHC string.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Identity stored in the session once a user has logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub account_id: i64,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

impl SessionUser {
    /// Author name written onto dictionary entries, e.g. "Aroha Mere Smith".
    pub fn display_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Account> for SessionUser {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            email: account.email,
            first_name: account.first_name,
            middle_name: account.middle_name,
            last_name: account.last_name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    pub fname: String,
    #[serde(default)]
    pub mname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    /// "teacher" or "student"
    #[serde(default)]
    pub teacher_or_student: String,
}

impl SignupForm {
    pub fn wants_teacher(&self) -> bool {
        self.teacher_or_student.trim().eq_ignore_ascii_case("teacher")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}
