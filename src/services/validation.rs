//! Field rules for word, category and signup submissions.
//!
//! Everything here is pure: database-backed rules (pair uniqueness, email uniqueness,
//! category similarity against stored names) live in the services that own those tables.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::models::account::SignupForm;
use crate::models::word::WordForm;

pub const MAORI_MAX: usize = 85;
pub const ENGLISH_MAX: usize = 100;
pub const DEFINITION_MAX: usize = 200;
pub const CATEGORY_MAX: usize = 50;
/// Year 0 is the new-entrant year in New Zealand schools.
pub const YEAR_LEVEL_MIN: i64 = 0;
pub const YEAR_LEVEL_MAX: i64 = 10;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 30;
pub const EMAIL_MIN: usize = 6;
pub const EMAIL_MAX: usize = 80;
pub const PASSWORD_MIN: usize = 8;

/// Characters reserved for routing; never allowed in names, terms or category names.
/// Definitions never appear in a path and may use them.
pub const FORBIDDEN_CHARS: &str = r"<>{}[]\/,|";

static FORBIDDEN: Lazy<HashSet<char>> = Lazy::new(|| FORBIDDEN_CHARS.chars().collect());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Maori,
    English,
    Definition,
    YearLevel,
    Category,
    FirstName,
    MiddleName,
    LastName,
    Email,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Maori => "Maori",
            Field::English => "English",
            Field::Definition => "Definition",
            Field::YearLevel => "Year level",
            Field::Category => "Category",
            Field::FirstName => "First name",
            Field::MiddleName => "Middle name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::Password => "Password",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Blank,
    TooLong { max: usize },
    TooShort { min: usize },
    ForbiddenCharacter,
    InvalidNumber,
    OutOfRange { min: i64, max: i64 },
    PasswordMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.reason {
            Reason::Blank => write!(f, "{field} must be filled in"),
            Reason::TooLong { max } => write!(f, "{field} must be {max} characters or less"),
            Reason::TooShort { min } => write!(f, "{field} needs at least {min} characters or more"),
            Reason::ForbiddenCharacter => write!(f, "Invalid characters in {}", field.to_string().to_lowercase()),
            Reason::InvalidNumber => write!(f, "{field} must be a number"),
            Reason::OutOfRange { min, max } => write!(f, "{field} must be between {min} and {max}"),
            Reason::PasswordMismatch => f.write_str("Passwords don't match"),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn contains_forbidden(value: &str) -> bool {
    value.chars().any(|c| FORBIDDEN.contains(&c))
}

/// "farm  animals" -> "Farm Animals"
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn require_filled(field: Field, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, Reason::Blank));
    }
    Ok(())
}

fn require_max_len(field: Field, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::new(field, Reason::TooLong { max }));
    }
    Ok(())
}

fn require_min_len(field: Field, value: &str, min: usize) -> ValidationResult<()> {
    if value.chars().count() < min {
        return Err(ValidationError::new(field, Reason::TooShort { min }));
    }
    Ok(())
}

fn require_clean(field: Field, value: &str) -> ValidationResult<()> {
    if contains_forbidden(value) {
        return Err(ValidationError::new(field, Reason::ForbiddenCharacter));
    }
    Ok(())
}

pub fn parse_year_level(raw: &str) -> ValidationResult<i64> {
    let year_level: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::new(Field::YearLevel, Reason::InvalidNumber))?;
    if !(YEAR_LEVEL_MIN..=YEAR_LEVEL_MAX).contains(&year_level) {
        return Err(ValidationError::new(
            Field::YearLevel,
            Reason::OutOfRange {
                min: YEAR_LEVEL_MIN,
                max: YEAR_LEVEL_MAX,
            },
        ));
    }
    Ok(year_level)
}

/// Checks an already normalized word form and returns the parsed year level.
///
/// Order is blank, number, length, characters so that the first reported
/// problem does not depend on which field happens to come first.
pub fn validate_word(form: &WordForm) -> ValidationResult<i64> {
    let mut text_fields = vec![
        (Field::Maori, form.maori.as_str(), MAORI_MAX),
        (Field::English, form.english.as_str(), ENGLISH_MAX),
        (Field::Definition, form.definition.as_str(), DEFINITION_MAX),
    ];
    if let Some(category) = form.category.as_deref() {
        text_fields.push((Field::Category, category, CATEGORY_MAX));
    }

    for (field, value, _) in &text_fields {
        require_filled(*field, value)?;
    }
    require_filled(Field::YearLevel, &form.year_level)?;

    let year_level = parse_year_level(&form.year_level)?;

    for (field, value, max) in &text_fields {
        require_max_len(*field, value, *max)?;
    }
    for (field, value, _) in text_fields.iter().filter(|(field, ..)| *field != Field::Definition) {
        require_clean(*field, value)?;
    }

    Ok(year_level)
}

pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    require_filled(Field::Category, name)?;
    require_max_len(Field::Category, name, CATEGORY_MAX)?;
    require_clean(Field::Category, name)
}

/// Returns the first existing name that the candidate contains or is contained by,
/// ignoring case. Exact matches are the caller's concern.
pub fn find_similar<'a, I>(candidate: &str, existing: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = candidate.to_lowercase();
    existing.into_iter().find(|name| {
        let name_lower = name.to_lowercase();
        name_lower.contains(&candidate) || candidate.contains(&name_lower)
    })
}

/// Signup rules. Email uniqueness is left to the database constraint.
pub fn validate_signup(form: &SignupForm) -> ValidationResult<()> {
    require_max_len(Field::FirstName, &form.fname, NAME_MAX)?;
    require_max_len(Field::MiddleName, &form.mname, NAME_MAX)?;
    require_max_len(Field::LastName, &form.lname, NAME_MAX)?;
    require_max_len(Field::Email, &form.email, EMAIL_MAX)?;

    require_min_len(Field::FirstName, &form.fname, NAME_MIN)?;
    require_min_len(Field::LastName, &form.lname, NAME_MIN)?;

    require_clean(Field::FirstName, &form.fname)?;
    require_clean(Field::MiddleName, &form.mname)?;
    require_clean(Field::LastName, &form.lname)?;

    require_min_len(Field::Email, &form.email, EMAIL_MIN)?;

    if form.password != form.password2 {
        return Err(ValidationError::new(Field::Password, Reason::PasswordMismatch));
    }
    require_min_len(Field::Password, &form.password, PASSWORD_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(maori: &str, english: &str, year: &str, definition: &str) -> WordForm {
        WordForm {
            maori: maori.to_string(),
            english: english.to_string(),
            year_level: year.to_string(),
            definition: definition.to_string(),
            category: None,
        }
    }

    fn signup() -> SignupForm {
        SignupForm {
            fname: "Jo".into(),
            mname: String::new(),
            lname: "Li".into(),
            email: "a@b.com".into(),
            password: "abcdefgh".into(),
            password2: "abcdefgh".into(),
            teacher_or_student: "student".into(),
        }
    }

    #[test]
    fn valid_word_returns_year_level() {
        assert_eq!(validate_word(&word("kuri", "dog", "3", "a four legged animal")), Ok(3));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let long_maori = "a".repeat(MAORI_MAX + 1);
        let err = validate_word(&word(&long_maori, "dog", "3", "def")).unwrap_err();
        assert_eq!(err, ValidationError::new(Field::Maori, Reason::TooLong { max: MAORI_MAX }));

        let long_def = "d".repeat(DEFINITION_MAX + 1);
        let err = validate_word(&word("kuri", "dog", "3", &long_def)).unwrap_err();
        assert_eq!(err.field, Field::Definition);

        let mut form = word("kuri", "dog", "3", "def");
        form.category = Some("c".repeat(CATEGORY_MAX + 1));
        assert_eq!(validate_word(&form).unwrap_err().field, Field::Category);

        // exactly at the limit is fine
        let at_limit = "e".repeat(ENGLISH_MAX);
        assert!(validate_word(&word("kuri", &at_limit, "3", "def")).is_ok());
    }

    #[test]
    fn year_level_must_be_a_small_integer() {
        let err = validate_word(&word("kuri", "dog", "three", "def")).unwrap_err();
        assert_eq!(err.reason, Reason::InvalidNumber);

        let err = validate_word(&word("kuri", "dog", "11", "def")).unwrap_err();
        assert_eq!(
            err.reason,
            Reason::OutOfRange {
                min: YEAR_LEVEL_MIN,
                max: YEAR_LEVEL_MAX
            }
        );
        assert_eq!(err.to_string(), "Year level must be between 0 and 10");

        let err = validate_word(&word("kuri", "dog", "-1", "def")).unwrap_err();
        assert_eq!(err.field, Field::YearLevel);

        assert_eq!(validate_word(&word("kuri", "dog", "10", "def")), Ok(10));
        assert_eq!(validate_word(&word("kuri", "dog", "0", "def")), Ok(0));
    }

    #[test]
    fn blank_fields_are_rejected_before_anything_else() {
        let err = validate_word(&word("   ", "dog", "abc", "def")).unwrap_err();
        assert_eq!(err, ValidationError::new(Field::Maori, Reason::Blank));

        let err = validate_word(&word("kuri", "dog", "", "def")).unwrap_err();
        assert_eq!(err, ValidationError::new(Field::YearLevel, Reason::Blank));
    }

    #[test]
    fn reserved_characters_are_rejected() {
        for c in FORBIDDEN_CHARS.chars() {
            let maori = format!("ku{c}ri");
            let err = validate_word(&word(&maori, "dog", "2", "def")).unwrap_err();
            assert_eq!(err.reason, Reason::ForbiddenCharacter, "char {c:?}");
        }
        assert!(validate_word(&word("kūri", "dog", "2", "a pet")).is_ok());
    }

    #[test]
    fn definitions_may_use_punctuation() {
        assert_eq!(validate_word(&word("kuri", "dog", "3", "a pet, loyal")), Ok(3));
        assert_eq!(
            validate_word(&word("kuri", "dog", "3", "see also [ngeru] / cat")),
            Ok(3)
        );

        let mut form = word("kuri", "dog", "3", "a pet, loyal");
        form.category = Some("Pets, Farm".into());
        assert_eq!(
            validate_word(&form).unwrap_err(),
            ValidationError::new(Field::Category, Reason::ForbiddenCharacter)
        );
    }

    #[test]
    fn category_name_rules() {
        assert!(validate_category_name("Animals").is_ok());
        assert_eq!(validate_category_name(" ").unwrap_err().reason, Reason::Blank);
        assert_eq!(
            validate_category_name(&"x".repeat(CATEGORY_MAX + 1)).unwrap_err().reason,
            Reason::TooLong { max: CATEGORY_MAX }
        );
        assert_eq!(
            validate_category_name("Food/Drink").unwrap_err().reason,
            Reason::ForbiddenCharacter
        );
    }

    #[test]
    fn similarity_works_in_both_directions() {
        let existing = ["Animal", "Colours"];
        assert_eq!(find_similar("Animals", existing), Some("Animal"));
        assert_eq!(find_similar("colour", existing), Some("Colours"));
        assert_eq!(find_similar("Weather", existing), None);
    }

    #[test]
    fn title_case_normalizes_words() {
        assert_eq!(title_case("  farm   ANIMALS "), "Farm Animals");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn signup_rules() {
        assert!(validate_signup(&signup()).is_ok());

        let mut form = signup();
        form.fname = "J".into();
        assert_eq!(
            validate_signup(&form).unwrap_err(),
            ValidationError::new(Field::FirstName, Reason::TooShort { min: NAME_MIN })
        );

        let mut form = signup();
        form.lname = "L|i".into();
        assert_eq!(validate_signup(&form).unwrap_err().reason, Reason::ForbiddenCharacter);

        let mut form = signup();
        form.email = "a@b.c".into();
        assert_eq!(validate_signup(&form).unwrap_err().field, Field::Email);

        let mut form = signup();
        form.password2 = "abcdefgi".into();
        assert_eq!(validate_signup(&form).unwrap_err().reason, Reason::PasswordMismatch);

        let mut form = signup();
        form.password = "short".into();
        form.password2 = "short".into();
        assert_eq!(
            validate_signup(&form).unwrap_err(),
            ValidationError::new(Field::Password, Reason::TooShort { min: PASSWORD_MIN })
        );
    }

    #[test]
    fn messages_are_readable() {
        let err = ValidationError::new(Field::YearLevel, Reason::InvalidNumber);
        assert_eq!(err.to_string(), "Year level must be a number");
        let err = ValidationError::new(Field::Maori, Reason::ForbiddenCharacter);
        assert_eq!(err.to_string(), "Invalid characters in maori");
    }
}
