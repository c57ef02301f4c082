//! Field rules for user input.
//!
//! Every function returns the normalized value so callers store exactly what
//! was checked.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 254;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;
pub const AGE_MIN: i32 = 1;
pub const AGE_MAX: i32 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid length for {field}: expected {min}-{max} characters, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("invalid email address")]
    InvalidEmail,

    #[error("age must be between {min} and {max}, got {actual}")]
    AgeOutOfRange { min: i32, max: i32, actual: i32 },
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::InvalidLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

pub fn name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    check_len("name", name, NAME_MIN, NAME_MAX)?;
    Ok(name.to_string())
}

/// Emails are compared case-insensitively: they are stored lower-cased.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let email = normalize_email(raw);
    if email.chars().count() > EMAIL_MAX || !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn password(raw: &str) -> Result<(), ValidationError> {
    check_len("password", raw, PASSWORD_MIN, PASSWORD_MAX)
}

pub fn age(value: i32) -> Result<i32, ValidationError> {
    if !(AGE_MIN..=AGE_MAX).contains(&value) {
        return Err(ValidationError::AgeOutOfRange {
            min: AGE_MIN,
            max: AGE_MAX,
            actual: value,
        });
    }
    Ok(value)
}
