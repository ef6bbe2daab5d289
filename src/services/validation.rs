//! Input checks shared by the services. Each check returns the cleaned value
//! or a message suitable for `fieldErrors`.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;
// bcrypt ignores input past 72 bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Collects per-field failures so one response reports all of them.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the failure under `field` and yields the value on success.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.entry(field.to_string()).or_insert(message);
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", Some(self.errors)))
        }
    }
}

pub fn required(value: Option<&str>, what: &str) -> Result<String, String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(format!("{} is required", what)),
    }
}

pub fn validate_name(name: Option<&str>) -> Result<String, String> {
    let name = required(name, "Name")?;
    if name.chars().count() > 120 {
        return Err("Name must be at most 120 characters".to_string());
    }
    Ok(name)
}

pub fn validate_email_format(email: Option<&str>) -> Result<String, String> {
    let email = required(email, "Email")?;

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err("Email format is invalid".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Email format is invalid".to_string());
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err("Email format is invalid".to_string());
    }

    Ok(email)
}

pub fn validate_password(password: Option<&str>) -> Result<String, String> {
    let password = password.unwrap_or_default();

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        ));
    }
    Ok(password.to_string())
}

pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            Err("Start date must not be after end date".to_string())
        }
        _ => Ok(()),
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO-8601 timestamp, keeping the date part.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let date = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid date '{}'", s)))
        }
    }
}
