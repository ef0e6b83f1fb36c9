//! Input validation helpers
//!
//! Centralized text length constants plus the custom checks used by the
//! `validator` derive on request DTOs (password complexity, phone digits).

use validator::{ValidationError, ValidationErrors};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Display names: accounts, store names
pub const MAX_NAME_LEN: usize = 50;

/// Product titles
pub const MAX_TITLE_LEN: usize = 200;

/// Notes, descriptions, report reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Street addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Flatten derive-produced validation errors into one client-facing message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors {
            match &err.message {
                Some(msg) => parts.push(msg.to_string()),
                None => parts.push(format!("{field} is invalid")),
            }
        }
    }
    if parts.is_empty() {
        "Invalid request".to_string()
    } else {
        parts.join("; ")
    }
}

// ── Custom `validator` checks for registration DTOs ─────────────────

/// Passwords need at least 6 chars with one uppercase, one lowercase and one
/// digit (mirrors the registration form on the client).
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.len() >= 6 && password.len() <= MAX_PASSWORD_LEN;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(
            "Password must be at least 6 characters with uppercase, lowercase, and number".into(),
        ))
    }
}

/// Phone numbers: optional leading `+`, 10-15 digits, whitespace ignored.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let cleaned: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if digits.len() >= 10 && digits.len() <= 15 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("Phone number must be 10-15 digits".into()))
    }
}
