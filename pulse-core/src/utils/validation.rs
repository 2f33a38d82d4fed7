//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use serde_json::Value;
use validator::ValidationErrors;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Names: employee name, department, position
pub const MAX_NAME_LEN: usize = 200;

/// Leave reasons, HR comments
pub const MAX_NOTE_LEN: usize = 500;

/// Usernames, phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
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
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Password length rule (8..=128)
pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            shared::ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN} chars)"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}

/// Employee ID format: 2-4 uppercase letters followed by 3-6 digits (e.g. "EMP001", "HR001")
pub fn is_valid_employee_id(id: &str) -> bool {
    let letters = id.chars().take_while(|c| c.is_ascii_uppercase()).count();
    let digits = &id[letters..];
    (2..=4).contains(&letters)
        && (3..=6).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// Convert `validator` errors into a single validation error (first message wins)
pub fn from_validation_errors(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let Some((field, errs)) = fields.first() else {
        return AppError::validation("Validation failed");
    };
    let message = errs
        .first()
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{field} is invalid"));

    let names: Vec<Value> = fields.iter().map(|(f, _)| Value::from(f.to_string())).collect();
    AppError::validation(message).with_detail("fields", names)
}
