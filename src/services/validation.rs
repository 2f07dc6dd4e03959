use std::collections::HashMap;

use super::ServiceError;

/// Collects per-field messages, reported together as one validation error
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Non-blank and at most `max_len` characters
    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.add(field, "This field is required");
        } else if value.chars().count() > max_len {
            self.add(field, format!("Must be at most {} characters", max_len));
        }
    }

    pub fn into_result(self, message: &str) -> Result<(), ServiceError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::validation(message, self.0))
        }
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Basic shape check: one '@', non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(format!("Email must be at most {} characters", MAX_EMAIL_LENGTH));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }
    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}
