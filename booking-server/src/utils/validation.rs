//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are
//! applied here before any row write or external call.

use crate::bookings::BookingError;

// ── Text length limits ──────────────────────────────────────────────

/// Client and staff names, service titles
pub const MAX_NAME_LEN: usize = 200;

/// Free-text message attached to a booking request
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, resource ids, payment aliases
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Photo attachment URLs
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers (booking operations) ─────────────────────────

/// Validate a required string (non-empty + max length)
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<(), BookingError> {
    if value.trim().is_empty() {
        return Err(BookingError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    if value.len() > max_len {
        return Err(BookingError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate an optional string, if present, against the length limit
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), BookingError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(BookingError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Minimal email shape check; the dedup key only needs trim+lowercase,
/// this just rejects obvious garbage before it becomes a row key.
pub fn validate_email(value: &str) -> Result<(), BookingError> {
    validate_required_text(value, "client_email", MAX_EMAIL_LEN)?;
    let trimmed = value.trim();
    if !trimmed.contains('@') || trimmed.starts_with('@') || trimmed.ends_with('@') {
        return Err(BookingError::Validation(format!(
            "Invalid email address: {trimmed}"
        )));
    }
    Ok(())
}
