//! Operation error codes shared between server and clients
//!
//! Codes are stable wire identifiers; the frontend maps them to
//! localized messages. The `message` field carries technical detail for
//! logs, never provider payloads.

use serde::{Deserialize, Serialize};

/// Error codes for booking operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingErrorCode {
    /// Business has no calendar credential configured
    IntegrationMissing,
    /// Calendar credential was rejected (refresh failed)
    IntegrationExpired,
    /// Deferred-commit found the slot already taken
    SlotConflict,
    /// Malformed input, rejected before any external call
    ValidationFailed,
    AppointmentNotFound,
    BusinessNotFound,
    /// Remote calendar write rejected where it must precede local persistence
    RemoteWriteFailed,
    /// Operation not valid for the appointment's current state
    InvalidOperation,
    InternalError,
}

/// Discriminated error payload for operation responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    pub code: BookingErrorCode,
    pub message: String,
}

impl OperationError {
    pub fn new(code: BookingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_wire_format() {
        assert_eq!(
            serde_json::to_string(&BookingErrorCode::SlotConflict).unwrap(),
            "\"SLOT_CONFLICT\""
        );
        assert_eq!(
            serde_json::to_string(&BookingErrorCode::IntegrationMissing).unwrap(),
            "\"INTEGRATION_MISSING\""
        );
    }
}
