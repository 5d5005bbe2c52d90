//! Operation response envelopes
//!
//! Operations never surface transport errors directly; every outcome is
//! encoded as a discriminated response so the caller can branch on
//! `success` and a stable error code.

use serde::{Deserialize, Serialize};

use crate::calendar::BusyInterval;
use crate::error::{BookingErrorCode, OperationError};

/// Generic operation response (approve, deposit, reschedule, cancel...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl OperationResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(code: BookingErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(OperationError::new(code, message)),
        }
    }
}

/// Response for the public submission path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    /// True when the request awaits manual approval
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl SubmitResponse {
    pub fn accepted(appointment_id: impl Into<String>, pending: bool) -> Self {
        Self {
            success: true,
            pending,
            appointment_id: Some(appointment_id.into()),
            error: None,
        }
    }

    pub fn error(code: BookingErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            pending: false,
            appointment_id: None,
            error: Some(OperationError::new(code, message)),
        }
    }
}

/// Busy intervals for one local day of a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub busy: Vec<BusyInterval>,
    /// IANA timezone the day was resolved in
    pub timezone: String,
    /// Scoping mode the query ran under ("global" or "per_worker")
    pub mode: String,
}
