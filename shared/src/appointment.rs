//! Appointment entity and booking payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado del turno
///
/// Wire values match the dashboard contract: `pending`,
/// `esperando_deposito`, `confirmado`, `cancelado`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum AppointmentStatus {
    /// Awaiting operator approval
    #[default]
    #[serde(rename = "pending")]
    #[cfg_attr(feature = "db", sqlx(rename = "pending"))]
    Pending,
    /// Approved, waiting for the deposit payment (no calendar event yet)
    #[serde(rename = "esperando_deposito")]
    #[cfg_attr(feature = "db", sqlx(rename = "esperando_deposito"))]
    EsperandoDeposito,
    /// Confirmed and committed on the calendar
    #[serde(rename = "confirmado")]
    #[cfg_attr(feature = "db", sqlx(rename = "confirmado"))]
    Confirmado,
    /// Cancelled (row is kept, never deleted)
    #[serde(rename = "cancelado")]
    #[cfg_attr(feature = "db", sqlx(rename = "cancelado"))]
    Cancelado,
}

impl AppointmentStatus {
    /// Terminal states admit no further transitions (except audit reads)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmado | Self::Cancelado)
    }
}

/// Appointment entity (turno)
///
/// One row per (business, client email); repeated requests from the
/// same client overwrite the row instead of accumulating history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: String,
    pub business_id: String,
    pub client_name: String,
    /// Stored lowercased + trimmed (dedup key)
    pub client_email: String,
    pub client_phone: Option<String>,
    pub message: Option<String>,
    /// JSON array of attachment URLs
    pub photo_urls: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Staff member this appointment is assigned to; None = whole business
    pub resource_id: Option<String>,
    /// Service title as requested by the client
    pub service: String,
    pub status: AppointmentStatus,
    /// Remote calendar event id; non-null only once calendar-committed
    pub event_id: Option<String>,
    /// Set at approval time, not at request time
    pub final_price: f64,
    /// Idempotence guard for the periodic reminder sweep
    pub reminder_sent: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Appointment {
    /// Duration of the appointment; falls back to 1 hour when the
    /// stored timestamps are degenerate (end <= start).
    pub fn duration(&self) -> chrono::Duration {
        let d = self.end_at - self.start_at;
        if d <= chrono::Duration::zero() {
            chrono::Duration::hours(1)
        } else {
            d
        }
    }
}

/// Client-facing booking request (intake path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}
