//! Booking operation error taxonomy
//!
//! Los errores internos de gateway/repositorio se capturan en el borde
//! de cada operación y se mapean acá; el mensaje visible identifica el
//! paso que falló sin filtrar payloads del proveedor.

use thiserror::Error;

use crate::calendar::GatewayError;
use crate::db::repository::RepoError;
use crate::notify::NotifyError;
use shared::{BookingErrorCode, OperationResponse};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("business has no calendar integration")]
    IntegrationMissing,

    #[error("calendar credential expired: {0}")]
    IntegrationExpired(String),

    /// El slot objetivo dejó de estar libre (detectado en el commit
    /// diferido); el estado local no cambió
    #[error("requested slot is no longer free")]
    SlotConflict,

    #[error("{0}")]
    Validation(String),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("business not found: {0}")]
    BusinessNotFound(String),

    /// Escritura remota rechazada donde debe preceder a la persistencia
    /// local (reschedule, creación de evento en approve sin seña)
    #[error("calendar write rejected: {0}")]
    RemoteWriteFailed(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl BookingError {
    pub fn code(&self) -> BookingErrorCode {
        match self {
            BookingError::IntegrationMissing => BookingErrorCode::IntegrationMissing,
            BookingError::IntegrationExpired(_) => BookingErrorCode::IntegrationExpired,
            BookingError::SlotConflict => BookingErrorCode::SlotConflict,
            BookingError::Validation(_) => BookingErrorCode::ValidationFailed,
            BookingError::AppointmentNotFound(_) => BookingErrorCode::AppointmentNotFound,
            BookingError::BusinessNotFound(_) => BookingErrorCode::BusinessNotFound,
            BookingError::RemoteWriteFailed(_) => BookingErrorCode::RemoteWriteFailed,
            BookingError::InvalidOperation(_) => BookingErrorCode::InvalidOperation,
            BookingError::Internal(_) => BookingErrorCode::InternalError,
        }
    }

    /// Discriminated failure response for this error
    pub fn to_response(&self) -> OperationResponse {
        OperationResponse::error(self.code(), self.to_string())
    }
}

impl From<RepoError> for BookingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => BookingError::AppointmentNotFound(msg),
            RepoError::Database(msg) => BookingError::Internal(msg),
        }
    }
}

impl From<GatewayError> for BookingError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::AuthExpired(msg) => BookingError::IntegrationExpired(msg),
            GatewayError::NotFound(msg) => {
                BookingError::RemoteWriteFailed(format!("event not found: {msg}"))
            }
            GatewayError::Remote(msg) => BookingError::RemoteWriteFailed(msg),
            GatewayError::Transport(msg) => BookingError::RemoteWriteFailed(msg),
        }
    }
}

impl From<NotifyError> for BookingError {
    fn from(err: NotifyError) -> Self {
        // Las notificaciones son best-effort; si un error llega hasta
        // acá es un bug del dispatcher, no del envío.
        BookingError::Internal(err.to_string())
    }
}
