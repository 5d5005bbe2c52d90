//! Manejo de errores unificado
//!
//! [`AppError`] es el error de la capa HTTP. Cada variante mapea a un
//! `BookingErrorCode` estable y un status code; el body de error es el
//! mismo envelope discriminado que devuelven las operaciones
//! (`{"success": false, "error": {"code", "message"}}`), así el
//! frontend tiene un único formato de fallo.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::bookings::BookingError;
use crate::db::repository::RepoError;
use shared::{BookingErrorCode, OperationResponse};

/// Error de la capa HTTP
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input malformado (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Error de dominio de una operación de reservas
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Error de base de datos (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Error interno (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type para handlers HTTP
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Status code para cada código de error de dominio
fn booking_status(code: BookingErrorCode) -> StatusCode {
    match code {
        BookingErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        BookingErrorCode::AppointmentNotFound | BookingErrorCode::BusinessNotFound => {
            StatusCode::NOT_FOUND
        }
        BookingErrorCode::SlotConflict => StatusCode::CONFLICT,
        BookingErrorCode::IntegrationMissing | BookingErrorCode::IntegrationExpired => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BookingErrorCode::InvalidOperation => StatusCode::UNPROCESSABLE_ENTITY,
        BookingErrorCode::RemoteWriteFailed => StatusCode::BAD_GATEWAY,
        BookingErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                BookingErrorCode::ValidationFailed,
                msg.clone(),
            ),
            AppError::Booking(err) => {
                let code = err.code();
                (booking_status(code), code, err.to_string())
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BookingErrorCode::InternalError,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BookingErrorCode::InternalError,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(OperationResponse::error(code, message));
        (status, body).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => {
                AppError::Booking(BookingError::AppointmentNotFound(msg))
            }
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}
