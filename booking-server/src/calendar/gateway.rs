//! Calendar gateway trait and error taxonomy

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use shared::{CalendarEventData, EventDraft, TimeWindow};

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    /// La credencial fue rechazada al renovar el token
    #[error("calendar credential rejected: {0}")]
    AuthExpired(String),

    #[error("calendar event not found: {0}")]
    NotFound(String),

    /// El proveedor rechazó la operación
    #[error("calendar request rejected: {0}")]
    Remote(String),

    #[error("calendar transport error: {0}")]
    Transport(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operaciones sobre el calendario remoto.
///
/// `credential` es el refresh token del negocio; la renovación del
/// access token es transparente para el llamador. Cada llamada se
/// intenta a lo sumo una vez por invocación de la máquina de estados
/// (sin loops de retry).
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Events overlapping the window, with transparency/cancellation
    /// and resource-tag metadata
    async fn list_events(
        &self,
        credential: &str,
        window: TimeWindow,
    ) -> GatewayResult<Vec<CalendarEventData>>;

    /// Create an event, returning the remote event id
    async fn insert_event(&self, credential: &str, draft: &EventDraft) -> GatewayResult<String>;

    /// Move an existing event to a new slot
    async fn patch_event_time(
        &self,
        credential: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> GatewayResult<()>;

    async fn delete_event(&self, credential: &str, event_id: &str) -> GatewayResult<()>;
}
