//! Rutas HTTP
//!
//! # Estructura
//!
//! - [`health`] - health check
//! - [`availability`] - consulta pública de disponibilidad
//! - [`bookings`] - alta pública de solicitudes
//! - [`appointments`] - gestión de turnos (panel del operador)

pub mod appointments;
pub mod availability;
pub mod bookings;
pub mod health;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(availability::router())
        .merge(bookings::router())
        .merge(appointments::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
