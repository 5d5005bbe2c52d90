//! Alta pública de solicitudes de turno

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/bookings/{slug}", post(handler::submit))
}
