//! Disponibilidad pública

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/availability/{slug}", get(handler::day))
}
