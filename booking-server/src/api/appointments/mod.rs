//! Gestión de turnos (panel del operador)
//!
//! | Ruta | Método | Descripción |
//! |------|--------|-------------|
//! | /api/businesses/{slug}/appointments | GET | Listado de turnos |
//! | /api/businesses/{slug}/manual | POST | Reserva manual del operador |
//! | /api/businesses/{slug}/block | POST | Bloqueo de agenda |
//! | /api/appointments/{id}/approve | POST | Aprobación de solicitud |
//! | /api/appointments/{id}/deposit | POST | Registro de seña pagada |
//! | /api/appointments/{id}/reschedule | POST | Reprogramación |
//! | /api/appointments/{id}/cancel | POST | Cancelación |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/businesses/{slug}/appointments",
            get(handler::list),
        )
        .route("/api/businesses/{slug}/manual", post(handler::manual))
        .route("/api/businesses/{slug}/block", post(handler::block))
        .route("/api/appointments/{id}/approve", post(handler::approve))
        .route("/api/appointments/{id}/deposit", post(handler::deposit))
        .route(
            "/api/appointments/{id}/reschedule",
            post(handler::reschedule),
        )
        .route("/api/appointments/{id}/cancel", post(handler::cancel))
}
