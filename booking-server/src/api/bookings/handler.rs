//! Booking submission handler

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use shared::{BookingRequest, SubmitResponse};

/// POST /api/bookings/:slug
///
/// Siempre responde 200 con el envelope discriminado; el frontend
/// decide por `success`/`error.code`.
pub async fn submit(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(request): Json<BookingRequest>,
) -> Json<SubmitResponse> {
    Json(state.manager.submit(&slug, request).await)
}
