//! Appointment management handlers
//!
//! Las operaciones devuelven siempre 200 con el envelope discriminado;
//! solo el listado usa status codes de error (vía [`AppResult`]).

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::{Appointment, BookingRequest, OperationResponse};

/// GET /api/businesses/:slug/appointments
pub async fn list(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state.manager.list_appointments(&slug).await?;
    Ok(Json(appointments))
}

#[derive(Deserialize)]
pub struct ManualPayload {
    #[serde(flatten)]
    pub request: BookingRequest,
    #[serde(default)]
    pub final_price: Option<f64>,
}

/// POST /api/businesses/:slug/manual
pub async fn manual(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(payload): Json<ManualPayload>,
) -> Json<OperationResponse> {
    Json(
        state
            .manager
            .manual_book(&slug, payload.request, payload.final_price)
            .await,
    )
}

#[derive(Deserialize)]
pub struct BlockPayload {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /api/businesses/:slug/block
pub async fn block(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(payload): Json<BlockPayload>,
) -> Json<OperationResponse> {
    Json(
        state
            .manager
            .block(
                &slug,
                payload.start_at,
                payload.end_at,
                payload.resource_id,
                payload.reason,
            )
            .await,
    )
}

#[derive(Deserialize, Default)]
pub struct ApprovePayload {
    #[serde(default)]
    pub final_price: Option<f64>,
}

/// POST /api/appointments/:id/approve
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<ApprovePayload>>,
) -> Json<OperationResponse> {
    let final_price = payload.and_then(|Json(p)| p.final_price);
    Json(state.manager.approve(&id, final_price).await)
}

/// POST /api/appointments/:id/deposit
pub async fn deposit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Json<OperationResponse> {
    Json(state.manager.mark_deposit_paid(&id).await)
}

#[derive(Deserialize)]
pub struct ReschedulePayload {
    pub start_at: DateTime<Utc>,
}

/// POST /api/appointments/:id/reschedule
pub async fn reschedule(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ReschedulePayload>,
) -> Json<OperationResponse> {
    Json(state.manager.reschedule(&id, payload.start_at).await)
}

/// POST /api/appointments/:id/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Json<OperationResponse> {
    Json(state.manager.cancel(&id).await)
}
