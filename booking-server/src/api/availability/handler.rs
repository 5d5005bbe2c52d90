//! Availability handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::{AppResult, time};
use shared::AvailabilityResponse;

#[derive(Deserialize)]
pub struct DayQuery {
    /// Fecha local del negocio, YYYY-MM-DD
    pub date: String,
    pub resource_id: Option<String>,
}

/// GET /api/availability/:slug?date=YYYY-MM-DD&resource_id=...
pub async fn day(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let date = time::parse_date(&query.date)?;
    let response = state
        .manager
        .availability(&slug, date, query.resource_id.as_deref())
        .await?;
    Ok(Json(response))
}
