use std::sync::Arc;

use axum::{Json, extract::State};
use shared::responses::ApiResponse;

use crate::{
    api::state::SchedulingAppState,
    domain::service::{CarryoverResolution, ResolveCarryoverRequest},
    error::SchedulingServiceError,
};

#[utoipa::path(
    post,
    path = "/api/v1/carryover/resolve",
    tag = "Carryover",
    operation_id = "resolve_carryover",
    request_body = ResolveCarryoverRequest,
    responses(
        (status = 200, description = "Rows mapped and constraints derived", body = ApiResponse<CarryoverResolution>),
        (status = 400, description = "Override points at an unknown staff member or row"),
        (status = 422, description = "No active staff")
    )
)]
#[tracing::instrument(skip(state, req), fields(rows = req.rows.len()))]
pub async fn resolve(
    State(state): State<Arc<SchedulingAppState>>,
    Json(req): Json<ResolveCarryoverRequest>,
) -> Result<Json<ApiResponse<CarryoverResolution>>, SchedulingServiceError> {
    let resolution = state.scheduling_service.resolve_carryover(req)?;

    Ok(Json(ApiResponse::ok(resolution)))
}
