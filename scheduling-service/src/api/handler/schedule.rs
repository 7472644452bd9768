use std::sync::Arc;

use axum::{Json, extract::State};
use shared::{responses::ApiResponse, types::Schedule};

use crate::{
    api::state::SchedulingAppState, domain::service::GenerateScheduleRequest,
    error::SchedulingServiceError,
};

#[utoipa::path(
    post,
    path = "/api/v1/schedules/generate",
    tag = "Schedules",
    operation_id = "generate_schedule",
    request_body = GenerateScheduleRequest,
    responses(
        (status = 200, description = "Roster generated", body = ApiResponse<Schedule>),
        (status = 400, description = "Invalid period, holiday or day-off request"),
        (status = 422, description = "No active staff")
    )
)]
#[tracing::instrument(skip(state, req), fields(staff_count = req.staff.len()))]
pub async fn generate(
    State(state): State<Arc<SchedulingAppState>>,
    Json(req): Json<GenerateScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>, SchedulingServiceError> {
    let schedule = state.scheduling_service.generate(req).await?;

    Ok(Json(ApiResponse::ok(schedule)))
}
