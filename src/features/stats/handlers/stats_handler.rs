use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireStaff;
use crate::features::stats::dtos::StatisticsDto;
use crate::features::stats::services::StatsService;
use crate::shared::types::ApiResponse;

/// Get aggregate report statistics (staff only)
#[utoipa::path(
    get,
    path = "/statistik",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<StatisticsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff access required")
    ),
    tag = "statistik",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_statistics(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<StatsService>>,
) -> Result<Json<ApiResponse<StatisticsDto>>> {
    let stats = service.summary().await;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
