use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireStaff, RequireStudent};
use crate::features::auth::models::CurrentUser;
use crate::features::reports::dtos::{
    CreateReportDto, ReportResponseDto, StatusHistoryDto, StatusUpdateDto,
};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta};

/// A student may only see their own report; staff may see any.
fn ensure_can_view(user: &CurrentUser, report: &Report) -> Result<()> {
    if user.is_staff() || report.user_id == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Submit a new damage report
#[utoipa::path(
    post,
    path = "/laporan",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report submitted successfully", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Student access required")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_report(
    RequireStudent(user): RequireStudent,
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.create(dto, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ReportResponseDto::from(report)),
            None,
            None,
        )),
    ))
}

/// List the authenticated user's own reports
#[utoipa::path(
    get,
    path = "/laporan/me",
    responses(
        (status = 200, description = "Reports retrieved successfully", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_my_reports(
    user: CurrentUser,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_for_user(user.id).await?;
    let total = reports.len() as i64;
    let data: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// List every report (staff only)
#[utoipa::path(
    get,
    path = "/laporan",
    responses(
        (status = 200, description = "Reports retrieved successfully", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff access required")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_all_reports(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_all().await?;
    let total = reports.len() as i64;
    let data: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Get a single report
#[utoipa::path(
    get,
    path = "/laporan/{id}",
    params(
        ("id" = i64, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "Report retrieved successfully", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Report not found")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_report(
    user: CurrentUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get(id).await?;
    ensure_can_view(&user, &report)?;

    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::from(report)),
        None,
        None,
    )))
}

/// Update a report's status (staff only)
#[utoipa::path(
    put,
    path = "/laporan/{id}/status",
    params(
        ("id" = i64, Path, description = "Report id")
    ),
    request_body = StatusUpdateDto,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff access required"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already resolved or rejected")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_report_status(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<StatusUpdateDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.update_status(id, dto, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::from(report)),
        None,
        None,
    )))
}

/// Get a report's status history
#[utoipa::path(
    get,
    path = "/laporan/{id}/history",
    params(
        ("id" = i64, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<StatusHistoryDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Report not found")
    ),
    tag = "laporan",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_report_history(
    user: CurrentUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<StatusHistoryDto>>>> {
    let report = service.get(id).await?;
    ensure_can_view(&user, &report)?;

    let history = service.history(id).await?;
    let data: Vec<StatusHistoryDto> = history.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(Some(data), None, None)))
}
