use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::auth::models::CurrentUser;
use crate::features::uploads::dtos::{StoredFileDto, UploadFormDto};
use crate::features::uploads::services::UploadService;
use crate::shared::types::ApiResponse;

/// Upload a report photo
#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = UploadFormDto,
        content_type = "multipart/form-data",
        description = "Multipart form with a single 'file' field",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<StoredFileDto>),
        (status = 400, description = "Invalid or missing file"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "upload",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_photo(
    user: CurrentUser,
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<StoredFileDto>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let stored = service
            .store_image(filename.as_deref(), content_type.as_deref(), data)
            .await?;

        tracing::info!("User {} uploaded '{}'", user.id, stored.filename);

        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(stored), None, None)),
        ));
    }

    Err(AppError::Validation(
        "Missing 'file' field in multipart body".to_string(),
    ))
}
