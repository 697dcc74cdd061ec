use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, TokenResponseDto, UserResponseDto,
};
use crate::features::auth::models::CurrentUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Register a new user account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<TokenResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let token = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(token), None, None)))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: CurrentUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service
        .get_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from(user)),
        None,
        None,
    )))
}
