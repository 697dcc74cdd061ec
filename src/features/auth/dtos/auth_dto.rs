use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::models::{User, UserRole};

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username must start with letter or underscore and contain only alphanumeric characters and underscores"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(min = 1, max = 128, message = "Display name must be 1-128 characters"))]
    pub display_name: String,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    /// Signed JWT access token
    pub access_token: String,
    /// Token type (always "bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Public view of a user account (no credential material)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}
