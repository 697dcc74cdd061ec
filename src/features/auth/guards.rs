//! Authentication and authorization extractors.
//!
//! The bare `CurrentUser` extractor only requires a valid token; the role
//! guards additionally verify the user holds the required role. The two
//! roles are disjoint: staff review reports, students submit them, and
//! neither inherits the other.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::features::auth::models::CurrentUser;

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Guard for staff-only operations (report review, statistics).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireStaff(user): RequireStaff) { ... }
/// ```
#[derive(Debug)]
pub struct RequireStaff(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_staff() {
            return Err(AppError::Forbidden("Staff access required".to_string()));
        }

        Ok(RequireStaff(user.clone()))
    }
}

/// Guard for student-only operations (report submission).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireStudent(user): RequireStudent) { ... }
/// ```
#[derive(Debug)]
pub struct RequireStudent(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStudent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_student() {
            return Err(AppError::Forbidden("Student access required".to_string()));
        }

        Ok(RequireStudent(user.clone()))
    }
}
