use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{
    DamageCategory, Priority, Report, ReportStatus, StatusHistoryWithActor,
};

/// Request DTO for submitting a damage report
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,

    pub category: DamageCategory,

    #[validate(length(min = 1, max = 100, message = "Facility type must be 1-100 characters"))]
    pub facility_type: String,

    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,

    #[validate(url(message = "Photo URL must be a valid URL"))]
    pub photo_url: Option<String>,
}

/// Request DTO for a staff status update
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct StatusUpdateDto {
    pub status: ReportStatus,

    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
}

/// Public view of a damage report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: DamageCategory,
    pub facility_type: String,
    pub location: String,
    pub priority: Priority,
    pub photo_url: Option<String>,
    pub status: ReportStatus,
    pub user_id: i64,
    pub reviewer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            title: report.title,
            description: report.description,
            category: report.category,
            facility_type: report.facility_type,
            location: report.location,
            priority: report.priority,
            photo_url: report.photo_url,
            status: report.status,
            user_id: report.user_id,
            reviewer_id: report.reviewer_id,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// One entry in a report's status history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryDto {
    pub id: i64,
    pub status: ReportStatus,
    pub note: Option<String>,
    pub changed_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<StatusHistoryWithActor> for StatusHistoryDto {
    fn from(entry: StatusHistoryWithActor) -> Self {
        Self {
            id: entry.id,
            status: entry.status,
            note: entry.note,
            changed_by: entry.display_name,
            created_at: entry.created_at,
        }
    }
}
