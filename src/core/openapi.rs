use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, models as auth_models};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::features::uploads::{dtos as uploads_dtos, handlers as uploads_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::auth_handler::register,
        auth_handlers::auth_handler::login,
        auth_handlers::auth_handler::get_me,
        // Laporan
        reports_handlers::report_handler::create_report,
        reports_handlers::report_handler::list_my_reports,
        reports_handlers::report_handler::list_all_reports,
        reports_handlers::report_handler::get_report,
        reports_handlers::report_handler::update_report_status,
        reports_handlers::report_handler::get_report_history,
        // Statistik
        stats_handlers::stats_handler::get_statistics,
        // Upload
        uploads_handlers::upload_handler::upload_photo,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_models::UserRole,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::TokenResponseDto,
            auth_dtos::UserResponseDto,
            ApiResponse<auth_dtos::TokenResponseDto>,
            ApiResponse<auth_dtos::UserResponseDto>,
            // Laporan
            reports_models::DamageCategory,
            reports_models::Priority,
            reports_models::ReportStatus,
            reports_dtos::CreateReportDto,
            reports_dtos::StatusUpdateDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::StatusHistoryDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_dtos::StatusHistoryDto>>,
            // Statistik
            stats_dtos::StatusCountDto,
            stats_dtos::CategoryCountDto,
            stats_dtos::FacilityCountDto,
            stats_dtos::StatisticsDto,
            ApiResponse<stats_dtos::StatisticsDto>,
            // Upload
            uploads_dtos::UploadFormDto,
            uploads_dtos::StoredFileDto,
            ApiResponse<uploads_dtos::StoredFileDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and current user"),
        (name = "laporan", description = "Facility damage reports and their lifecycle"),
        (name = "statistik", description = "Aggregate report statistics (staff only)"),
        (name = "upload", description = "Report photo uploads"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivitasFix API",
        version = "0.1.0",
        description = "API documentation for CivitasFix",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
