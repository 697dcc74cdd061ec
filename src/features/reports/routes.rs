use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers::report_handler;
use crate::features::reports::services::ReportService;

/// Report routes. All of them require bearer authentication.
///
/// "/laporan/me" is static and therefore wins over "/laporan/{id}".
pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/laporan",
            post(report_handler::create_report).get(report_handler::list_all_reports),
        )
        .route("/laporan/me", get(report_handler::list_my_reports))
        .route("/laporan/{id}", get(report_handler::get_report))
        .route(
            "/laporan/{id}/status",
            put(report_handler::update_report_status),
        )
        .route(
            "/laporan/{id}/history",
            get(report_handler::get_report_history),
        )
        .with_state(service)
}
