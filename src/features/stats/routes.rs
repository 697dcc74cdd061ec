use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stats::handlers::stats_handler;
use crate::features::stats::services::StatsService;

/// Statistics routes (require bearer authentication, staff role)
pub fn routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/statistik", get(stats_handler::get_statistics))
        .with_state(service)
}
