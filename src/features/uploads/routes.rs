use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::uploads::handlers::upload_handler;
use crate::features::uploads::services::UploadService;

/// Upload routes (require bearer authentication)
pub fn routes(service: Arc<UploadService>) -> Router {
    Router::new()
        .route("/upload", post(upload_handler::upload_photo))
        .with_state(service)
}
