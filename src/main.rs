mod core;
mod features;
mod modules;
mod shared;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::reports::routes as reports_routes;
use crate::features::reports::services::ReportService;
use crate::features::stats::routes as stats_routes;
use crate::features::stats::services::StatsService;
use crate::features::uploads::routes as uploads_routes;
use crate::features::uploads::services::UploadService;
use crate::modules::mailer::{Notifier, SmtpMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth services
    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        pool.clone(),
        Arc::clone(&token_service),
    ));
    tracing::info!("Auth services initialized");

    // Initialize mailer for status-change notifications
    let mailer: Arc<dyn Notifier> =
        Arc::new(SmtpMailer::new(&config.smtp).map_err(|e| anyhow::anyhow!("{}", e))?);

    // Initialize Report Service
    let report_service = Arc::new(ReportService::new(pool.clone(), Arc::clone(&mailer)));
    tracing::info!("Report service initialized");

    // Initialize Stats Service
    let stats_service = Arc::new(StatsService::new(pool.clone()));
    tracing::info!("Stats service initialized");

    // Initialize Upload Service and make sure the directory exists
    let upload_service = Arc::new(UploadService::new(
        &config.uploads,
        config.app.public_base_url.clone(),
    ));
    upload_service
        .ensure_dir()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("Upload service initialized, dir: {}", config.uploads.dir);

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require bearer authentication)
    let auth_state = middleware::AuthState {
        auth_service: Arc::clone(&auth_service),
        token_service: Arc::clone(&token_service),
    };
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(reports_routes::routes(report_service))
        .merge(stats_routes::routes(stats_service))
        .merge(uploads_routes::routes(upload_service))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new().merge(auth_routes::public_routes(auth_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        // Stored photos are served directly from disk
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
