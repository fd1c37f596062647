//! Hire RS Server
//!
//! HTTP server exposing the company and user search endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hire_api::AppState;
use hire_core::config::{AppConfig, ServerConfig};
use hire_db::{companies, users, Database};

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from env: {}, using defaults", e);
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Hire RS"
    );

    let db = Database::connect(&config.database).await?;
    match db.ping().await {
        Ok(()) => info!(database = %db.name(), "Connected to document store"),
        Err(e) => warn!("Document store not reachable yet: {}", e),
    }

    let state = AppState::from_stores(
        Arc::new(db.store(users::COLLECTION)),
        Arc::new(db.store(companies::COLLECTION)),
        &config.search,
    );
    let health = Arc::new(HealthChecker::new(HealthConfig::default()).with_database(db.clone()));

    let app = build_router(state, health, &config.server);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,hire_server=debug,hire_api=debug,hire_db=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, server: &ServerConfig) -> Router {
    let health_routes = Router::new()
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(hire_api::router().with_state(state))
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(server.max_body_size_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server.request_timeout_seconds,
                )))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use hire_db::MemoryStore;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::default();
        let state = AppState::from_stores(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            &config.search,
        );
        let health = Arc::new(HealthChecker::new(HealthConfig::default()));

        build_router(state, health, &config.server)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_liveness_only_on_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_readiness_without_store() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_company_listing_through_layers() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/companies/list")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["Results"]["rowsCount"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/v3").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
