//! Abacus HTTP API
//!
//! Exposes the evaluation service over JSON: single and batch evaluation,
//! paginated history and outcome statistics.

use std::sync::Arc;
use std::time::Duration;

use abacus_core::EvaluationService;
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod telemetry;
pub mod types;

use crate::config::AbacusConfig;
use crate::middleware::{RateLimiter, cors_layer, monitor_request, rate_limit, request_context};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<EvaluationService>,
    pub config: Arc<AbacusConfig>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AbacusConfig) -> Self {
        Self {
            service: Arc::new(EvaluationService::new()),
            config: Arc::new(config),
            start_time: Utc::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.start_time).to_std().unwrap_or_default()
    }
}

/// Build the application with the default configuration
pub fn create_app() -> anyhow::Result<Router> {
    Ok(create_app_with_config(AbacusConfig::default()))
}

/// Build the application router and middleware stack
pub fn create_app_with_config(config: AbacusConfig) -> Router {
    info!(
        max_batch_size = config.limits.max_batch_size,
        requests_per_second = config.security.requests_per_second,
        burst = config.security.burst,
        "Creating application router"
    );

    let limiter = RateLimiter::from_config(&config.security);
    let cors = cors_layer(&config.security);
    let body_limit = config.limits.max_body_size_kb.saturating_mul(1024);
    let timeout = Duration::from_secs(config.server.request_timeout_seconds);

    let state = AppState::new(config);

    let evaluate_routes = Router::new()
        .route("/single", post(handlers::evaluate_single))
        .route("/batch", post(handlers::evaluate_batch))
        .route("/history", get(handlers::history))
        .route("/stats", get(handlers::stats));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/evaluate", evaluate_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_context))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(monitor_request))
                .layer(cors)
                .layer(axum_middleware::from_fn_with_state(limiter, rate_limit))
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}
