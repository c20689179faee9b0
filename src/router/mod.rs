//! Router configuration.
//!
//! `POST /webhook` receives deliveries, `/health` answers any method and every
//! other path (or method on `/webhook`) falls through to a plain 404.

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{any, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::handlers::{health, webhook};
use crate::middleware::request_logger_middleware;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    Router::new()
        .route(
            "/webhook",
            post(webhook::receive_webhook).fallback(not_found),
        )
        .route("/health", any(health::health_check))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_logger_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(app_state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
