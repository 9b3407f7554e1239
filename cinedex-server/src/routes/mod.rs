pub mod v1;

use axum::{Router, middleware};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    AppState,
    infra::{
        errors::AppError,
        middleware::{
            cors::cors_layer, rate_limit::rate_limit_middleware,
            security_headers::SecurityHeadersLayer,
        },
    },
};

/// Create the main API router with all versions
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new().nest("/api/v1", v1::create_v1_router(state))
}

/// The complete application: API routes, the 404 fallback and the
/// middleware stack, with state applied.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    create_api_router(state.clone())
        .fallback(not_found)
        // Outer to inner: trace, CORS, timeout, security headers, rate limit.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(SecurityHeadersLayer::new(&config.security.hsts))
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}
