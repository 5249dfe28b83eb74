pub mod carousel;
pub mod health;
pub mod rate_limit;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::routes::rate_limit::{rate_limit, RateLimiter};
use crate::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let limiter = Arc::new(RateLimiter::per_minute(state.config.rate_limit_per_minute));

    let api = Router::new()
        .route("/api/styles", get(carousel::handle_styles))
        .route("/api/preview-slides", post(carousel::handle_preview_slides))
        .route("/api/generate-carousel", post(carousel::handle_generate_carousel))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
