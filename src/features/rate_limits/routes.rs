use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::get_rate_limit_status;
use super::services::RateLimiter;

/// Create public routes for rate limit status
pub fn routes(limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/api/rate-limit", get(get_rate_limit_status))
        .with_state(limiter)
}
