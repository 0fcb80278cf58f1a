use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::extractor::ClientAddress;
use crate::features::rate_limits::dtos::RateLimitStatusDto;
use crate::features::rate_limits::services::RateLimiter;

/// Get the caller's upload allowance
///
/// Read-only: checking the status does not count against the limit.
#[utoipa::path(
    get,
    path = "/api/rate-limit",
    tag = "rate-limits",
    responses(
        (status = 200, description = "Current rate limit status for the caller", body = RateLimitStatusDto)
    )
)]
pub async fn get_rate_limit_status(
    State(limiter): State<Arc<RateLimiter>>,
    client: ClientAddress,
) -> Json<RateLimitStatusDto> {
    Json(limiter.peek(client.as_str()).into())
}
