use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{
    HEADER_RATE_LIMIT_LIMIT, HEADER_RATE_LIMIT_REMAINING, HEADER_RATE_LIMIT_RESET,
};

/// Outcome of a rate limit check for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub limit: u32,
}

/// Divides milliseconds into whole seconds, rounding up
fn ceil_secs(millis: i64) -> i64 {
    millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) != 0)
}

impl RateLimitDecision {
    /// Reset time as unix seconds, rounded up
    pub fn reset_unix_secs(&self) -> i64 {
        ceil_secs(self.reset_at.timestamp_millis())
    }

    /// Whole seconds until the window resets, never negative
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> i64 {
        ceil_secs((self.reset_at - now).num_milliseconds()).max(0)
    }

    /// Sets the informational rate limit headers on a response
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(HEADER_RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(HEADER_RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(
            HEADER_RATE_LIMIT_RESET,
            HeaderValue::from(self.reset_unix_secs()),
        );
    }
}

/// Response DTO for the caller's current rate limit status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatusDto {
    /// Maximum uploads allowed per window
    pub limit: u32,
    /// Uploads left in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

impl From<RateLimitDecision> for RateLimitStatusDto {
    fn from(decision: RateLimitDecision) -> Self {
        Self {
            limit: decision.limit,
            remaining: decision.remaining,
            reset_at: decision.reset_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn decision(reset_at: DateTime<Utc>) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            remaining: 3,
            reset_at,
            limit: 10,
        }
    }

    #[test]
    fn test_reset_secs_round_up() {
        let reset_at = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        assert_eq!(decision(reset_at).reset_unix_secs(), 1_700_000_001);

        let exact = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(decision(exact).reset_unix_secs(), 1_700_000_000);
    }

    #[test]
    fn test_retry_after_rounds_up_and_clamps() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let d = decision(now + Duration::milliseconds(1500));
        assert_eq!(d.retry_after_secs(now), 2);

        let past = decision(now - Duration::seconds(5));
        assert_eq!(past.retry_after_secs(now), 0);
    }

    #[test]
    fn test_apply_headers() {
        let reset_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut headers = HeaderMap::new();

        decision(reset_at).apply_headers(&mut headers);

        assert_eq!(headers[HEADER_RATE_LIMIT_LIMIT], "10");
        assert_eq!(headers[HEADER_RATE_LIMIT_REMAINING], "3");
        assert_eq!(headers[HEADER_RATE_LIMIT_RESET], "1700000000");
    }
}
