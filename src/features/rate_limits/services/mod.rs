mod rate_limit_messages;
mod rate_limiter;

pub use rate_limit_messages::{random_rate_limit_message, RATE_LIMIT_MESSAGES};
pub use rate_limiter::RateLimiter;
