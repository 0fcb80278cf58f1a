use chrono::{DateTime, Utc};

/// Requests observed for one client inside its current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    pub fn new(reset_at: DateTime<Utc>) -> Self {
        Self { count: 0, reset_at }
    }

    /// A window has passed once the current time reaches its reset time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }
}
