use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::features::rate_limits::dtos::RateLimitDecision;
use crate::features::rate_limits::models::RateLimitEntry;

/// Fixed-window, per-client request counter kept in process memory.
///
/// Each key is updated under its map shard lock, so the
/// reset/increment/compare sequence is atomic per client.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: StdDuration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::hours(1)),
        }
    }

    /// Records one request for `client_id` and decides whether it may proceed
    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        self.check_at(client_id, Utc::now())
    }

    pub fn check_at(&self, client_id: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut entry = self
            .entries
            .entry(client_id.to_string())
            .or_insert_with(|| RateLimitEntry::new(self.window_end(now)));

        if entry.is_expired(now) {
            *entry = RateLimitEntry::new(self.window_end(now));
        }

        // Rejected requests still count
        entry.count = entry.count.saturating_add(1);

        let decision = self.decision(entry.count, entry.reset_at);
        drop(entry);

        if !decision.allowed {
            debug!(
                "Rate limit exceeded for {} (limit {}, resets at {})",
                client_id, decision.limit, decision.reset_at
            );
        }

        decision
    }

    /// Current status for `client_id` without recording a request
    pub fn peek(&self, client_id: &str) -> RateLimitDecision {
        self.peek_at(client_id, Utc::now())
    }

    pub fn peek_at(&self, client_id: &str, now: DateTime<Utc>) -> RateLimitDecision {
        match self.entries.get(client_id) {
            Some(entry) if !entry.is_expired(now) => {
                let mut decision = self.decision(entry.count, entry.reset_at);
                decision.allowed = entry.count < self.limit;
                decision
            }
            _ => RateLimitDecision {
                allowed: self.limit > 0,
                remaining: self.limit,
                reset_at: self.window_end(now),
                limit: self.limit,
            },
        }
    }

    /// End of a window starting at `now`, saturating at chrono's maximum
    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn decision(&self, count: u32, reset_at: DateTime<Utc>) -> RateLimitDecision {
        RateLimitDecision {
            allowed: count <= self.limit,
            remaining: self.limit.saturating_sub(count),
            reset_at,
            limit: self.limit,
        }
    }

    /// Drops every entry whose window has already ended, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Spawns the periodic sweep that bounds the table's memory use
    pub fn spawn_sweeper(self: &Arc<Self>, period: StdDuration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = limiter.sweep_expired();
                if removed > 0 {
                    debug!(
                        "Rate limit sweep removed {} expired entries ({} remaining)",
                        removed,
                        limiter.tracked_clients()
                    );
                }
            }
        })
    }
}
