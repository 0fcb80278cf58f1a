mod rate_limit_entry;

pub use rate_limit_entry::RateLimitEntry;
