/// Fallback message for failures that must not leak internals
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

/// Multipart field carrying the Turnstile token
pub const CAPTCHA_TOKEN_FIELD: &str = "cf-turnstile-response";

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Content type used when the client declares none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Client identifier used when neither a forwarded header nor a socket address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

// =============================================================================
// RATE LIMIT HEADERS
// =============================================================================

pub const HEADER_RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
