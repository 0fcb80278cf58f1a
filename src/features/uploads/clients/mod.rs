mod turnstile_client;

pub use turnstile_client::{CaptchaVerifier, TurnstileClient};
