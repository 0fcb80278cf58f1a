//! Rockdrop: a small file drop service.
//!
//! The server side accepts one multipart upload per request, rate limits it
//! per client, verifies a Turnstile token and puts the file into an
//! S3-compatible bucket. [`client`] holds the matching upload flow used by the
//! `rockdrop-upload` command.

pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
