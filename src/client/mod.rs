//! Client side of the upload flow
//!
//! Mirrors what a browser page does: checks the size locally, refuses to send
//! without a CAPTCHA token, shows simulated progress while the single request
//! is in flight and surfaces the server's message verbatim.

mod upload_client;
mod uploaded_file;

pub use upload_client::{ClientError, UploadClient, PROGRESS_TICK};
pub use uploaded_file::{UploadStatus, UploadedFile};
