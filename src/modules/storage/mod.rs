//! Storage module for uploaded files
//!
//! Provides the R2/S3-compatible object storage client.

mod s3_client;

pub use s3_client::{ObjectStore, S3Client};
