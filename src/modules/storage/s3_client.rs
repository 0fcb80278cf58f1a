//! R2/MinIO/S3-compatible storage client
//!
//! Exposes the single "put object" capability the upload pipeline needs,
//! behind the [`ObjectStore`] trait so handlers can be exercised without a bucket.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::StorageSettings;
use crate::core::error::{AppError, Result};

/// Key-addressed binary storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` with the given content type
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Name of the bucket objects are written to
    fn bucket_name(&self) -> String;
}

/// S3-compatible storage client
pub struct S3Client {
    bucket: Box<Bucket>,
    timeout: Duration,
}

impl S3Client {
    /// Create a new client from resolved storage settings
    ///
    /// No network traffic happens here; the bucket is expected to exist.
    pub fn new(settings: &StorageSettings) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&settings.access_key_id),
            Some(&settings.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) work for both R2 and MinIO
        bucket.set_path_style();

        info!(
            "Storage client initialized for endpoint: {}, bucket: {}",
            settings.endpoint,
            bucket.name()
        );

        Ok(Self {
            bucket,
            timeout: settings.timeout,
        })
    }

}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let size = data.len();

        let response = tokio::time::timeout(
            self.timeout,
            self.bucket
                .put_object_with_content_type(key, &data, content_type),
        )
        .await
        .map_err(|_| {
            AppError::ExternalServiceError(format!(
                "Timed out after {:?} uploading '{}'",
                self.timeout, key
            ))
        })?
        .map_err(|e| AppError::ExternalServiceError(format!("Failed to upload '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::ExternalServiceError(format!(
                "Storage rejected '{}' with status {}",
                key, status
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes, {}) to bucket '{}'",
            key,
            size,
            content_type,
            self.bucket.name()
        );
        Ok(())
    }

    fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StorageSettings {
        StorageSettings {
            endpoint: "http://localhost:9000".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            bucket: "rockdrop-uploads".to_string(),
            public_url: "https://files.example.com".to_string(),
            region: "auto".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_client_uses_configured_bucket() {
        let client = S3Client::new(&settings()).unwrap();

        assert_eq!(client.bucket_name(), "rockdrop-uploads");
    }

    /// Serves `router` as a fake storage endpoint, returning its URL
    async fn spawn_endpoint(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn client_for(endpoint: String, timeout: Duration) -> S3Client {
        S3Client::new(&StorageSettings {
            endpoint,
            timeout,
            ..settings()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_times_out_on_slow_endpoint() {
        let endpoint = spawn_endpoint(axum::Router::new().fallback(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            axum::http::StatusCode::OK
        }))
        .await;

        let client = client_for(endpoint, Duration::from_millis(100));
        let result = client
            .put_object("1700000000000-rock.txt", b"granite".to_vec(), "text/plain")
            .await;

        match result {
            Err(AppError::ExternalServiceError(msg)) => assert!(msg.contains("Timed out")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_put_rejected_by_endpoint_is_external_error() {
        let endpoint = spawn_endpoint(axum::Router::new().fallback(|| async {
            axum::http::StatusCode::FORBIDDEN
        }))
        .await;

        let client = client_for(endpoint, Duration::from_secs(5));
        let result = client
            .put_object("1700000000000-rock.txt", b"granite".to_vec(), "text/plain")
            .await;

        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }
}
