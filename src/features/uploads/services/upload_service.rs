use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::uploads::dtos::UploadResponseDto;
use crate::features::uploads::services::form_parser::StagedFile;
use crate::modules::storage::ObjectStore;

/// Service for storing uploaded files and building their public URLs
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    unique_keys: bool,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: &str, unique_keys: bool) -> Self {
        Self {
            store,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            unique_keys,
        }
    }

    /// Build the object key for a file uploaded at `timestamp_millis`
    ///
    /// The default `{millis}-{filename}` form can collide when the same name is
    /// uploaded twice in one millisecond; `unique_keys` adds a random segment.
    pub fn object_key(&self, timestamp_millis: i64, original_filename: &str) -> String {
        if self.unique_keys {
            let suffix = Uuid::new_v4().simple().to_string();
            format!("{}-{}-{}", timestamp_millis, &suffix[..8], original_filename)
        } else {
            format!("{}-{}", timestamp_millis, original_filename)
        }
    }

    /// Public URL for a stored object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, urlencoding::encode(key))
    }

    /// Read a staged file and put it into the bucket
    ///
    /// # Returns
    /// The public URL of the stored object
    pub async fn store(&self, staged: &StagedFile) -> Result<UploadResponseDto> {
        let data = tokio::fs::read(&staged.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read staged file: {}", e)))?;

        let key = self.object_key(Utc::now().timestamp_millis(), &staged.original_filename);

        self.store
            .put_object(&key, data, &staged.content_type)
            .await?;

        info!(
            "Stored upload: key={}, bucket={}, size={}, content_type={}",
            key,
            self.store.bucket_name(),
            staged.size,
            staged.content_type
        );

        Ok(UploadResponseDto {
            url: self.public_url(&key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::MemoryObjectStore;

    fn service(unique_keys: bool) -> (UploadService, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new("drops"));
        let service = UploadService::new(store.clone(), "https://files.example.com/", unique_keys);
        (service, store)
    }

    #[test]
    fn test_object_key_format() {
        let (service, _) = service(false);
        assert_eq!(
            service.object_key(1_700_000_000_123, "photo.png"),
            "1700000000123-photo.png"
        );
    }

    #[test]
    fn test_unique_object_key() {
        let (service, _) = service(true);
        let key = service.object_key(1_700_000_000_123, "photo.png");

        assert!(key.starts_with("1700000000123-"));
        assert!(key.ends_with("-photo.png"));
        assert_eq!(key.len(), "1700000000123-".len() + 8 + "-photo.png".len());
        assert_ne!(key, service.object_key(1_700_000_000_123, "photo.png"));
    }

    #[test]
    fn test_public_url_joins_base_and_key() {
        let (service, _) = service(false);

        assert_eq!(
            service.public_url("1700000000123-photo.png"),
            "https://files.example.com/1700000000123-photo.png"
        );
        assert_eq!(
            service.public_url("1700000000123-my photo.png"),
            "https://files.example.com/1700000000123-my%20photo.png"
        );
        assert_eq!(
            service.public_url("1700000000123-my rock (1).png"),
            "https://files.example.com/1700000000123-my%20rock%20%281%29.png"
        );
    }

    #[tokio::test]
    async fn test_store_puts_object_once() {
        let (service, store) = service(false);
        let path = std::env::temp_dir().join(format!("rockdrop-{}.part", Uuid::new_v4()));
        tokio::fs::write(&path, b"granite").await.unwrap();

        let staged = StagedFile {
            original_filename: "rock.txt".to_string(),
            content_type: "text/plain".to_string(),
            size: 7,
            path: path.clone(),
        };

        let response = service.store(&staged).await.unwrap();

        let puts = store.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].bucket, "drops");
        assert_eq!(puts[0].content_type, "text/plain");
        assert_eq!(puts[0].data, b"granite");
        assert!(puts[0].key.ends_with("-rock.txt"));
        assert_eq!(
            response.url,
            format!("https://files.example.com/{}", puts[0].key)
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_propagates_storage_failure() {
        let store = Arc::new(MemoryObjectStore::failing("drops"));
        let service = UploadService::new(store.clone(), "https://files.example.com", false);
        let path = std::env::temp_dir().join(format!("rockdrop-{}.part", Uuid::new_v4()));
        tokio::fs::write(&path, b"basalt").await.unwrap();

        let staged = StagedFile {
            original_filename: "rock.txt".to_string(),
            content_type: "text/plain".to_string(),
            size: 6,
            path: path.clone(),
        };

        let result = service.store(&staged).await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
